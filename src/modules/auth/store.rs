use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::modules::error::Error;
use crate::modules::utils::time::get_current_timestamp;

/// Define verification status enum
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum VerificationStatus {
    Unverified,
    Verified,
}

impl VerificationStatus {
    pub fn is_verified(&self) -> bool {
        matches!(self, VerificationStatus::Verified)
    }
}

/// A stored identity record: login name, hashed secret, verification flag
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Account {
    pub identifier: String, // As entered by the user (also the delivery address)
    pub secret_hash: String,
    pub verification_status: VerificationStatus,
    pub created_at: u64,
}

impl Account {
    pub fn is_verified(&self) -> bool {
        self.verification_status.is_verified()
    }
}

/// Lowercase form used as the lookup key, so logins and verification
/// links are case-insensitive while the entered address is preserved
/// for display and delivery.
pub fn normalize_identifier(identifier: &str) -> String {
    identifier.trim().to_lowercase()
}

/// Persistence seam for account records. Implementations must make
/// `insert` atomic with respect to the uniqueness check: under
/// concurrent registration of the same identifier, exactly one insert
/// succeeds.
pub trait CredentialStore: Send + Sync {
    fn find_by_identifier(&self, identifier: &str) -> Result<Option<Account>, Error>;
    fn insert(&self, identifier: &str, secret_hash: &str) -> Result<Account, Error>;
    fn set_verified(&self, identifier: &str) -> Result<(), Error>;
    fn list_all(&self) -> Result<Vec<Account>, Error>;
}

fn new_account(identifier: &str, secret_hash: &str) -> Account {
    Account {
        identifier: identifier.trim().to_string(),
        secret_hash: secret_hash.to_string(),
        verification_status: VerificationStatus::Unverified,
        created_at: get_current_timestamp(),
    }
}

/// In-memory credential store for tests and embedding
pub struct MemoryCredentialStore {
    accounts: Mutex<HashMap<String, Account>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
        }
    }

    fn locked(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Account>>, Error> {
        self.accounts
            .lock()
            .map_err(|_| Error::Storage("credential store lock poisoned".to_string()))
    }
}

impl Default for MemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn find_by_identifier(&self, identifier: &str) -> Result<Option<Account>, Error> {
        let accounts = self.locked()?;
        Ok(accounts.get(&normalize_identifier(identifier)).cloned())
    }

    fn insert(&self, identifier: &str, secret_hash: &str) -> Result<Account, Error> {
        let mut accounts = self.locked()?;
        let key = normalize_identifier(identifier);

        // Uniqueness check and insert happen under one lock
        if accounts.contains_key(&key) {
            return Err(Error::AlreadyExists);
        }

        let account = new_account(identifier, secret_hash);
        accounts.insert(key, account.clone());
        Ok(account)
    }

    fn set_verified(&self, identifier: &str) -> Result<(), Error> {
        let mut accounts = self.locked()?;
        match accounts.get_mut(&normalize_identifier(identifier)) {
            Some(account) => {
                account.verification_status = VerificationStatus::Verified;
                Ok(())
            }
            None => Err(Error::Storage(format!(
                "no account for identifier: {}",
                identifier
            ))),
        }
    }

    fn list_all(&self) -> Result<Vec<Account>, Error> {
        let accounts = self.locked()?;
        Ok(accounts.values().cloned().collect())
    }
}

/// File-backed credential store used by the CLI.
///
/// The whole map is loaded at open and rewritten after every mutation.
/// An unreadable or corrupt file starts a fresh store rather than
/// refusing to boot.
pub struct JsonCredentialStore {
    path: PathBuf,
    accounts: Mutex<HashMap<String, Account>>,
}

impl JsonCredentialStore {
    pub fn open(path: &Path) -> Result<Self, Error> {
        let accounts = match std::fs::read_to_string(path) {
            Ok(data) => match serde_json::from_str(&data) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!("Account file {} is corrupt, starting empty: {}", path.display(), e);
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(Error::IoError(e)),
        };

        Ok(Self {
            path: path.to_path_buf(),
            accounts: Mutex::new(accounts),
        })
    }

    fn locked(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Account>>, Error> {
        self.accounts
            .lock()
            .map_err(|_| Error::Storage("credential store lock poisoned".to_string()))
    }

    fn persist(&self, accounts: &HashMap<String, Account>) -> Result<(), Error> {
        let data = serde_json::to_string_pretty(accounts)
            .map_err(|e| Error::Storage(format!("failed to serialize accounts: {}", e)))?;
        std::fs::write(&self.path, data)?;
        Ok(())
    }
}

impl CredentialStore for JsonCredentialStore {
    fn find_by_identifier(&self, identifier: &str) -> Result<Option<Account>, Error> {
        let accounts = self.locked()?;
        Ok(accounts.get(&normalize_identifier(identifier)).cloned())
    }

    fn insert(&self, identifier: &str, secret_hash: &str) -> Result<Account, Error> {
        let mut accounts = self.locked()?;
        let key = normalize_identifier(identifier);

        if accounts.contains_key(&key) {
            return Err(Error::AlreadyExists);
        }

        let account = new_account(identifier, secret_hash);
        accounts.insert(key.clone(), account.clone());

        // Keep the map consistent if the write fails
        if let Err(e) = self.persist(&accounts) {
            accounts.remove(&key);
            return Err(e);
        }
        Ok(account)
    }

    fn set_verified(&self, identifier: &str) -> Result<(), Error> {
        let mut accounts = self.locked()?;
        match accounts.get_mut(&normalize_identifier(identifier)) {
            Some(account) => {
                account.verification_status = VerificationStatus::Verified;
            }
            None => {
                return Err(Error::Storage(format!(
                    "no account for identifier: {}",
                    identifier
                )))
            }
        }
        self.persist(&accounts)
    }

    fn list_all(&self) -> Result<Vec<Account>, Error> {
        let accounts = self.locked()?;
        Ok(accounts.values().cloned().collect())
    }
}
