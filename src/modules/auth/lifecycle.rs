use std::sync::Arc;

use log::warn;

use super::hashing::PasswordHasher;
use super::store::{normalize_identifier, Account, CredentialStore};
use super::tokens::{TokenPurpose, TokenService};
use crate::modules::email::templates;
use crate::modules::email::MailTransport;
use crate::modules::error::Error;
use crate::modules::utils::logging::log_auth_event;

/// What happened to the verification message attached to an operation.
/// A failed dispatch leaves the account registered; the caller offers a
/// re-send instead of retrying registration.
#[derive(Debug)]
pub enum DispatchOutcome {
    Delivered,
    Failed(Error),
}

impl DispatchOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DispatchOutcome::Delivered)
    }
}

/// Result of a successful registration
pub struct Registration {
    pub account: Account,
    pub verification: DispatchOutcome,
}

/// Result of a successful login
pub struct LoginSession {
    pub token: String,
    pub verified: bool,
}

/// Orchestrates registration, login and email verification.
///
/// State machine per account:
/// `Unregistered -> Registered(unverified) -> Registered(verified)`,
/// with the last transition taken exactly once.
pub struct AuthLifecycle {
    store: Arc<dyn CredentialStore>,
    mailer: Arc<dyn MailTransport>,
    hasher: PasswordHasher,
    tokens: TokenService,
    base_url: String,
}

impl AuthLifecycle {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        mailer: Arc<dyn MailTransport>,
        hasher: PasswordHasher,
        tokens: TokenService,
        base_url: &str,
    ) -> Self {
        Self {
            store,
            mailer,
            hasher,
            tokens,
            base_url: base_url.to_string(),
        }
    }

    /// Register a new account and dispatch its verification message.
    ///
    /// A duplicate identifier fails with `AlreadyExists` before any side
    /// effect. A mail failure after the insert does NOT roll the account
    /// back; it is reported in the returned `DispatchOutcome` so the
    /// caller can offer a re-send.
    pub fn register(&self, identifier: &str, secret: &str) -> Result<Registration, Error> {
        if self.store.find_by_identifier(identifier)?.is_some() {
            log_auth_event("register", identifier, false, Some("duplicate identifier"));
            return Err(Error::AlreadyExists);
        }

        let secret_hash = self.hasher.hash(secret)?;

        // The store re-checks uniqueness atomically, so a concurrent
        // registration racing past the lookup above still loses here
        let account = self.store.insert(identifier, &secret_hash)?;

        let verification = match self.dispatch_verification(&account) {
            Ok(()) => DispatchOutcome::Delivered,
            Err(e) => {
                warn!(
                    "Verification mail for new account failed, account kept: {}",
                    e
                );
                DispatchOutcome::Failed(e)
            }
        };

        log_auth_event("register", identifier, true, None);
        Ok(Registration {
            account,
            verification,
        })
    }

    /// Issue and send a fresh verification message for an existing
    /// account. Returns `Ok(false)` for an unknown identifier so this
    /// path does not reveal which addresses are registered.
    pub fn resend_verification(&self, identifier: &str) -> Result<bool, Error> {
        let account = match self.store.find_by_identifier(identifier)? {
            Some(account) => account,
            None => return Ok(false),
        };

        self.dispatch_verification(&account)?;
        log_auth_event("resend_verification", identifier, true, None);
        Ok(true)
    }

    /// Authenticate and issue a session token.
    ///
    /// Unknown identifier and wrong secret both return `Ok(None)`;
    /// callers cannot tell the two apart. Login succeeds regardless of
    /// verification state; gating on `verified` is the caller's policy.
    pub fn login(&self, identifier: &str, secret: &str) -> Result<Option<LoginSession>, Error> {
        let account = match self.store.find_by_identifier(identifier)? {
            Some(account) => account,
            None => {
                log_auth_event("login", identifier, false, Some("unknown identifier"));
                return Ok(None);
            }
        };

        if !self.hasher.compare(secret, &account.secret_hash) {
            log_auth_event("login", identifier, false, Some("secret mismatch"));
            return Ok(None);
        }

        let token = self
            .tokens
            .issue(&normalize_identifier(identifier), TokenPurpose::Session)?;

        log_auth_event("login", identifier, true, None);
        Ok(Some(LoginSession {
            token,
            verified: account.is_verified(),
        }))
    }

    /// Consume a verification token and mark its subject verified.
    ///
    /// Returns `false` for anything short of success: bad or expired
    /// token, unknown subject, store failure. Verification links arrive
    /// stale and forged all the time, so nothing here escalates past a
    /// boolean. Re-verifying an already-verified account returns `true`.
    pub fn verify_email(&self, token: &str) -> bool {
        let subject = match self.tokens.validate(token, TokenPurpose::Verification) {
            Ok(subject) => subject,
            Err(e) => {
                log_auth_event("verify_email", "-", false, Some(&e.to_string()));
                return false;
            }
        };

        match self.store.find_by_identifier(&subject) {
            Ok(Some(_)) => {}
            Ok(None) => {
                log_auth_event("verify_email", &subject, false, Some("unknown subject"));
                return false;
            }
            Err(e) => {
                log_auth_event("verify_email", &subject, false, Some(&e.to_string()));
                return false;
            }
        }

        if let Err(e) = self.store.set_verified(&subject) {
            log_auth_event("verify_email", &subject, false, Some(&e.to_string()));
            return false;
        }

        log_auth_event("verify_email", &subject, true, None);
        true
    }

    fn dispatch_verification(&self, account: &Account) -> Result<(), Error> {
        let token = self.tokens.issue(
            &normalize_identifier(&account.identifier),
            TokenPurpose::Verification,
        )?;
        let link = templates::verification_link(&self.base_url, &token);
        let content = templates::verification_email(&link);

        self.mailer.send(
            &account.identifier,
            &content.subject,
            &content.text,
            content.html.as_deref(),
        )
    }
}
