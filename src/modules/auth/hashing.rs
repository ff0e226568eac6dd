use pbkdf2::pbkdf2;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::modules::error::Error;
use crate::HmacSha256;

/// One-way salted hashing of account secrets.
///
/// Stored values carry their own salt and iteration count
/// (`<iterations>:<salt-hex>:<hash-hex>`), so raising the work factor
/// only affects newly hashed secrets while old ones stay verifiable.
pub struct PasswordHasher {
    iterations: u32,
}

impl PasswordHasher {
    pub fn new(iterations: u32) -> Self {
        Self { iterations }
    }

    /// Hash a secret with a fresh random salt.
    pub fn hash(&self, secret: &str) -> Result<String, Error> {
        let mut salt = [0u8; 16];
        OsRng
            .try_fill_bytes(&mut salt)
            .map_err(|_| Error::InternalCryptoFailure)?;

        let digest = derive_secret_hash(secret, &salt, self.iterations);
        Ok(format!(
            "{}:{}:{}",
            self.iterations,
            hex::encode(salt),
            hex::encode(digest)
        ))
    }

    /// Re-derive with the stored salt and compare in constant time.
    /// Malformed stored values compare unequal.
    pub fn compare(&self, secret: &str, stored: &str) -> bool {
        let parts: Vec<&str> = stored.split(':').collect();
        if parts.len() != 3 {
            return false;
        }

        let iterations = match parts[0].parse::<u32>() {
            Ok(n) if n > 0 => n,
            _ => return false,
        };
        let salt = match hex::decode(parts[1]) {
            Ok(s) => s,
            Err(_) => return false,
        };
        let stored_digest = match hex::decode(parts[2]) {
            Ok(d) => d,
            Err(_) => return false,
        };

        let digest = derive_secret_hash(secret, &salt, iterations);
        constant_time_eq(&digest, &stored_digest)
    }
}

/// Function to derive a 32-byte digest from the secret using PBKDF2
fn derive_secret_hash(secret: &str, salt: &[u8], iterations: u32) -> Vec<u8> {
    let mut digest = vec![0u8; 32];

    pbkdf2::<HmacSha256>(secret.as_bytes(), salt, iterations, &mut digest);

    digest
}

/// Compare two byte slices without short-circuiting on the first
/// differing byte.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    // Low iteration count keeps the tests fast; the derivation path is
    // identical at any work factor.
    fn test_hasher() -> PasswordHasher {
        PasswordHasher::new(1_000)
    }

    #[test]
    fn test_hash_round_trip() {
        let hasher = test_hasher();
        let stored = hasher.hash("pw1").unwrap();

        assert!(hasher.compare("pw1", &stored));
        assert!(!hasher.compare("wrong", &stored));
        assert!(!hasher.compare("", &stored));
    }

    #[test]
    fn test_hash_is_salted() {
        let hasher = test_hasher();
        let first = hasher.hash("MySecurePassword123!").unwrap();
        let second = hasher.hash("MySecurePassword123!").unwrap();

        // Fresh salt every time, so identical secrets never collide
        assert_ne!(first, second);
        assert!(hasher.compare("MySecurePassword123!", &first));
        assert!(hasher.compare("MySecurePassword123!", &second));
    }

    #[test]
    fn test_hash_not_plaintext() {
        let hasher = test_hasher();
        let stored = hasher.hash("secret-value").unwrap();
        assert!(!stored.contains("secret-value"));
    }

    #[test]
    fn test_compare_survives_work_factor_change() {
        // A hash created at one iteration count still verifies after the
        // configured work factor changes, because the count is embedded.
        let old = PasswordHasher::new(500).hash("pw1").unwrap();
        assert!(PasswordHasher::new(2_000).compare("pw1", &old));
    }

    #[test]
    fn test_compare_rejects_malformed_stored_values() {
        let hasher = test_hasher();
        assert!(!hasher.compare("pw1", ""));
        assert!(!hasher.compare("pw1", "not-a-hash"));
        assert!(!hasher.compare("pw1", "abc:def"));
        assert!(!hasher.compare("pw1", "0:aabb:ccdd"));
        assert!(!hasher.compare("pw1", "1000:zzzz:ccdd"));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"same", b"same"));
        assert!(!constant_time_eq(b"same", b"sane"));
        assert!(!constant_time_eq(b"short", b"longer"));
        assert!(constant_time_eq(b"", b""));
    }
}
