//! Password-based key derivation using PBKDF2-HMAC-SHA256

use pbkdf2::pbkdf2_hmac;
use rand::{rngs::OsRng, RngCore};
use sha2::Sha256;

use super::secure_memory::KEY_LEN;
use super::SessionKey;
use crate::error::{Result, VaultError};

/// Salt length in bytes
pub const SALT_LEN: usize = 16;

/// Iteration count used for new master passwords
pub const DEFAULT_ITERATIONS: u32 = 200_000;

/// Lowest iteration count accepted from configuration
pub const MIN_ITERATIONS: u32 = 100_000;

/// Generate a cryptographically secure random salt
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Derive a 256-bit key from a password using PBKDF2-HMAC-SHA256
///
/// # Arguments
/// * `password` - The master password, must not be empty
/// * `salt` - Exactly [`SALT_LEN`] bytes (use `generate_salt()` to create one)
/// * `iterations` - PBKDF2 round count
///
/// The same inputs always produce the same key.
pub fn derive_key(password: &str, salt: &[u8], iterations: u32) -> Result<SessionKey> {
    if password.is_empty() {
        return Err(VaultError::InvalidInput("password must not be empty".to_string()));
    }
    if salt.len() != SALT_LEN {
        return Err(VaultError::InvalidInput(format!(
            "salt must be {} bytes, got {}",
            SALT_LEN,
            salt.len()
        )));
    }
    if iterations == 0 {
        return Err(VaultError::InvalidInput("iteration count must be positive".to_string()));
    }

    let mut key_bytes = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut key_bytes);

    let key = SessionKey::from_bytes(key_bytes);
    zeroize::Zeroize::zeroize(&mut key_bytes);
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Low round count keeps the suite fast; production callers use DEFAULT_ITERATIONS
    const TEST_ITERATIONS: u32 = 1_000;

    #[test]
    fn test_generate_salt() {
        let salt1 = generate_salt();
        let salt2 = generate_salt();

        assert_ne!(salt1, salt2);
        assert_eq!(salt1.len(), SALT_LEN);
    }

    #[test]
    fn test_derive_key_deterministic() {
        let salt = generate_salt();

        let key1 = derive_key("test-password-123", &salt, TEST_ITERATIONS).unwrap();
        let key2 = derive_key("test-password-123", &salt, TEST_ITERATIONS).unwrap();

        assert_eq!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_derive_key_default_iterations_deterministic() {
        let salt = [9u8; SALT_LEN];

        let key1 = derive_key("master", &salt, DEFAULT_ITERATIONS).unwrap();
        let key2 = derive_key("master", &salt, DEFAULT_ITERATIONS).unwrap();

        assert_eq!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_known_vector() {
        // PBKDF2-HMAC-SHA256("password", "salt", 1) from RFC 7914 test data
        let mut out = [0u8; 32];
        pbkdf2_hmac::<Sha256>(b"password", b"salt", 1, &mut out);
        assert_eq!(
            hex::encode(out),
            "120fb6cffcf8b32c43e7225256c4f837a86548c92ccc35480805987cb70be17b"
        );
    }

    #[test]
    fn test_derive_key_different_passwords() {
        let salt = generate_salt();

        let key1 = derive_key("password1", &salt, TEST_ITERATIONS).unwrap();
        let key2 = derive_key("password2", &salt, TEST_ITERATIONS).unwrap();

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_derive_key_different_salts() {
        let key1 = derive_key("test-password", &generate_salt(), TEST_ITERATIONS).unwrap();
        let key2 = derive_key("test-password", &generate_salt(), TEST_ITERATIONS).unwrap();

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_derive_key_different_iterations() {
        let salt = generate_salt();

        let key1 = derive_key("test-password", &salt, TEST_ITERATIONS).unwrap();
        let key2 = derive_key("test-password", &salt, TEST_ITERATIONS + 1).unwrap();

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_invalid_inputs() {
        let salt = generate_salt();

        assert!(matches!(
            derive_key("", &salt, TEST_ITERATIONS),
            Err(VaultError::InvalidInput(_))
        ));
        assert!(matches!(
            derive_key("pw", &[0u8; 8], TEST_ITERATIONS),
            Err(VaultError::InvalidInput(_))
        ));
        assert!(matches!(
            derive_key("pw", &[0u8; 32], TEST_ITERATIONS),
            Err(VaultError::InvalidInput(_))
        ));
        assert!(matches!(derive_key("pw", &salt, 0), Err(VaultError::InvalidInput(_))));
    }
}
