//! Key material and decrypted values that are wiped when dropped

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// AES-256 key length in bytes
pub const KEY_LEN: usize = 32;

/// Key for one unlocked session.
///
/// Produced by [`derive_key`](super::derive_key) once the master password
/// checks out, held by the vault while it is unlocked and wiped when the
/// vault locks. It is never serialized.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SessionKey([u8; KEY_LEN]);

impl SessionKey {
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionKey(..)")
    }
}

/// Decrypted username or password text
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: String) -> Self {
        Self(value)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretString(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_key_zeroize() {
        let mut key = SessionKey::from_bytes([42u8; KEY_LEN]);
        assert_eq!(key.as_bytes(), &[42u8; KEY_LEN]);

        key.zeroize();
        assert_eq!(key.as_bytes(), &[0u8; KEY_LEN]);
    }

    #[test]
    fn test_secret_string_zeroize() {
        let mut secret = SecretString::from("hunter2");
        assert_eq!(secret.expose(), "hunter2");

        secret.zeroize();
        assert!(secret.expose().is_empty());
    }

    #[test]
    fn test_debug_hides_contents() {
        let key = SessionKey::from_bytes([7u8; KEY_LEN]);
        assert_eq!(format!("{:?}", key), "SessionKey(..)");

        let secret = SecretString::from("pw1");
        assert!(!format!("{:?}", secret).contains("pw1"));
    }
}
