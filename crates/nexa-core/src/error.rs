//! Error types for nexa-core

use thiserror::Error;

/// Result type alias for vault operations
pub type Result<T> = std::result::Result<T, VaultError>;

/// Vault error types
#[derive(Error, Debug)]
pub enum VaultError {
    /// Bad user input that can be corrected by re-prompting
    #[error("{0}")]
    Validation(String),

    /// Invalid arguments passed to a primitive (empty password, bad salt length)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Incorrect password ({remaining} attempts remaining)")]
    Mismatch { remaining: u32 },

    #[error("Too many failed attempts - access denied")]
    LockedOut,

    /// Ciphertext was tampered with, truncated, or encrypted under another key
    #[error("Integrity check failed: {0}")]
    Integrity(String),

    #[error("Master password file not found: {0}")]
    StorageMissing(String),

    #[error("Master password file is corrupt: {0}")]
    StorageCorrupt(String),

    #[error("Master password is already set")]
    AlreadyInitialized,

    #[error("Vault is locked - unlock with the master password first")]
    Locked,

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl VaultError {
    /// Errors after which the process must exit with a non-zero status
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::LockedOut | Self::StorageMissing(_) | Self::StorageCorrupt(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(VaultError::LockedOut.is_fatal());
        assert!(VaultError::StorageMissing("master.hash".into()).is_fatal());
        assert!(VaultError::StorageCorrupt("bad json".into()).is_fatal());
        assert!(!VaultError::Mismatch { remaining: 2 }.is_fatal());
        assert!(!VaultError::Integrity("tag".into()).is_fatal());
        assert!(!VaultError::Validation("empty".into()).is_fatal());
    }

    #[test]
    fn test_mismatch_message() {
        let err = VaultError::Mismatch { remaining: 1 };
        assert_eq!(err.to_string(), "Incorrect password (1 attempts remaining)");
    }
}
