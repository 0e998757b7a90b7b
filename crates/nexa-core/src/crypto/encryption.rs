//! AES-256-GCM authenticated encryption
//!
//! Token format (all fields concatenated):
//! - Version: 1 byte (`0x01`)
//! - Issued at: 8 bytes, big-endian Unix seconds
//! - Nonce: 12 bytes (96 bits) - standard for GCM, fresh per call
//! - Ciphertext: variable length
//! - Auth tag: 16 bytes (128 bits)
//!
//! Version and timestamp are bound to the ciphertext as associated data, so
//! each token decrypts on its own and any modification fails authentication.

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};
use chrono::Utc;
use rand::{rngs::OsRng, RngCore};

use super::SessionKey;
use crate::error::{Result, VaultError};

/// Current token format version
pub const TOKEN_VERSION: u8 = 0x01;

const HEADER_LEN: usize = 1 + 8;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// Parsed encryption token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedToken {
    /// Unix timestamp (seconds) at encryption time
    pub issued_at: i64,
    /// Nonce (12 bytes for GCM)
    pub nonce: [u8; NONCE_LEN],
    /// Ciphertext followed by the 16-byte auth tag
    pub ciphertext: Vec<u8>,
}

impl EncryptedToken {
    /// Parse a token, rejecting anything structurally invalid
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN + NONCE_LEN + TAG_LEN {
            return Err(VaultError::Integrity(format!(
                "token too short: {} bytes",
                bytes.len()
            )));
        }
        if bytes[0] != TOKEN_VERSION {
            return Err(VaultError::Integrity(format!(
                "unsupported token version: {:#04x}",
                bytes[0]
            )));
        }

        let mut ts = [0u8; 8];
        ts.copy_from_slice(&bytes[1..HEADER_LEN]);

        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&bytes[HEADER_LEN..HEADER_LEN + NONCE_LEN]);

        Ok(Self {
            issued_at: i64::from_be_bytes(ts),
            nonce,
            ciphertext: bytes[HEADER_LEN + NONCE_LEN..].to_vec(),
        })
    }

    /// Serialize to the wire format
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + NONCE_LEN + self.ciphertext.len());
        out.extend_from_slice(&self.header());
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    fn header(&self) -> [u8; HEADER_LEN] {
        let mut header = [0u8; HEADER_LEN];
        header[0] = TOKEN_VERSION;
        header[1..].copy_from_slice(&self.issued_at.to_be_bytes());
        header
    }
}

/// Encrypt plaintext using AES-256-GCM
///
/// # Returns
/// A self-contained token; two calls with the same input never produce the
/// same bytes.
pub fn encrypt(key: &SessionKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| VaultError::Encryption(e.to_string()))?;

    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);

    let mut token = EncryptedToken {
        issued_at: Utc::now().timestamp(),
        nonce,
        ciphertext: Vec::new(),
    };
    let aad = token.header();

    // aes-gcm appends the auth tag to the ciphertext
    token.ciphertext = cipher
        .encrypt(
            Nonce::from_slice(&token.nonce),
            Payload {
                msg: plaintext,
                aad: &aad,
            },
        )
        .map_err(|e| VaultError::Encryption(e.to_string()))?;

    Ok(token.to_bytes())
}

/// Encrypt a string
pub fn encrypt_string(key: &SessionKey, plaintext: &str) -> Result<Vec<u8>> {
    encrypt(key, plaintext.as_bytes())
}

/// Decrypt a token produced by [`encrypt`]
///
/// Fails with [`VaultError::Integrity`] on truncation, tampering or a wrong key.
pub fn decrypt(key: &SessionKey, token: &[u8]) -> Result<Vec<u8>> {
    let token = EncryptedToken::from_bytes(token)?;

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| VaultError::Integrity(e.to_string()))?;

    let aad = token.header();
    cipher
        .decrypt(
            Nonce::from_slice(&token.nonce),
            Payload {
                msg: &token.ciphertext,
                aad: &aad,
            },
        )
        .map_err(|_| VaultError::Integrity("authentication tag mismatch".to_string()))
}

/// Decrypt a token and return it as a string
pub fn decrypt_string(key: &SessionKey, token: &[u8]) -> Result<String> {
    let plaintext = decrypt(key, token)?;
    String::from_utf8(plaintext)
        .map_err(|e| VaultError::Integrity(format!("Invalid UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key(byte: u8) -> SessionKey {
        SessionKey::from_bytes([byte; 32])
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let key = test_key(1);
        let plaintext = b"Hello, World!";

        let token = encrypt(&key, plaintext).unwrap();
        assert_eq!(decrypt(&key, &token).unwrap(), plaintext);
    }

    #[test]
    fn test_empty_plaintext_roundtrip() {
        let key = test_key(1);

        let token = encrypt(&key, b"").unwrap();
        assert_eq!(token.len(), HEADER_LEN + NONCE_LEN + TAG_LEN);
        assert!(decrypt(&key, &token).unwrap().is_empty());
    }

    #[test]
    fn test_encrypt_string_decrypt_string_roundtrip() {
        let key = test_key(2);

        let token = encrypt_string(&key, "GitHub").unwrap();
        assert_eq!(decrypt_string(&key, &token).unwrap(), "GitHub");
    }

    #[test]
    fn test_same_plaintext_produces_different_tokens() {
        let key = test_key(3);

        let token1 = encrypt(&key, b"same plaintext").unwrap();
        let token2 = encrypt(&key, b"same plaintext").unwrap();

        assert_ne!(token1, token2);
        let parsed1 = EncryptedToken::from_bytes(&token1).unwrap();
        let parsed2 = EncryptedToken::from_bytes(&token2).unwrap();
        assert_ne!(parsed1.nonce, parsed2.nonce);
    }

    #[test]
    fn test_wrong_key_fails_decryption() {
        let token = encrypt(&test_key(1), b"secret data").unwrap();
        let result = decrypt(&test_key(2), &token);

        assert!(matches!(result, Err(VaultError::Integrity(_))));
    }

    #[test]
    fn test_tampered_ciphertext_fails_decryption() {
        let key = test_key(4);
        let mut token = encrypt(&key, b"secret data").unwrap();
        token[HEADER_LEN + NONCE_LEN] ^= 0xFF;

        assert!(matches!(decrypt(&key, &token), Err(VaultError::Integrity(_))));
    }

    #[test]
    fn test_tampered_tag_fails_decryption() {
        let key = test_key(4);
        let mut token = encrypt(&key, b"secret data").unwrap();
        let last = token.len() - 1;
        token[last] ^= 0x01;

        assert!(matches!(decrypt(&key, &token), Err(VaultError::Integrity(_))));
    }

    #[test]
    fn test_tampered_timestamp_fails_decryption() {
        let key = test_key(5);
        let mut token = encrypt(&key, b"secret data").unwrap();
        token[8] ^= 0x01;

        assert!(matches!(decrypt(&key, &token), Err(VaultError::Integrity(_))));
    }

    #[test]
    fn test_truncated_token_fails() {
        let key = test_key(6);
        let token = encrypt(&key, b"secret data").unwrap();

        assert!(matches!(decrypt(&key, &token[..token.len() - 1]), Err(VaultError::Integrity(_))));
        assert!(matches!(decrypt(&key, &token[..10]), Err(VaultError::Integrity(_))));
        assert!(matches!(decrypt(&key, &[]), Err(VaultError::Integrity(_))));
    }

    #[test]
    fn test_unknown_version_rejected() {
        let key = test_key(7);
        let mut token = encrypt(&key, b"data").unwrap();
        token[0] = 0x80;

        assert!(matches!(decrypt(&key, &token), Err(VaultError::Integrity(_))));
    }

    #[test]
    fn test_token_parse_and_timestamp() {
        let key = test_key(8);
        let before = Utc::now().timestamp();
        let bytes = encrypt(&key, b"data").unwrap();

        let token = EncryptedToken::from_bytes(&bytes).unwrap();
        assert!(token.issued_at >= before);
        assert!(token.issued_at <= Utc::now().timestamp());
        assert_eq!(token.to_bytes(), bytes);
    }

    #[test]
    fn test_invalid_utf8_is_integrity_error() {
        let key = test_key(9);
        let token = encrypt(&key, &[0xff, 0xfe, 0xfd]).unwrap();

        assert!(matches!(decrypt_string(&key, &token), Err(VaultError::Integrity(_))));
    }
}
