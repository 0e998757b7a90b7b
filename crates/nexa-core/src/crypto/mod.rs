//! Cryptographic primitives for the credential vault
//!
//! This module provides:
//! - PBKDF2-HMAC-SHA256 key derivation from the master password
//! - AES-256-GCM authenticated encryption with self-contained tokens
//! - The master password verifier
//! - Secure memory handling with zeroize

mod encryption;
mod key_derivation;
mod secure_memory;
mod verifier;

pub use encryption::{decrypt, decrypt_string, encrypt, encrypt_string, EncryptedToken, TOKEN_VERSION};
pub use key_derivation::{derive_key, generate_salt, DEFAULT_ITERATIONS, MIN_ITERATIONS, SALT_LEN};
pub use secure_memory::{SecretString, SessionKey};
pub use verifier::{compute_verifier, verifier_matches};
