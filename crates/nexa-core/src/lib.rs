//! # nexa-core
//!
//! Core vault functionality for Nexa including:
//! - PBKDF2-HMAC-SHA256 key derivation from the master password
//! - AES-256-GCM authenticated encryption of every stored field
//! - Master password gate with a three-attempt lockout
//! - Encrypted record store with decrypt-and-compare lookups

mod b64;
pub mod crypto;
pub mod error;
pub mod generator;
pub mod master;
pub mod paths;
pub mod record;
pub mod settings;
pub mod storage;
mod vault;

pub use crypto::{decrypt, decrypt_string, derive_key, encrypt, encrypt_string, generate_salt, SessionKey};
pub use error::{Result, VaultError};
pub use generator::generate_password;
pub use master::{GateState, MasterCredential, MasterGate, MAX_ATTEMPTS};
pub use record::{CredentialRecord, Credentials, RecordStore, RecordUpdate};
pub use settings::{Settings, SettingsManager};
pub use storage::{FileTable, MemoryTable, RecordTable};
pub use vault::Vault;
