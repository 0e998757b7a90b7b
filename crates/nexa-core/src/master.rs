//! Master password gate
//!
//! Persists a salt and verifier for the master password and checks login
//! attempts against it. Three consecutive failures lock the gate for the rest
//! of the process.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::crypto::{
    compute_verifier, derive_key, generate_salt, verifier_matches, SessionKey, DEFAULT_ITERATIONS,
    MIN_ITERATIONS, SALT_LEN,
};
use crate::error::{Result, VaultError};
use crate::storage::write_atomic;

/// File name of the master credential inside the data directory
pub const MASTER_FILE: &str = "master.hash";

/// Login attempts allowed before lockout
pub const MAX_ATTEMPTS: u32 = 3;

fn default_iterations() -> u32 {
    DEFAULT_ITERATIONS
}

/// Stored salt and verifier for the master password
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterCredential {
    #[serde(with = "crate::b64")]
    pub salt: Vec<u8>,

    #[serde(with = "crate::b64")]
    pub verifier_hash: Vec<u8>,

    /// PBKDF2 rounds used for both the verifier and the session key
    #[serde(default = "default_iterations")]
    pub iterations: u32,
}

impl MasterCredential {
    fn validate(&self, min_iterations: u32) -> Result<()> {
        if self.salt.len() != SALT_LEN {
            return Err(VaultError::StorageCorrupt(format!(
                "salt is {} bytes, expected {}",
                self.salt.len(),
                SALT_LEN
            )));
        }
        if self.verifier_hash.is_empty() {
            return Err(VaultError::StorageCorrupt("empty verifier".to_string()));
        }
        if self.iterations < min_iterations {
            return Err(VaultError::StorageCorrupt(format!(
                "iteration count {} is below the minimum of {}",
                self.iterations, min_iterations
            )));
        }
        Ok(())
    }
}

/// Gate state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// No master password has been created yet
    NoMasterSet,
    /// Master password exists, not yet verified this run
    Locked,
    /// Verified; a session key has been handed out
    Unlocked,
    /// Attempt cap exceeded; terminal for this process
    LockedOut,
}

/// Master password gate backed by a JSON file
#[derive(Debug)]
pub struct MasterGate {
    path: PathBuf,
    iterations: u32,
    min_iterations: u32,
    state: GateState,
    failures: u32,
}

impl MasterGate {
    /// Create a gate for the master file inside `data_dir`
    pub fn new(data_dir: &Path) -> Self {
        Self::at_path(data_dir.join(MASTER_FILE))
    }

    /// Create a gate for an explicit master file path
    pub fn at_path(path: PathBuf) -> Self {
        let mut gate = Self {
            path,
            iterations: DEFAULT_ITERATIONS,
            min_iterations: MIN_ITERATIONS,
            state: GateState::NoMasterSet,
            failures: 0,
        };
        gate.refresh_state();
        gate
    }

    /// Iteration count used when a new master password is created.
    ///
    /// Counts below [`MIN_ITERATIONS`] are rejected.
    pub fn with_iterations(mut self, iterations: u32) -> Result<Self> {
        if iterations < self.min_iterations {
            return Err(VaultError::InvalidInput(format!(
                "iteration count {} is below the minimum of {}",
                iterations, self.min_iterations
            )));
        }
        self.iterations = iterations;
        Ok(self)
    }

    /// Lower the iteration floor for fast unit tests
    #[cfg(test)]
    pub(crate) fn with_test_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self.min_iterations = 1;
        self.refresh_state();
        self
    }

    fn refresh_state(&mut self) {
        self.state = if self.is_set() {
            GateState::Locked
        } else {
            GateState::NoMasterSet
        };
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    /// True iff a well-formed verifier record exists
    pub fn is_set(&self) -> bool {
        self.load().is_ok()
    }

    /// Read and validate the stored master credential
    pub fn load(&self) -> Result<MasterCredential> {
        let contents = match std::fs::read(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(VaultError::StorageMissing(self.path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let credential: MasterCredential = serde_json::from_slice(&contents)
            .map_err(|e| VaultError::StorageCorrupt(e.to_string()))?;
        credential.validate(self.min_iterations)?;
        Ok(credential)
    }

    /// Create the master password.
    ///
    /// Only allowed while no master password exists; an existing verifier is
    /// never overwritten.
    pub fn set_master_password(&mut self, password: &str, confirmation: &str) -> Result<MasterCredential> {
        if self.is_set() {
            return Err(VaultError::AlreadyInitialized);
        }
        if password.is_empty() {
            error!("Password cannot be empty.");
            return Err(VaultError::Validation("Password cannot be empty.".to_string()));
        }
        if password != confirmation {
            error!("Passwords do not match.");
            return Err(VaultError::Validation("Passwords do not match.".to_string()));
        }

        let salt = generate_salt();
        let key = derive_key(password, &salt, self.iterations)?;

        let credential = MasterCredential {
            salt: salt.to_vec(),
            verifier_hash: compute_verifier(&key).to_vec(),
            iterations: self.iterations,
        };

        let contents = serde_json::to_vec(&credential)?;
        write_atomic(&self.path, &contents)?;

        self.state = GateState::Locked;
        self.failures = 0;
        info!("Master password set successfully.");
        Ok(credential)
    }

    /// Check one login attempt.
    ///
    /// Returns the session key on success. A wrong password yields
    /// [`VaultError::Mismatch`] until the third consecutive failure, which
    /// yields [`VaultError::LockedOut`]; after that every call is refused.
    pub fn verify(&mut self, password: &str) -> Result<SessionKey> {
        if self.state == GateState::LockedOut {
            return Err(VaultError::LockedOut);
        }

        let credential = self.load().map_err(|e| {
            error!("Master password file invalid or missing: {}", e);
            e
        })?;

        let candidate = match derive_key(password, &credential.salt, credential.iterations) {
            Ok(key) => Some(key),
            Err(VaultError::InvalidInput(_)) => None,
            Err(e) => return Err(e),
        };

        if let Some(key) = candidate {
            if verifier_matches(&key, &credential.verifier_hash) {
                self.state = GateState::Unlocked;
                self.failures = 0;
                info!("Master password verified.");
                return Ok(key);
            }
        }

        self.failures += 1;
        error!("Incorrect master password attempt {}.", self.failures);

        if self.failures >= MAX_ATTEMPTS {
            self.state = GateState::LockedOut;
            warn!("Too many failed attempts, gate locked out");
            return Err(VaultError::LockedOut);
        }

        Err(VaultError::Mismatch {
            remaining: MAX_ATTEMPTS - self.failures,
        })
    }

    /// Run the attempt loop, asking `prompt` for a password each time.
    ///
    /// `prompt` receives the 1-based attempt number. The master file is
    /// checked before the first prompt so a missing vault fails immediately.
    pub fn unlock_with<F>(&mut self, mut prompt: F) -> Result<SessionKey>
    where
        F: FnMut(u32) -> Result<String>,
    {
        if self.state == GateState::LockedOut {
            return Err(VaultError::LockedOut);
        }
        self.load()?;

        loop {
            let password = prompt(self.failures + 1)?;
            match self.verify(&password) {
                Err(VaultError::Mismatch { remaining }) => {
                    debug!("{} attempts remaining", remaining);
                }
                other => return other,
            }
        }
    }

    /// Return to the locked state (the caller drops its session key)
    pub fn lock(&mut self) {
        if self.state == GateState::Unlocked {
            self.state = GateState::Locked;
        }
    }
}
