//! Main vault orchestration

use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

use crate::crypto::SessionKey;
use crate::error::{Result, VaultError};
use crate::generator::generate_password;
use crate::master::{GateState, MasterCredential, MasterGate};
use crate::paths::{default_data_dir, ensure_dir, VAULT_FILE};
use crate::record::{Credentials, RecordStore, RecordUpdate};
use crate::settings::{Settings, SettingsManager};
use crate::storage::FileTable;

/// Key and record store held while the vault is unlocked
struct Session {
    key: SessionKey,
    store: RecordStore<FileTable>,
}

/// Vault facade: master gate, settings and the record store of one data directory
pub struct Vault {
    data_dir: PathBuf,
    gate: MasterGate,
    settings: SettingsManager,
    session: Option<Session>,
}

impl Vault {
    /// Open the vault in the platform data directory
    pub fn open_default() -> Result<Self> {
        Self::open(&default_data_dir()?)
    }

    /// Open the vault rooted at `data_dir`, creating the directory if needed
    pub fn open(data_dir: &Path) -> Result<Self> {
        ensure_dir(data_dir)?;

        let settings = SettingsManager::new(data_dir);
        let gate = MasterGate::new(data_dir).with_iterations(settings.get().kdf_iterations)?;

        debug!("Opened vault at {:?} ({:?})", data_dir, gate.state());
        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            gate,
            settings,
            session: None,
        })
    }

    /// Override the iteration count used for a new master password
    pub fn with_iterations(mut self, iterations: u32) -> Result<Self> {
        self.gate = self.gate.with_iterations(iterations)?;
        Ok(self)
    }

    #[cfg(test)]
    pub(crate) fn with_test_iterations(mut self, iterations: u32) -> Self {
        self.gate = self.gate.with_test_iterations(iterations);
        self
    }

    pub fn state(&self) -> GateState {
        self.gate.state()
    }

    pub fn is_unlocked(&self) -> bool {
        self.session.is_some()
    }

    /// True once a master password has been created
    pub fn is_initialized(&self) -> bool {
        self.gate.is_set()
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn settings(&self) -> &Settings {
        self.settings.get()
    }

    /// Create the master password (first run only)
    pub fn initialize(&mut self, password: &str, confirmation: &str) -> Result<MasterCredential> {
        info!("Initializing new vault");
        self.gate.set_master_password(password, confirmation)
    }

    /// Single unlock attempt
    pub fn unlock(&mut self, password: &str) -> Result<()> {
        if self.is_unlocked() {
            debug!("Vault already unlocked");
            return Ok(());
        }

        let key = self.gate.verify(password)?;
        self.start_session(key)
    }

    /// Unlock with up to three prompted attempts
    pub fn unlock_with<F>(&mut self, prompt: F) -> Result<()>
    where
        F: FnMut(u32) -> Result<String>,
    {
        if self.is_unlocked() {
            return Ok(());
        }

        let key = self.gate.unlock_with(prompt)?;
        self.start_session(key)
    }

    fn start_session(&mut self, key: SessionKey) -> Result<()> {
        let table = FileTable::open(self.data_dir.join(VAULT_FILE))?;
        self.session = Some(Session {
            key,
            store: RecordStore::new(table),
        });

        info!("Vault unlocked");
        Ok(())
    }

    /// Discard the session key
    pub fn lock(&mut self) {
        self.session = None;
        self.gate.lock();
        info!("Vault locked");
    }

    fn session(&self) -> Result<&Session> {
        self.session.as_ref().ok_or(VaultError::Locked)
    }

    fn session_mut(&mut self) -> Result<&mut Session> {
        self.session.as_mut().ok_or(VaultError::Locked)
    }

    /// Store a new credential
    pub fn add(&mut self, service: &str, username: &str, password: &str) -> Result<Uuid> {
        let session = self.session_mut()?;
        session.store.create(&session.key, service, username, password)
    }

    /// Decrypted service names, in insertion order
    pub fn services(&self) -> Result<Vec<String>> {
        let session = self.session()?;
        Ok(session.store.list_services(&session.key))
    }

    /// Look up credentials by service name (case-insensitive)
    pub fn find(&self, service: &str) -> Result<Option<Credentials>> {
        let session = self.session()?;
        Ok(session.store.find(&session.key, service))
    }

    pub fn update(&mut self, service: &str, update: &RecordUpdate) -> Result<bool> {
        let session = self.session_mut()?;
        session.store.update(&session.key, service, update)
    }

    pub fn delete(&mut self, service: &str) -> Result<bool> {
        let session = self.session_mut()?;
        session.store.delete(&session.key, service)
    }

    /// Generate a password, using the configured length when none is given
    pub fn generate_password(&self, length: Option<usize>) -> Result<String> {
        generate_password(length.unwrap_or(self.settings.get().password_length))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_vault() -> (Vault, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let vault = Vault::open(temp_dir.path()).unwrap().with_test_iterations(1_000);
        (vault, temp_dir)
    }

    #[test]
    fn test_initialize_and_unlock() {
        let (mut vault, _temp) = test_vault();
        assert_eq!(vault.state(), GateState::NoMasterSet);
        assert!(!vault.is_initialized());

        vault.initialize("test-password", "test-password").unwrap();
        assert_eq!(vault.state(), GateState::Locked);

        vault.unlock("test-password").unwrap();
        assert_eq!(vault.state(), GateState::Unlocked);
        assert!(vault.is_unlocked());

        vault.lock();
        assert_eq!(vault.state(), GateState::Locked);
        assert!(matches!(vault.services(), Err(VaultError::Locked)));
    }

    #[test]
    fn test_locked_vault_refuses_record_operations() {
        let (mut vault, _temp) = test_vault();
        vault.initialize("pw", "pw").unwrap();

        assert!(matches!(vault.add("a", "b", "c"), Err(VaultError::Locked)));
        assert!(matches!(vault.find("a"), Err(VaultError::Locked)));
        assert!(matches!(vault.delete("a"), Err(VaultError::Locked)));
    }

    #[test]
    fn test_wrong_password() {
        let (mut vault, _temp) = test_vault();
        vault.initialize("correct-password", "correct-password").unwrap();

        let result = vault.unlock("wrong-password");
        assert!(matches!(result, Err(VaultError::Mismatch { .. })));
        assert!(!vault.is_unlocked());
    }

    #[test]
    fn test_records_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();

        {
            let mut vault = Vault::open(temp_dir.path()).unwrap().with_test_iterations(1_000);
            vault.initialize("pw", "pw").unwrap();
            vault.unlock("pw").unwrap();
            vault.add("GitHub", "alice", "pw1").unwrap();
        }

        let mut vault = Vault::open(temp_dir.path()).unwrap().with_test_iterations(1_000);
        assert_eq!(vault.state(), GateState::Locked);
        vault.unlock("pw").unwrap();
        assert_eq!(vault.find("github").unwrap(), Some(Credentials::new("alice", "pw1")));
    }

    #[test]
    fn test_iteration_floor() {
        let temp_dir = TempDir::new().unwrap();

        assert!(matches!(
            Vault::open(temp_dir.path()).unwrap().with_iterations(1),
            Err(VaultError::InvalidInput(_))
        ));

        {
            let mut vault = Vault::open(temp_dir.path()).unwrap().with_test_iterations(1);
            vault.initialize("pw", "pw").unwrap();
        }

        // A production vault does not accept the weak record
        let mut vault = Vault::open(temp_dir.path()).unwrap();
        assert!(!vault.is_initialized());
        assert!(matches!(vault.unlock("pw"), Err(VaultError::StorageCorrupt(_))));
        assert!(!vault.is_unlocked());
    }

    #[test]
    fn test_generate_uses_configured_length() {
        let (vault, _temp) = test_vault();

        assert_eq!(vault.generate_password(None).unwrap().len(), 16);
        assert_eq!(vault.generate_password(Some(8)).unwrap().len(), 8);
    }
}
