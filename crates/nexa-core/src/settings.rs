//! Application settings management
//!
//! Stores non-sensitive configuration in a plain JSON file.
//! Settings are readable before the vault is unlocked.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::crypto::{DEFAULT_ITERATIONS, MIN_ITERATIONS};
use crate::error::{Result, VaultError};
use crate::generator::{DEFAULT_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH};
use crate::paths::LOG_FILE;
use crate::storage::write_atomic;

/// File name of the settings file inside the data directory
pub const SETTINGS_FILE: &str = "settings.json";

/// Application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Settings file version
    pub version: u32,
    /// PBKDF2 rounds for a newly created master password
    pub kdf_iterations: u32,
    /// Default length of generated passwords
    pub password_length: usize,
    /// Log filter used when `RUST_LOG` is not set
    pub log_level: String,
    /// Log file name, relative to the data directory
    pub log_file: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: 1,
            kdf_iterations: DEFAULT_ITERATIONS,
            password_length: DEFAULT_PASSWORD_LENGTH,
            log_level: "debug".to_string(),
            log_file: LOG_FILE.to_string(),
        }
    }
}

impl Settings {
    /// Reject values that would weaken or break the vault
    pub fn validate(&self) -> Result<()> {
        if self.kdf_iterations < MIN_ITERATIONS {
            return Err(VaultError::Validation(format!(
                "kdfIterations must be at least {}",
                MIN_ITERATIONS
            )));
        }
        if self.password_length == 0 || self.password_length > MAX_PASSWORD_LENGTH {
            return Err(VaultError::Validation(format!(
                "passwordLength must be between 1 and {}",
                MAX_PASSWORD_LENGTH
            )));
        }
        Ok(())
    }
}

/// Settings manager
pub struct SettingsManager {
    settings_file: PathBuf,
    settings: Settings,
}

impl SettingsManager {
    /// Load settings from `storage_dir`, falling back to defaults
    pub fn new(storage_dir: &Path) -> Self {
        let settings_file = storage_dir.join(SETTINGS_FILE);
        let settings = match Self::load_from_file(&settings_file) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Ignoring invalid settings file {:?}: {}", settings_file, e);
                Settings::default()
            }
        };

        Self {
            settings_file,
            settings,
        }
    }

    fn load_from_file(path: &Path) -> Result<Settings> {
        if !path.exists() {
            debug!("No settings file found, using defaults");
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&contents)?;
        settings.validate()?;
        debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Save settings to file
    pub fn save(&self) -> Result<()> {
        let contents = serde_json::to_vec_pretty(&self.settings)?;
        write_atomic(&self.settings_file, &contents)?;

        debug!("Saved settings to {:?}", self.settings_file);
        Ok(())
    }

    /// Get current settings
    pub fn get(&self) -> &Settings {
        &self.settings
    }

    /// Validate, replace and save
    pub fn update(&mut self, settings: Settings) -> Result<()> {
        settings.validate()?;
        self.settings = settings;
        self.save()
    }

    pub fn path(&self) -> &Path {
        &self.settings_file
    }
}
