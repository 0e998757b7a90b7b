//! Platform data directory resolution

use directories::BaseDirs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Result, VaultError};

/// Application subdirectory under the platform data directory
pub const APP_DIR: &str = "Nexa";

/// File name of the encrypted record table
pub const VAULT_FILE: &str = "vault.json";

/// File name of the event log
pub const LOG_FILE: &str = "debug.log";

/// Default data directory.
///
/// `%LOCALAPPDATA%\Nexa` on Windows, `~/Library/Application Support/Nexa` on
/// macOS, `~/.local/share/Nexa` elsewhere.
pub fn default_data_dir() -> Result<PathBuf> {
    BaseDirs::new()
        .map(|dirs| dirs.data_local_dir().join(APP_DIR))
        .ok_or_else(|| VaultError::Storage("Could not determine data directory".to_string()))
}

/// Create the directory if needed (owner-only on Unix)
pub fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(dir, std::fs::Permissions::from_mode(0o700))?;
        }

        debug!("Created data directory at {:?}", dir);
    }
    Ok(())
}
