//! JSON file record table
//!
//! Stores all rows in a single JSON document in the user's data directory.
//! Each field of a row is an independent cipher token, so the file never
//! holds plaintext. Writes go to a temp file which is synced and then renamed
//! over the table, so a reader sees either the old or the new table.

use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

use super::RecordTable;
use crate::error::{Result, VaultError};
use crate::record::CredentialRecord;

const TABLE_VERSION: u32 = 1;

/// Durable record table backed by a JSON file
#[derive(Debug)]
pub struct FileTable {
    path: PathBuf,
    rows: Vec<CredentialRecord>,
}

/// File format for persistent storage
#[derive(Debug, Deserialize)]
struct TableFile {
    version: u32,
    rows: Vec<CredentialRecord>,
}

#[derive(Serialize)]
struct TableFileRef<'a> {
    version: u32,
    rows: &'a [CredentialRecord],
}

impl FileTable {
    /// Open the table at `path`, creating an empty one if it does not exist
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if !path.exists() {
            let mut table = Self {
                path,
                rows: Vec::new(),
            };
            table.commit(Vec::new())?;
            debug!("Created empty record table at {:?}", table.path);
            return Ok(table);
        }

        let contents = fs::read(&path)?;
        let file: TableFile = serde_json::from_slice(&contents).map_err(|e| {
            VaultError::Storage(format!("record table {:?} is unreadable: {}", path, e))
        })?;

        if file.version != TABLE_VERSION {
            return Err(VaultError::Storage(format!(
                "unsupported record table version {} (expected {})",
                file.version, TABLE_VERSION
            )));
        }

        debug!("Loaded {} rows from {:?}", file.rows.len(), path);
        Ok(Self {
            path,
            rows: file.rows,
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist `rows` and, once on disk, make them the current view
    fn commit(&mut self, rows: Vec<CredentialRecord>) -> Result<()> {
        let file = TableFileRef {
            version: TABLE_VERSION,
            rows: &rows,
        };
        let contents = serde_json::to_vec_pretty(&file)?;
        write_atomic(&self.path, &contents)?;

        self.rows = rows;
        debug!("Saved {} rows to storage", self.rows.len());
        Ok(())
    }
}

impl RecordTable for FileTable {
    fn rows(&self) -> &[CredentialRecord] {
        &self.rows
    }

    fn insert(&mut self, record: CredentialRecord) -> Result<()> {
        let mut rows = self.rows.clone();
        rows.push(record);
        self.commit(rows)
    }

    fn replace(&mut self, record: CredentialRecord) -> Result<bool> {
        let Some(index) = self.rows.iter().position(|r| r.id == record.id) else {
            return Ok(false);
        };

        let mut rows = self.rows.clone();
        rows[index] = record;
        self.commit(rows)?;
        Ok(true)
    }

    fn remove(&mut self, id: Uuid) -> Result<bool> {
        let rows: Vec<CredentialRecord> = self.rows.iter().filter(|r| r.id != id).cloned().collect();
        if rows.len() == self.rows.len() {
            return Ok(false);
        }

        self.commit(rows)?;
        Ok(true)
    }
}

/// Replace `path` with `contents` atomically (temp file, fsync, rename)
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let temp_path = path.with_extension("tmp");

    {
        let mut file = File::create(&temp_path)?;
        file.write_all(contents)?;
        file.sync_all()?;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&temp_path, fs::Permissions::from_mode(0o600))?;
    }

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }

    sync_parent(path)
}

/// Flush the directory entry so the rename itself survives a crash
#[cfg(unix)]
fn sync_parent(path: &Path) -> Result<()> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    File::open(parent)?.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
fn sync_parent(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn row(tag: u8) -> CredentialRecord {
        CredentialRecord {
            id: Uuid::new_v4(),
            service: vec![tag; 4],
            username: vec![tag; 2],
            password: vec![tag; 3],
        }
    }

    #[test]
    fn test_write_atomic_replaces_contents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("master.hash");

        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"second");
        assert!(!path.with_extension("tmp").exists());
        let entries = fs::read_dir(temp_dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_open_creates_empty_table() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("vault.json");

        let table = FileTable::open(&path).unwrap();
        assert!(table.is_empty());
        assert!(path.exists());
    }

    #[test]
    fn test_insert_replace_remove() {
        let temp_dir = TempDir::new().unwrap();
        let mut table = FileTable::open(temp_dir.path().join("vault.json")).unwrap();

        let first = row(1);
        let second = row(2);
        table.insert(first.clone()).unwrap();
        table.insert(second.clone()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0], first);

        let mut changed = first.clone();
        changed.password = vec![9; 3];
        assert!(table.replace(changed.clone()).unwrap());
        assert_eq!(table.rows()[0], changed);

        assert!(!table.replace(row(3)).unwrap());

        assert!(table.remove(first.id).unwrap());
        assert!(!table.remove(first.id).unwrap());
        assert_eq!(table.rows(), &[second]);
    }

    #[test]
    fn test_persistence() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("vault.json");
        let first = row(1);
        let second = row(2);

        {
            let mut table = FileTable::open(&path).unwrap();
            table.insert(first.clone()).unwrap();
            table.insert(second.clone()).unwrap();
            table.remove(first.id).unwrap();
        }

        let table = FileTable::open(&path).unwrap();
        assert_eq!(table.rows(), &[second]);
        assert!(!temp_dir.path().join("vault.tmp").exists());
    }

    #[test]
    fn test_file_contains_no_plaintext_columns() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("vault.json");
        let mut table = FileTable::open(&path).unwrap();
        table.insert(row(7)).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(json["version"], 1);
        let stored = json["rows"][0].as_object().unwrap();
        let mut keys: Vec<&str> = stored.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["id", "password", "service", "username"]);
    }

    #[test]
    fn test_corrupt_table_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("vault.json");
        fs::write(&path, "{not json").unwrap();

        assert!(matches!(FileTable::open(&path), Err(VaultError::Storage(_))));
    }

    #[test]
    fn test_unknown_version_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("vault.json");
        fs::write(&path, r#"{"version": 99, "rows": []}"#).unwrap();

        assert!(matches!(FileTable::open(&path), Err(VaultError::Storage(_))));
    }

    #[test]
    fn test_failed_write_leaves_view_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("vault.json");
        let mut table = FileTable::open(&path).unwrap();
        table.insert(row(1)).unwrap();

        // A directory at the temp path makes File::create fail
        fs::create_dir(temp_dir.path().join("vault.tmp")).unwrap();

        assert!(table.insert(row(2)).is_err());
        assert_eq!(table.len(), 1);
        drop(table);
        assert_eq!(FileTable::open(&path).unwrap().len(), 1);
    }
}
