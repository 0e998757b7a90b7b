//! Record store: CRUD over encrypted rows
//!
//! No plaintext index exists, so every lookup decrypts the service field of
//! each row in turn. Rows that fail decryption are skipped and logged.

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::types::{CredentialRecord, Credentials, RecordUpdate};
use crate::crypto::{decrypt_string, encrypt_string, SessionKey};
use crate::error::{Result, VaultError};
use crate::storage::RecordTable;

/// Encrypted record store over a table backend
pub struct RecordStore<T: RecordTable> {
    table: T,
}

impl<T: RecordTable> RecordStore<T> {
    pub fn new(table: T) -> Self {
        Self { table }
    }

    #[cfg(test)]
    pub(crate) fn table(&self) -> &T {
        &self.table
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> T {
        self.table
    }

    /// Encrypt all three fields independently and append a new row.
    ///
    /// Duplicate service names are allowed.
    pub fn create(
        &mut self,
        key: &SessionKey,
        service: &str,
        username: &str,
        password: &str,
    ) -> Result<Uuid> {
        require("Service name", service)?;
        require("Username", username)?;
        require("Password", password)?;

        let record = CredentialRecord {
            id: Uuid::new_v4(),
            service: encrypt_string(key, service)?,
            username: encrypt_string(key, username)?,
            password: encrypt_string(key, password)?,
        };
        let id = record.id;

        self.table.insert(record)?;

        info!(row = %id, "Added credential row");
        debug!("Added credentials for service: {}", service);
        Ok(id)
    }

    /// Decrypt the service name of every row.
    ///
    /// Rows that fail integrity are logged and left out; partial results are
    /// still returned.
    pub fn list_services(&self, key: &SessionKey) -> Vec<String> {
        let mut services = Vec::with_capacity(self.table.len());
        for record in self.table.rows() {
            match decrypt_string(key, &record.service) {
                Ok(service) => services.push(service),
                Err(e) => log_integrity_failure(record.id, &e),
            }
        }
        services
    }

    /// Return the credentials of the first row whose service matches
    /// (case-insensitive)
    pub fn find(&self, key: &SessionKey, service: &str) -> Option<Credentials> {
        let wanted = service.to_lowercase();

        for record in self.table.rows() {
            match decrypt_string(key, &record.service) {
                Ok(candidate) if candidate.to_lowercase() == wanted => {
                    match decrypt_credentials(key, record) {
                        Ok(credentials) => return Some(credentials),
                        Err(e) => log_integrity_failure(record.id, &e),
                    }
                }
                Ok(_) => {}
                Err(e) => log_integrity_failure(record.id, &e),
            }
        }

        debug!("No matching service: {}", service);
        None
    }

    /// Re-encrypt and overwrite the supplied fields of the first matching row.
    ///
    /// Returns `false` if no row matched.
    pub fn update(&mut self, key: &SessionKey, service: &str, update: &RecordUpdate) -> Result<bool> {
        let Some(index) = self.locate(key, service) else {
            debug!("No matching service for update: {}", service);
            return Ok(false);
        };

        if update.is_empty() {
            return Ok(true);
        }

        let mut record = self.table.rows()[index].clone();
        if let Some(username) = update.new_username() {
            record.username = encrypt_string(key, username)?;
        }
        if let Some(password) = update.new_password() {
            record.password = encrypt_string(key, password)?;
        }
        if let Some(new_service) = update.new_service() {
            record.service = encrypt_string(key, new_service)?;
        }

        let id = record.id;
        if !self.table.replace(record)? {
            return Err(VaultError::Storage(format!("row {} vanished during update", id)));
        }

        info!(row = %id, "Updated credential row");
        debug!("Updated credentials for: {}", service);
        Ok(true)
    }

    /// Remove the first matching row.
    ///
    /// Returns `false` if no row matched or the table removed nothing.
    pub fn delete(&mut self, key: &SessionKey, service: &str) -> Result<bool> {
        let Some(index) = self.locate(key, service) else {
            debug!("No matching service for deletion: {}", service);
            return Ok(false);
        };

        let id = self.table.rows()[index].id;
        if !self.table.remove(id)? {
            warn!(row = %id, "Delete affected zero rows");
            return Ok(false);
        }

        info!(row = %id, "Deleted credential row");
        debug!("Deleted service: {}", service);
        Ok(true)
    }

    /// Index of the first row whose decrypted service matches
    fn locate(&self, key: &SessionKey, service: &str) -> Option<usize> {
        let wanted = service.to_lowercase();

        self.table.rows().iter().position(|record| {
            match decrypt_string(key, &record.service) {
                Ok(candidate) => candidate.to_lowercase() == wanted,
                Err(e) => {
                    log_integrity_failure(record.id, &e);
                    false
                }
            }
        })
    }
}

fn decrypt_credentials(key: &SessionKey, record: &CredentialRecord) -> Result<Credentials> {
    let username = decrypt_string(key, &record.username)?;
    let password = decrypt_string(key, &record.password)?;
    Ok(Credentials::new(username, password))
}

fn log_integrity_failure(id: Uuid, error: &VaultError) {
    warn!(row = %id, "Row failed integrity check, skipping: {}", error);
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(VaultError::Validation(format!("{} is required", field)));
    }
    Ok(())
}
