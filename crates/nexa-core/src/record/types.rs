//! Credential record type definitions

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crypto::SecretString;

/// One encrypted row of the vault.
///
/// Each field is an independent cipher token; the service name is only
/// knowable after decryption. `id` is random and carries no plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// Row identifier
    pub id: Uuid,

    #[serde(with = "crate::b64")]
    pub service: Vec<u8>,

    #[serde(with = "crate::b64")]
    pub username: Vec<u8>,

    #[serde(with = "crate::b64")]
    pub password: Vec<u8>,
}

/// Decrypted username/password pair returned by a lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::new(password.into()),
        }
    }
}

/// Fields to replace on an existing record.
///
/// `None` and empty strings leave the stored field untouched.
#[derive(Debug, Clone, Default)]
pub struct RecordUpdate {
    pub service: Option<String>,
    pub username: Option<String>,
    pub password: Option<SecretString>,
}

impl RecordUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rename the service
    pub fn service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(SecretString::new(password.into()));
        self
    }

    pub(crate) fn new_service(&self) -> Option<&str> {
        non_empty(self.service.as_deref())
    }

    pub(crate) fn new_username(&self) -> Option<&str> {
        non_empty(self.username.as_deref())
    }

    pub(crate) fn new_password(&self) -> Option<&str> {
        non_empty(self.password.as_ref().map(SecretString::expose))
    }

    /// True when applying this update would change nothing
    pub fn is_empty(&self) -> bool {
        self.new_service().is_none() && self.new_username().is_none() && self.new_password().is_none()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
