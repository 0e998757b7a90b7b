//! In-memory record table for tests and ephemeral vaults

use uuid::Uuid;

use super::RecordTable;
use crate::error::Result;
use crate::record::CredentialRecord;

/// Record table held entirely in memory
#[derive(Debug, Default)]
pub struct MemoryTable {
    rows: Vec<CredentialRecord>,
}

impl MemoryTable {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordTable for MemoryTable {
    fn rows(&self) -> &[CredentialRecord] {
        &self.rows
    }

    fn insert(&mut self, record: CredentialRecord) -> Result<()> {
        self.rows.push(record);
        Ok(())
    }

    fn replace(&mut self, record: CredentialRecord) -> Result<bool> {
        match self.rows.iter_mut().find(|r| r.id == record.id) {
            Some(slot) => {
                *slot = record;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn remove(&mut self, id: Uuid) -> Result<bool> {
        let before = self.rows.len();
        self.rows.retain(|r| r.id != id);
        Ok(self.rows.len() != before)
    }
}
