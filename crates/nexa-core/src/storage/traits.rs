//! Storage trait definitions

use uuid::Uuid;

use crate::error::Result;
use crate::record::CredentialRecord;

/// Trait for record table backends.
///
/// Rows are opaque encrypted records kept in insertion order. Every mutating
/// call is durable once it returns `Ok`; on error the table is unchanged.
pub trait RecordTable {
    /// All rows in insertion order
    fn rows(&self) -> &[CredentialRecord];

    /// Append a row
    fn insert(&mut self, record: CredentialRecord) -> Result<()>;

    /// Overwrite the row with the same id; `false` if no such row exists
    fn replace(&mut self, record: CredentialRecord) -> Result<bool>;

    /// Remove the row with the given id; `false` if nothing was removed
    fn remove(&mut self, id: Uuid) -> Result<bool>;

    /// Number of rows
    fn len(&self) -> usize {
        self.rows().len()
    }

    fn is_empty(&self) -> bool {
        self.rows().is_empty()
    }
}
