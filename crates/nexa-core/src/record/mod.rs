//! Encrypted credential records and the scan-based store over them

mod store;
mod types;

pub use store::RecordStore;
pub use types::{CredentialRecord, Credentials, RecordUpdate};
