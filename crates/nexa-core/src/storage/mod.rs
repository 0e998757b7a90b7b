//! Storage backends for the encrypted record table
//!
//! This module provides two backends:
//! 1. JSON file with atomic replace-on-write (durable)
//! 2. In-memory table (tests, ephemeral use)

mod file_table;
mod memory;
mod traits;

pub(crate) use file_table::write_atomic;
pub use file_table::FileTable;
pub use memory::MemoryTable;
pub use traits::RecordTable;
