//! Storage for imported records.
//!
//! The import orchestrator only sees the [`RecordStore`] port: a batch of
//! inserts runs inside one transaction and either commits as a whole or
//! leaves no trace.
//!
//! Two adapters are provided:
//!
//! - [`SqliteStore`]: the application database (`users`, `appeals`,
//!   `drop_cards`)
//! - [`MemoryStore`]: staged in-memory tables for dry runs and tests

mod error;
mod memory;
mod port;
mod row;
mod sqlite;

pub use error::{Result, StoreError};
pub use memory::{MemoryStore, StoredRow};
pub use port::{Inserter, RecordStore};
pub use row::{ColumnValue, InsertRow};
pub use sqlite::SqliteStore;
