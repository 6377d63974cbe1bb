//! Storage error types.

use std::path::PathBuf;
use thiserror::Error;

/// Storage operation error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database directory could not be created.
    #[error("failed to create database directory {path}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Database file could not be opened or configured.
    #[error("failed to open database {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Schema creation failed.
    #[error("failed to apply database schema")]
    Schema {
        #[source]
        source: rusqlite::Error,
    },

    /// A single insert failed (constraint violation, I/O error, ...).
    #[error("failed to insert into {table}")]
    Insert {
        table: String,
        #[source]
        source: rusqlite::Error,
    },

    /// Insert refused by a store layered over another one, such as a
    /// wrapper enforcing its own limits or a test double. The built-in
    /// adapters never return it.
    #[error("insert into {table} rejected: {reason}")]
    Rejected { table: String, reason: String },

    /// Begin or commit failed.
    #[error("failed to {operation} transaction")]
    Transaction {
        operation: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    /// Read query failed.
    #[error("failed to query {table}")]
    Query {
        table: String,
        #[source]
        source: rusqlite::Error,
    },

    /// Table is not one this store manages.
    #[error("unknown table '{0}'")]
    UnknownTable(String),

    /// Column name is not a plain identifier.
    #[error("invalid column name '{0}'")]
    InvalidColumn(String),
}

/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_names_table_and_reason() {
        let err = StoreError::Rejected {
            table: "appeals".into(),
            reason: "batch limit reached".into(),
        };
        assert_eq!(
            err.to_string(),
            "insert into appeals rejected: batch limit reached"
        );
    }
}
