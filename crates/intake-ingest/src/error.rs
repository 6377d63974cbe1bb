//! Error types for upload ingestion.

use thiserror::Error;

/// Errors that reject an upload before any row is mapped.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IngestError {
    /// No candidate delimiter parsed, or the table has no data rows.
    #[error("empty or unparseable content")]
    EmptyContent,

    /// Bytes are not valid text in the detected encoding.
    #[error("content is not valid {encoding} text")]
    UndecodableContent { encoding: &'static str },

    /// No candidate delimiter produced more than one column.
    #[error("delimiter could not be detected")]
    DelimiterUndetectable,

    /// Row count exceeds the per-import cap.
    #[error("too many rows: {rows} (max {max})")]
    TooManyRows { rows: usize, max: usize },
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
