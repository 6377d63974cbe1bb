//! Tabular upload ingestion.
//!
//! This crate turns the raw bytes of a delimited-text export into canonical
//! records for one target schema.
//!
//! # Features
//!
//! - **Decoding**: UTF-8 with or without BOM, UTF-16 spreadsheet exports
//! - **Delimiter detection**: tries `,` `;` and tab, keeps the first that
//!   yields more than one column
//! - **Header aliasing**: case- and punctuation-insensitive header matching
//!   against per-field alias tables
//! - **Coercion**: date, number and text cells with documented fallbacks
//! - **Mapping**: rows mapped onto [`intake_model::Schema`] descriptors
//!
//! # Example
//!
//! ```
//! use intake_ingest::{IngestOptions, RecordMapper, read_table};
//! use intake_model::CARD_SCHEMA;
//!
//! let bytes = b"Card No;Sana;Qoldiq\n8600123412341234;05.03.2024;1 500\n";
//! let table = read_table(bytes, &IngestOptions::default())?;
//! assert_eq!(table.delimiter(), b';');
//!
//! let mapper = RecordMapper::new(&CARD_SCHEMA);
//! let record = mapper.map(&table.rows()[0]);
//! assert!(record.is_complete());
//! # Ok::<(), intake_ingest::IngestError>(())
//! ```

mod alias;
mod coerce;
mod decode;
mod detect;
mod error;
mod header;
mod mapper;
mod options;

// === Error Types ===
pub use error::{IngestError, Result};

// === Header Handling ===
pub use alias::{KeyMap, resolve_alias};
pub use header::normalize_key;

// === Parsing ===
pub use decode::decode_content;
pub use detect::{
    DEFAULT_DELIMITERS, DelimiterPolicy, MAX_IMPORT_ROWS, ParsedTable, RawRow, detect_and_parse,
    enforce_row_cap,
};

// === Coercion ===
pub use coerce::{DateMode, coerce_date, coerce_number, coerce_text};

// === Mapping ===
pub use mapper::RecordMapper;
pub use options::IngestOptions;

/// Decodes, parses and bounds an upload in one step.
///
/// Runs [`decode_content`], [`detect_and_parse`] and [`enforce_row_cap`] with
/// the given options. No row-level work happens when the cap is exceeded.
pub fn read_table(bytes: &[u8], options: &IngestOptions) -> Result<ParsedTable> {
    let content = decode_content(bytes)?;
    let table = detect_and_parse(
        &content,
        &options.delimiter_bytes(),
        options.delimiter_policy,
    )?;
    enforce_row_cap(&table, options.max_rows)?;
    Ok(table)
}
