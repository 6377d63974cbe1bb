//! Data model for tabular record imports.
//!
//! This crate defines the statically declared target schemas and the typed
//! records that an import produces:
//!
//! - [`schema`]: Target schemas with ordered alias tables and required fields
//! - [`record`]: Canonical records built from one source row
//! - [`ids`]: Identity newtypes used for audit attribution
//! - [`result`]: Per-call import counts
//!
//! # Example
//!
//! ```
//! use intake_model::{CASE_SCHEMA, CanonicalRecord, FieldValue};
//!
//! let mut record = CanonicalRecord::new(&CASE_SCHEMA);
//! record.set("applicant_name", Some(FieldValue::Text("Aliyev Vali".into())));
//! assert_eq!(record.missing_required(), vec!["appeal_date"]);
//! ```

pub mod error;
pub mod ids;
pub mod record;
pub mod result;
pub mod schema;

pub use error::{ModelError, Result};
pub use ids::ActorId;
pub use record::{AttributedRecord, CanonicalRecord, FieldValue};
pub use result::ImportResult;
pub use schema::{CARD_SCHEMA, CASE_SCHEMA, EntityKind, FieldKind, FieldSpec, Schema};
