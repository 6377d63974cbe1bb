//! CSV import orchestration.
//!
//! [`Importer`] ties the pieces together for one upload:
//!
//! 1. admission checks on the [`Upload`] (presence, content type, size)
//! 2. decoding, delimiter detection and the row cap
//! 3. mapping each row to the target schema, counting incomplete rows
//! 4. inserting every complete row in one storage transaction
//!
//! Steps 1 and 2 are also available on their own as [`prepare_upload`], for
//! callers that must refuse a bad upload before opening storage.
//!
//! # Example
//!
//! ```
//! use intake_import::{Importer, Upload};
//! use intake_model::{ActorId, CASE_SCHEMA};
//! use intake_store::MemoryStore;
//!
//! let mut importer = Importer::new(MemoryStore::new());
//! let upload = Upload::new("FIO;Sana\nAliyev Vali;05.03.2024\n;06.03.2024\n", "text/csv");
//! let result = importer
//!     .import(&CASE_SCHEMA, Some(&upload), ActorId::new(1))
//!     .unwrap();
//! assert_eq!((result.inserted, result.skipped), (1, 1));
//! ```

mod error;
mod importer;
mod response;
mod upload;

pub use error::{ImportError, Result};
pub use importer::{ImportStage, Importer, log_outcome, prepare_upload};
pub use response::{ImportResponse, ResponseBody};
pub use upload::{
    ACCEPTED_CONTENT_TYPES, DEFAULT_MAX_UPLOAD_BYTES, Upload, is_accepted_content_type,
};
