//! Import error types.

use intake_ingest::IngestError;
use intake_store::StoreError;
use thiserror::Error;

/// Why an import was refused or failed.
///
/// Everything except [`ImportError::Storage`] is an input problem the caller
/// can fix; none of those touch storage.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("no file was uploaded")]
    MissingFile,

    #[error("unsupported content type '{content_type}'")]
    UnsupportedContentType { content_type: String },

    #[error("upload of {size} bytes exceeds the {max} byte limit")]
    UploadTooLarge { size: usize, max: usize },

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("storage failed during import")]
    Storage(#[from] StoreError),
}

impl ImportError {
    /// True for errors caused by the upload itself.
    pub fn is_input(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }

    /// HTTP-style status: 400 for input errors, 500 for storage failures.
    pub fn status_code(&self) -> u16 {
        if self.is_input() { 400 } else { 500 }
    }

    /// Message for the response body. Storage details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingFile => "A CSV file is required (field name: file)".to_string(),
            Self::UnsupportedContentType { .. } => "Only CSV files are accepted".to_string(),
            Self::UploadTooLarge { max, .. } => {
                format!("File is too large (max {} MiB)", max / (1024 * 1024))
            }
            Self::Ingest(IngestError::TooManyRows { max, .. }) => {
                format!("Too many rows (max {max})")
            }
            Self::Ingest(IngestError::UndecodableContent { encoding }) => {
                format!("File is not valid {encoding} text")
            }
            Self::Ingest(IngestError::EmptyContent | IngestError::DelimiterUndetectable) => {
                "CSV parse error or empty file".to_string()
            }
            Self::Storage(_) => "Import failed while saving records".to_string(),
        }
    }

    /// A hint for resolving the error, when there is one.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::MissingFile => None,
            Self::UnsupportedContentType { .. } => {
                Some("Export the sheet as CSV (comma, semicolon or tab separated).".into())
            }
            Self::UploadTooLarge { .. } | Self::Ingest(IngestError::TooManyRows { .. }) => {
                Some("Split the file into smaller parts and import them one by one.".into())
            }
            Self::Ingest(IngestError::UndecodableContent { .. }) => {
                Some("Save the file with UTF-8 encoding.".into())
            }
            Self::Ingest(IngestError::DelimiterUndetectable) => {
                Some("Separate columns with a comma, semicolon or tab.".into())
            }
            Self::Ingest(IngestError::EmptyContent) => {
                Some("Make sure the file has a header row and at least one data row.".into())
            }
            Self::Storage(_) => Some("No records were saved. Try the import again.".into()),
        }
    }
}

/// Result type alias for import operations.
pub type Result<T> = std::result::Result<T, ImportError>;
