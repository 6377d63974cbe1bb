//! Uploaded file and its admission checks.

use sha2::{Digest, Sha256};

use crate::error::{ImportError, Result};

/// Declared content types accepted for import. Matched as a case-insensitive
/// substring so parameters such as `; charset=utf-8` are tolerated.
pub const ACCEPTED_CONTENT_TYPES: [&str; 3] = [
    "text/csv",
    "application/vnd.ms-excel",
    "application/octet-stream",
];

/// Default upload size cap: 50 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Raw upload bytes with the client's declared content type.
#[derive(Debug, Clone)]
pub struct Upload {
    content: Vec<u8>,
    content_type: Option<String>,
}

impl Upload {
    pub fn new(content: impl Into<Vec<u8>>, content_type: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            content_type: Some(content_type.into()),
        }
    }

    /// An upload without a declared content type. Always refused.
    pub fn untyped(content: impl Into<Vec<u8>>) -> Self {
        Self {
            content: content.into(),
            content_type: None,
        }
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Hex-encoded SHA-256 of the content.
    pub fn fingerprint(&self) -> String {
        hex::encode(Sha256::digest(&self.content))
    }

    /// Fails unless the declared content type is an accepted one.
    pub fn check_content_type(&self) -> Result<()> {
        let declared = self.content_type.as_deref().unwrap_or_default();
        if is_accepted_content_type(declared) {
            Ok(())
        } else {
            Err(ImportError::UnsupportedContentType {
                content_type: declared.to_string(),
            })
        }
    }

    pub fn check_size(&self, max: usize) -> Result<()> {
        if self.content.len() > max {
            return Err(ImportError::UploadTooLarge {
                size: self.content.len(),
                max,
            });
        }
        Ok(())
    }
}

pub fn is_accepted_content_type(declared: &str) -> bool {
    let declared = declared.to_ascii_lowercase();
    ACCEPTED_CONTENT_TYPES
        .iter()
        .any(|accepted| declared.contains(accepted))
}
