//! JSON response shape for an import call.

use intake_model::ImportResult;
use serde::Serialize;

use crate::error::ImportError;

/// Body returned to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Success {
        ok: bool,
        inserted: usize,
        skipped: usize,
    },
    Failure {
        error: String,
    },
}

/// Status code plus body for one import call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportResponse {
    status: u16,
    body: ResponseBody,
}

impl ImportResponse {
    pub fn success(result: ImportResult) -> Self {
        Self {
            status: 200,
            body: ResponseBody::Success {
                ok: true,
                inserted: result.inserted,
                skipped: result.skipped,
            },
        }
    }

    pub fn failure(error: &ImportError) -> Self {
        Self {
            status: error.status_code(),
            body: ResponseBody::Failure {
                error: error.user_message(),
            },
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    pub fn is_success(&self) -> bool {
        matches!(self.body, ResponseBody::Success { .. })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.body)
    }
}

impl From<&Result<ImportResult, ImportError>> for ImportResponse {
    fn from(outcome: &Result<ImportResult, ImportError>) -> Self {
        match outcome {
            Ok(result) => Self::success(*result),
            Err(error) => Self::failure(error),
        }
    }
}
