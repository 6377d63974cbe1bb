use serde::{Deserialize, Serialize};

/// Counts reported by one import call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportResult {
    /// Rows committed to storage.
    pub inserted: usize,
    /// Rows rejected because a required field was missing.
    pub skipped: usize,
}

impl ImportResult {
    pub fn total(&self) -> usize {
        self.inserted + self.skipped
    }
}
