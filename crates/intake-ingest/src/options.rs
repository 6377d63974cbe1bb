use serde::{Deserialize, Serialize};

use crate::coerce::DateMode;
use crate::detect::{DEFAULT_DELIMITERS, DelimiterPolicy, MAX_IMPORT_ROWS};

/// Tunables for parsing and mapping an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestOptions {
    /// Largest accepted number of data rows.
    pub max_rows: usize,
    /// Candidate delimiters in trial order. Non-ASCII entries are ignored.
    pub delimiters: Vec<char>,
    pub delimiter_policy: DelimiterPolicy,
    pub date_mode: DateMode,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            max_rows: MAX_IMPORT_ROWS,
            delimiters: DEFAULT_DELIMITERS.iter().copied().map(char::from).collect(),
            delimiter_policy: DelimiterPolicy::default(),
            date_mode: DateMode::default(),
        }
    }
}

impl IngestOptions {
    #[must_use]
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }

    #[must_use]
    pub fn with_delimiter_policy(mut self, policy: DelimiterPolicy) -> Self {
        self.delimiter_policy = policy;
        self
    }

    #[must_use]
    pub fn with_date_mode(mut self, mode: DateMode) -> Self {
        self.date_mode = mode;
        self
    }

    /// Delimiters as parser bytes.
    pub fn delimiter_bytes(&self) -> Vec<u8> {
        self.delimiters
            .iter()
            .filter(|c| c.is_ascii())
            .map(|&c| c as u8)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = IngestOptions::default();
        assert_eq!(options.max_rows, 10_000);
        assert_eq!(options.delimiter_bytes(), vec![b',', b';', b'\t']);
        assert_eq!(options.delimiter_policy, DelimiterPolicy::FallbackToLast);
        assert_eq!(options.date_mode, DateMode::Lenient);
    }

    #[test]
    fn test_from_toml_with_partial_fields() {
        let options: IngestOptions = toml::from_str(
            r#"
            delimiters = [";", "\t", "|"]
            delimiter_policy = "fail_closed"
            "#,
        )
        .unwrap();
        assert_eq!(options.delimiter_bytes(), vec![b';', b'\t', b'|']);
        assert_eq!(options.delimiter_policy, DelimiterPolicy::FailClosed);
        assert_eq!(options.max_rows, 10_000);
    }

    #[test]
    fn test_non_ascii_delimiters_ignored() {
        let options = IngestOptions {
            delimiters: vec!['¦', ','],
            ..IngestOptions::default()
        };
        assert_eq!(options.delimiter_bytes(), vec![b',']);
    }
}
