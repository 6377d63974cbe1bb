//! Alias-based field lookup over normalized header keys.

use std::collections::HashMap;

use crate::detect::RawRow;
use crate::header::normalize_key;

/// A row's cells keyed by normalized header.
///
/// When two original headers normalize to the same key, the later column
/// wins.
#[derive(Debug, Clone, Default)]
pub struct KeyMap<'a> {
    entries: HashMap<String, &'a str>,
}

impl<'a> KeyMap<'a> {
    pub fn from_row(row: &'a RawRow) -> Self {
        let entries = row
            .cells()
            .map(|(header, value)| (normalize_key(header), value))
            .collect();
        Self { entries }
    }

    /// Looks up an already-normalized key.
    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.entries.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Returns the first non-empty value found under any alias, in alias order.
pub fn resolve_alias<'a>(keys: &KeyMap<'a>, aliases: &[&str]) -> Option<&'a str> {
    aliases
        .iter()
        .filter_map(|alias| keys.get(&normalize_key(alias)))
        .find(|value| !value.is_empty())
}
