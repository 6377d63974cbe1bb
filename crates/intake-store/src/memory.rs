//! In-memory record store.
//!
//! Inserts are staged per transaction and only appended to the tables on
//! commit, so a failed batch leaves the store untouched. Used for dry runs
//! and as a test double.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{Result, StoreError};
use crate::port::{Inserter, RecordStore};
use crate::row::InsertRow;

/// A committed row with its generated id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredRow {
    pub id: i64,
    pub row: InsertRow,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: BTreeMap<String, Vec<StoredRow>>,
    next_id: i64,
    transactions: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed rows of `table`, oldest first.
    pub fn rows(&self, table: &str) -> &[StoredRow] {
        self.tables.get(table).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn count(&self, table: &str) -> usize {
        self.rows(table).len()
    }

    /// Number of transactions started, committed or not.
    pub fn transactions(&self) -> usize {
        self.transactions
    }
}

impl RecordStore for MemoryStore {
    fn run_in_transaction<T, F>(&mut self, work: F) -> Result<T>
    where
        F: FnOnce(&mut dyn Inserter) -> Result<T>,
    {
        self.transactions += 1;
        let mut staged = Staged {
            rows: Vec::new(),
            next_id: self.next_id,
        };

        let value = work(&mut staged)?;

        self.next_id = staged.next_id;
        for (table, row) in staged.rows {
            self.tables.entry(table).or_default().push(row);
        }
        Ok(value)
    }
}

struct Staged {
    rows: Vec<(String, StoredRow)>,
    next_id: i64,
}

impl Inserter for Staged {
    fn insert(&mut self, table: &str, row: &InsertRow) -> Result<i64> {
        if table.is_empty() {
            return Err(StoreError::UnknownTable(table.to_string()));
        }
        self.next_id += 1;
        let id = self.next_id;
        self.rows.push((
            table.to_string(),
            StoredRow {
                id,
                row: row.clone(),
            },
        ));
        Ok(id)
    }
}
