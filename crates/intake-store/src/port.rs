//! The storage port consumed by the import orchestrator.

use crate::error::Result;
use crate::row::InsertRow;

/// Inserts rows inside an open transaction.
pub trait Inserter {
    /// Inserts one row and returns its generated id.
    fn insert(&mut self, table: &str, row: &InsertRow) -> Result<i64>;
}

/// A store that can run a batch of inserts atomically.
pub trait RecordStore {
    /// Runs `work` inside one transaction.
    ///
    /// Commits when `work` returns `Ok`. Any error, from `work` or from the
    /// commit itself, rolls back every insert made by `work`.
    fn run_in_transaction<T, F>(&mut self, work: F) -> Result<T>
    where
        F: FnOnce(&mut dyn Inserter) -> Result<T>;
}

impl<S: RecordStore> RecordStore for &mut S {
    fn run_in_transaction<T, F>(&mut self, work: F) -> Result<T>
    where
        F: FnOnce(&mut dyn Inserter) -> Result<T>,
    {
        (**self).run_in_transaction(work)
    }
}
