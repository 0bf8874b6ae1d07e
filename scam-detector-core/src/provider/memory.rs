//! In-memory provider
//!
//! Holds a fixed set of rows and serves them newest first. Access can be
//! revoked to simulate a missing runtime permission, and a cursor failure can
//! be injected after a given number of rows. The store counts open cursors so
//! callers can check that every cursor was released.

use super::{CallLogProvider, ProviderRow, RawCallRow, RawSmsRow, RowCursor, SmsProvider};
use crate::{ReaderError, Result};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Fixed-row store for tests and fixtures
pub struct InMemoryStore<R: ProviderRow> {
    name: String,
    rows: Vec<R>,
    access_granted: AtomicBool,
    fail_after: Option<usize>,
    open_cursors: Arc<AtomicUsize>,
}

impl<R: ProviderRow> InMemoryStore<R> {
    /// Create a store; rows are sorted newest first, ties keep insertion order
    pub fn new(name: impl Into<String>, mut rows: Vec<R>) -> Self {
        rows.sort_by_key(|row| std::cmp::Reverse(row.sort_date()));
        Self {
            name: name.into(),
            rows,
            access_granted: AtomicBool::new(true),
            fail_after: None,
            open_cursors: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Make cursors fail once `rows` rows have been yielded
    pub fn with_failure_after(mut self, rows: usize) -> Self {
        self.fail_after = Some(rows);
        self
    }

    /// Grant or revoke read access
    pub fn set_access_granted(&self, granted: bool) {
        self.access_granted.store(granted, Ordering::SeqCst);
    }

    /// Cursors handed out and not yet dropped
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.load(Ordering::SeqCst)
    }

    fn open(&self) -> Result<MemoryCursor<R>> {
        if !self.access_granted.load(Ordering::SeqCst) {
            return Err(ReaderError::PermissionDenied(format!(
                "read access to {} not granted",
                self.name
            )));
        }

        self.open_cursors.fetch_add(1, Ordering::SeqCst);
        Ok(MemoryCursor {
            rows: self.rows.clone().into_iter(),
            yielded: 0,
            fail_after: self.fail_after,
            source: self.name.clone(),
            open_cursors: Arc::clone(&self.open_cursors),
        })
    }
}

struct MemoryCursor<R> {
    rows: std::vec::IntoIter<R>,
    yielded: usize,
    fail_after: Option<usize>,
    source: String,
    open_cursors: Arc<AtomicUsize>,
}

impl<R> RowCursor<R> for MemoryCursor<R> {
    fn next_row(&mut self) -> Result<Option<R>> {
        if self.fail_after == Some(self.yielded) {
            return Err(ReaderError::Read(format!(
                "{} cursor failed after {} rows",
                self.source, self.yielded
            )));
        }

        let row = self.rows.next();
        if row.is_some() {
            self.yielded += 1;
        }
        Ok(row)
    }
}

impl<R> Drop for MemoryCursor<R> {
    fn drop(&mut self) {
        self.open_cursors.fetch_sub(1, Ordering::SeqCst);
    }
}

impl CallLogProvider for InMemoryStore<RawCallRow> {
    fn name(&self) -> &str {
        &self.name
    }

    fn query_calls(&self, _limit: usize) -> Result<Box<dyn RowCursor<RawCallRow>>> {
        Ok(Box::new(self.open()?))
    }
}

impl SmsProvider for InMemoryStore<RawSmsRow> {
    fn name(&self) -> &str {
        &self.name
    }

    fn query_inbox(&self, _limit: usize) -> Result<Box<dyn RowCursor<RawSmsRow>>> {
        Ok(Box::new(self.open()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(number: &str, date: i64) -> RawCallRow {
        RawCallRow {
            number: Some(number.to_string()),
            date: Some(date),
            ..Default::default()
        }
    }

    #[test]
    fn test_rows_served_newest_first() {
        let store = InMemoryStore::new("calls", vec![call("a", 1), call("b", 3), call("c", 2)]);
        let mut cursor = store.query_calls(10).unwrap();

        let mut dates = Vec::new();
        while let Some(row) = cursor.next_row().unwrap() {
            dates.push(row.date.unwrap());
        }
        assert_eq!(dates, vec![3, 2, 1]);
    }

    #[test]
    fn test_cursor_released_on_drop() {
        let store = InMemoryStore::new("calls", vec![call("a", 1)]);
        {
            let _cursor = store.query_calls(1).unwrap();
            assert_eq!(store.open_cursors(), 1);
        }
        assert_eq!(store.open_cursors(), 0);
    }

    #[test]
    fn test_revoked_access() {
        let store = InMemoryStore::new("calls", vec![call("a", 1)]);
        store.set_access_granted(false);

        let result = store.query_calls(1);
        assert!(matches!(result, Err(ReaderError::PermissionDenied(_))));
        assert_eq!(store.open_cursors(), 0);
    }

    #[test]
    fn test_injected_failure() {
        let store =
            InMemoryStore::new("calls", vec![call("a", 2), call("b", 1)]).with_failure_after(1);
        let mut cursor = store.query_calls(10).unwrap();

        assert!(cursor.next_row().unwrap().is_some());
        assert!(matches!(cursor.next_row(), Err(ReaderError::Read(_))));
    }
}
