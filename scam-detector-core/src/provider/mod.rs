//! Content Providers
//!
//! Readers never talk to a concrete store. They query a provider, which hands
//! back a cursor over raw rows sorted by date, newest first. Every column of
//! a raw row is optional: a provider reports a missing column or a NULL value
//! as `None` and the readers apply the fallbacks.
//!
//! ## Cursor Lifetime
//!
//! A cursor owns whatever handle the provider opened for the query and
//! releases it when dropped, so the handle is closed on every exit path of
//! a read, including early returns on error.
//!
//! ## Implementations
//!
//! - [`memory::InMemoryStore`] - fixed rows, with switches for denied access
//!   and injected cursor failures
//! - [`sqlite::SqliteCallLog`] / [`sqlite::SqliteSmsInbox`] - read-only
//!   access to Android-shaped `calls` and `sms` tables

pub mod memory;
pub mod sqlite;

use crate::Result;

pub use memory::InMemoryStore;
pub use sqlite::{SqliteCallLog, SqliteSmsInbox};

/// Call-log row as the provider stores it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCallRow {
    pub number: Option<String>,
    pub cached_name: Option<String>,
    /// Milliseconds since epoch
    pub date: Option<i64>,
    /// Seconds
    pub duration: Option<i64>,
    /// Provider type code (1 incoming, 2 outgoing, 3 missed, ...)
    pub call_type: Option<i64>,
}

/// Inbox SMS row as the provider stores it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSmsRow {
    pub address: Option<String>,
    pub body: Option<String>,
    /// Milliseconds since epoch
    pub date: Option<i64>,
}

/// Row with a sort date
pub trait ProviderRow: Clone + Send + Sync {
    /// Date used for newest-first ordering; a missing date sorts as 0
    fn sort_date(&self) -> i64;
}

impl ProviderRow for RawCallRow {
    fn sort_date(&self) -> i64 {
        self.date.unwrap_or(0)
    }
}

impl ProviderRow for RawSmsRow {
    fn sort_date(&self) -> i64 {
        self.date.unwrap_or(0)
    }
}

/// Forward-only cursor over provider rows
pub trait RowCursor<R> {
    /// Advance to the next row, `Ok(None)` once exhausted
    fn next_row(&mut self) -> Result<Option<R>>;
}

/// Cursor over rows that were fetched up front
pub struct VecCursor<R> {
    rows: std::vec::IntoIter<R>,
}

impl<R> VecCursor<R> {
    pub fn new(rows: Vec<R>) -> Self {
        Self {
            rows: rows.into_iter(),
        }
    }
}

impl<R> RowCursor<R> for VecCursor<R> {
    fn next_row(&mut self) -> Result<Option<R>> {
        Ok(self.rows.next())
    }
}

/// Read-only call-history store
pub trait CallLogProvider: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Query call rows, newest first
    ///
    /// `limit` is a hint; readers stop pulling rows once they have enough.
    fn query_calls(&self, limit: usize) -> Result<Box<dyn RowCursor<RawCallRow>>>;
}

/// Read-only SMS inbox store
pub trait SmsProvider: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Query inbox rows, newest first
    ///
    /// `limit` is a hint; readers stop pulling rows once they have enough.
    fn query_inbox(&self, limit: usize) -> Result<Box<dyn RowCursor<RawSmsRow>>>;
}
