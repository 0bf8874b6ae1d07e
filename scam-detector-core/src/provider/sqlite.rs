//! SQLite providers
//!
//! Read-only access to databases laid out like the Android telephony
//! providers. Each query opens its own connection, fetches at most `limit`
//! rows and closes the connection before the cursor is returned.
//!
//! ## Database Schema
//!
//! ```sql
//! CREATE TABLE calls (
//!     _id INTEGER PRIMARY KEY,
//!     number TEXT,
//!     name TEXT,
//!     date INTEGER,
//!     duration INTEGER,
//!     type INTEGER
//! );
//!
//! CREATE TABLE sms (
//!     _id INTEGER PRIMARY KEY,
//!     address TEXT,
//!     body TEXT,
//!     date INTEGER,
//!     type INTEGER
//! );
//! ```
//!
//! Columns may be missing from a real export; a missing column reads as NULL.
//! Only `sms` rows with `type = 1` (inbox) are returned.

use super::{CallLogProvider, RawCallRow, RawSmsRow, RowCursor, SmsProvider, VecCursor};
use crate::{ReaderError, Result};
use rusqlite::{params, Connection, OpenFlags};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Schema of the call-history table
pub const CALLS_SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS calls (
        _id INTEGER PRIMARY KEY,
        number TEXT,
        name TEXT,
        date INTEGER,
        duration INTEGER,
        type INTEGER
    );
    CREATE INDEX IF NOT EXISTS idx_calls_date ON calls(date DESC);
"#;

/// Schema of the SMS table
pub const SMS_SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS sms (
        _id INTEGER PRIMARY KEY,
        address TEXT,
        body TEXT,
        date INTEGER,
        type INTEGER
    );
    CREATE INDEX IF NOT EXISTS idx_sms_date ON sms(date DESC);
"#;

/// `sms.type` value for received messages
pub const MESSAGE_TYPE_INBOX: i64 = 1;

const CALL_COLUMNS: &[&str] = &["number", "name", "date", "duration", "type"];
const SMS_COLUMNS: &[&str] = &["address", "body", "date"];

/// Open a store read-only, classifying failures
fn open_read_only(path: &Path, store: &str) -> Result<Connection> {
    // Probe the file first so a missing file and a denied file are reported
    // differently; SQLite folds both into SQLITE_CANTOPEN.
    std::fs::File::open(path)
        .map_err(|e| ReaderError::from_io_error(e, &format!("opening {}", store)))?;

    Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| ReaderError::from_sqlite_error(e, &format!("opening {}", store)))
}

/// Build a projection that substitutes NULL for columns the table lacks
fn projection(conn: &Connection, table: &str, columns: &[&str]) -> Result<String> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({})", table))
        .map_err(|e| ReaderError::from_sqlite_error(e, "reading table info"))?;

    let present = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .and_then(|rows| rows.collect::<std::result::Result<Vec<_>, _>>())
        .map_err(|e| ReaderError::from_sqlite_error(e, "reading table info"))?;

    if present.is_empty() {
        return Err(ReaderError::Read(format!("table '{}' does not exist", table)));
    }

    Ok(columns
        .iter()
        .map(|column| {
            if present.iter().any(|p| p == column) {
                (*column).to_string()
            } else {
                format!("NULL AS {}", column)
            }
        })
        .collect::<Vec<_>>()
        .join(", "))
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

/// Call history stored in a SQLite file
#[derive(Debug, Clone)]
pub struct SqliteCallLog {
    path: PathBuf,
}

impl SqliteCallLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn fetch(&self, limit: usize) -> Result<Vec<RawCallRow>> {
        let conn = open_read_only(&self.path, "call log")?;
        let columns = projection(&conn, "calls", CALL_COLUMNS)?;

        let sql = format!(
            "SELECT {} FROM calls ORDER BY date DESC LIMIT ?1",
            columns
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| ReaderError::from_sqlite_error(e, "querying calls"))?;

        let rows = stmt
            .query_map(params![sql_limit(limit)], |row| {
                Ok(RawCallRow {
                    number: row.get(0)?,
                    cached_name: row.get(1)?,
                    date: row.get(2)?,
                    duration: row.get(3)?,
                    call_type: row.get(4)?,
                })
            })
            .and_then(|rows| rows.collect::<std::result::Result<Vec<_>, _>>())
            .map_err(|e| ReaderError::from_sqlite_error(e, "reading calls"))?;

        debug!("Fetched {} call rows from {}", rows.len(), self.path.display());
        Ok(rows)
    }
}

impl CallLogProvider for SqliteCallLog {
    fn name(&self) -> &str {
        "sqlite-call-log"
    }

    fn query_calls(&self, limit: usize) -> Result<Box<dyn RowCursor<RawCallRow>>> {
        Ok(Box::new(VecCursor::new(self.fetch(limit)?)))
    }
}

/// SMS inbox stored in a SQLite file
#[derive(Debug, Clone)]
pub struct SqliteSmsInbox {
    path: PathBuf,
}

impl SqliteSmsInbox {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn fetch(&self, limit: usize) -> Result<Vec<RawSmsRow>> {
        let conn = open_read_only(&self.path, "sms inbox")?;
        let columns = projection(&conn, "sms", SMS_COLUMNS)?;

        let sql = format!(
            "SELECT {} FROM sms WHERE type = ?1 ORDER BY date DESC LIMIT ?2",
            columns
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| ReaderError::from_sqlite_error(e, "querying sms"))?;

        let rows = stmt
            .query_map(params![MESSAGE_TYPE_INBOX, sql_limit(limit)], |row| {
                Ok(RawSmsRow {
                    address: row.get(0)?,
                    body: row.get(1)?,
                    date: row.get(2)?,
                })
            })
            .and_then(|rows| rows.collect::<std::result::Result<Vec<_>, _>>())
            .map_err(|e| ReaderError::from_sqlite_error(e, "reading sms"))?;

        debug!("Fetched {} sms rows from {}", rows.len(), self.path.display());
        Ok(rows)
    }
}

impl SmsProvider for SqliteSmsInbox {
    fn name(&self) -> &str {
        "sqlite-sms-inbox"
    }

    fn query_inbox(&self, limit: usize) -> Result<Box<dyn RowCursor<RawSmsRow>>> {
        Ok(Box::new(VecCursor::new(self.fetch(limit)?)))
    }
}
