//! Error handling for the call log and SMS readers
//!
//! This module provides the error type shared by every reader operation.
//! Errors are automatically converted from underlying library errors using `thiserror`.
//!
//! ## Error Handling Patterns
//!
//! ### Basic Usage
//!
//! ```rust
//! use scam_detector_core::Result;
//!
//! fn parse_arguments(data: &str) -> Result<serde_json::Value> {
//!     // Errors are automatically converted using From trait
//!     let value: serde_json::Value = serde_json::from_str(data)?;
//!     Ok(value)
//! }
//! ```
//!
//! ### Error Matching
//!
//! Readers report one of three failure kinds. Match on them to decide what to
//! tell the user:
//!
//! ```rust
//! use scam_detector_core::ReaderError;
//!
//! fn describe(error: &ReaderError) -> &'static str {
//!     match error {
//!         ReaderError::ContextUnavailable(_) => "store not attached",
//!         ReaderError::PermissionDenied(_) => "ask the user for permission",
//!         _ => "read failed, try again",
//!     }
//! }
//!
//! let error = ReaderError::PermissionDenied("READ_CALL_LOG".to_string());
//! assert_eq!(describe(&error), "ask the user for permission");
//! ```
//!
//! ## Error Categories
//!
//! ### Store Access Errors
//! - `ContextUnavailable`: the handle to the backing store could not be obtained
//! - `PermissionDenied`: the caller lacks authorization to read the store
//! - `Read`: any other enumeration fault (malformed row, provider failure)
//!
//! ### Library Errors
//! I/O and JSON failures, converted automatically. SQLite failures always go
//! through [`ReaderError::from_sqlite_error`] so that authorization failures
//! surface as `PermissionDenied`.
//!
//! ### Caller Errors
//! - `InvalidArgument`: a method argument had the wrong shape
//! - `Configuration`: the classifier or reader configuration is unusable
//! - `Plugin`: a plugin could not be registered, attached or detached

use rusqlite::ErrorCode;
use thiserror::Error;

/// Result type for reader operations
pub type Result<T> = std::result::Result<T, ReaderError>;

/// Errors that can occur while reading call logs or SMS messages
///
/// # Examples
///
/// ```rust
/// use scam_detector_core::ReaderError;
///
/// let error = ReaderError::Read("cursor closed".to_string());
/// assert_eq!(error.to_string(), "Read error: cursor closed");
///
/// let error = ReaderError::ContextUnavailable("call log".to_string());
/// assert_eq!(error.to_string(), "Store context unavailable: call log");
/// ```
#[derive(Error, Debug)]
pub enum ReaderError {
    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The handle to the backing store is not available
    #[error("Store context unavailable: {0}")]
    ContextUnavailable(String),

    /// The caller is not authorized to read the store
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Generic enumeration failure
    #[error("Read error: {0}")]
    Read(String),

    /// A method argument was present but malformed
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration could not be applied
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Plugin registration or lifecycle failure
    #[error("Plugin error: {0}")]
    Plugin(String),
}

impl ReaderError {
    /// Classify an I/O error raised while opening or reading a store
    pub fn from_io_error(error: std::io::Error, context: &str) -> Self {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::PermissionDenied => {
                ReaderError::PermissionDenied(format!("{}: {}", context, error))
            }
            ErrorKind::NotFound => {
                ReaderError::ContextUnavailable(format!("{}: {}", context, error))
            }
            _ => ReaderError::Io(error),
        }
    }

    /// Classify a SQLite error raised while opening or querying a store
    ///
    /// Authorization failures become `PermissionDenied`, a store that cannot
    /// be opened becomes `ContextUnavailable`, and everything else is a
    /// generic `Read` failure.
    pub fn from_sqlite_error(error: rusqlite::Error, context: &str) -> Self {
        match error.sqlite_error_code() {
            Some(ErrorCode::PermissionDenied) | Some(ErrorCode::AuthorizationForStatementDenied) => {
                ReaderError::PermissionDenied(format!("{}: {}", context, error))
            }
            Some(ErrorCode::CannotOpen) => {
                ReaderError::ContextUnavailable(format!("{}: {}", context, error))
            }
            _ => ReaderError::Read(format!("{}: {}", context, error)),
        }
    }

    /// Whether the user has to change something before retrying
    pub fn requires_user_action(&self) -> bool {
        matches!(
            self,
            ReaderError::PermissionDenied(_) | ReaderError::Configuration(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = ReaderError::PermissionDenied("READ_CALL_LOG".to_string());
        assert_eq!(error.to_string(), "Permission denied: READ_CALL_LOG");

        let error = ReaderError::InvalidArgument("limit must be an integer".to_string());
        assert_eq!(
            error.to_string(),
            "Invalid argument: limit must be an integer"
        );
    }

    #[test]
    fn test_io_error_classification() {
        use std::io::{Error, ErrorKind};

        let error = ReaderError::from_io_error(
            Error::new(ErrorKind::PermissionDenied, "denied"),
            "opening calls.db",
        );
        assert!(matches!(error, ReaderError::PermissionDenied(_)));
        assert!(error.requires_user_action());

        let error =
            ReaderError::from_io_error(Error::new(ErrorKind::NotFound, "gone"), "opening sms.db");
        assert!(matches!(error, ReaderError::ContextUnavailable(_)));

        let error =
            ReaderError::from_io_error(Error::new(ErrorKind::Other, "boom"), "reading rows");
        assert!(matches!(error, ReaderError::Io(_)));
        assert!(!error.requires_user_action());
    }

    #[test]
    fn test_sqlite_error_classification() {
        let auth = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_AUTH),
            None,
        );
        assert!(matches!(
            ReaderError::from_sqlite_error(auth, "query calls"),
            ReaderError::PermissionDenied(_)
        ));

        let cant_open = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
            None,
        );
        assert!(matches!(
            ReaderError::from_sqlite_error(cant_open, "open calls"),
            ReaderError::ContextUnavailable(_)
        ));

        let error = ReaderError::from_sqlite_error(rusqlite::Error::InvalidQuery, "query sms");
        assert!(!error.requires_user_action());
        assert!(matches!(error, ReaderError::Read(_)));
        assert!(error.to_string().contains("query sms"));
    }

    #[test]
    fn test_configuration_requires_user_action() {
        let error = ReaderError::Configuration("min_digit_count must be at least 1".to_string());
        assert!(error.requires_user_action());
        assert_eq!(
            error.to_string(),
            "Configuration error: min_digit_count must be at least 1"
        );
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>(r#"{"limit"#).unwrap_err();
        let error: ReaderError = json_error.into();

        assert!(matches!(error, ReaderError::Json(_)));
        assert!(!error.requires_user_action());
    }
}
