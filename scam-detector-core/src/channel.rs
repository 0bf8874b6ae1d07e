//! Method Channel
//!
//! This module implements the request/response boundary between a host and
//! the reader plugins. A host sends a [`MethodCall`] on a named channel; the
//! owning plugin parses it into a typed request and answers with a
//! [`MethodResult`].
//!
//! ## Call Structure
//!
//! Each call contains:
//! - `method`: operation name, e.g. `readCallLogs`
//! - `arguments`: JSON dictionary of named arguments (may be empty)
//!
//! ## Result Structure
//!
//! A result is exactly one of:
//! - `success` with a JSON payload
//! - `error` with a short `code`, a human-readable `message` and optional `details`
//! - `notImplemented` when the method is unknown
//!
//! ## Typed Requests
//!
//! Plugins never match on method strings outside this module. The string
//! name is turned into a request enum once, in [`CallLogRequest::parse`] and
//! [`SmsRequest::parse`].

use crate::reader::DEFAULT_LIMIT;
use crate::{ReaderError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Channel served by the call log plugin
pub const CALL_LOG_CHANNEL: &str = "com.example.scam_detector_app/call_log_reader";

/// Channel served by the SMS plugin
pub const SMS_CHANNEL: &str = "com.example.scam_detector_app/sms_reader";

pub const METHOD_READ_CALL_LOGS: &str = "readCallLogs";
pub const METHOD_IS_CALL_LOG_SUPPORTED: &str = "isCallLogSupported";
pub const METHOD_READ_SMS: &str = "readSms";
pub const METHOD_IS_SMS_SUPPORTED: &str = "isSmsSupported";

/// Store handle unavailable
pub const CODE_CONTEXT_ERROR: &str = "CONTEXT_ERROR";
/// Runtime authorization missing
pub const CODE_PERMISSION_DENIED: &str = "PERMISSION_DENIED";
/// Any other call log failure
pub const CODE_READ_ERROR: &str = "READ_ERROR";
/// Any SMS failure
pub const CODE_SMS_READ_ERROR: &str = "SMS_READ_ERROR";
/// Malformed argument
pub const CODE_INVALID_ARGUMENT: &str = "INVALID_ARGUMENT";

/// Invocation of a named method with named arguments
///
/// # Examples
///
/// ```
/// use scam_detector_core::channel::MethodCall;
/// use serde_json::json;
///
/// let call = MethodCall::new("readCallLogs", json!({ "limit": 20 }));
/// assert_eq!(call.argument_i64("limit").unwrap(), Some(20));
///
/// let call = MethodCall::without_arguments("isSmsSupported");
/// assert_eq!(call.argument_i64("limit").unwrap(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,

    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl MethodCall {
    /// Create a call; any non-object `arguments` value is treated as no arguments
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        let arguments = match arguments {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        Self {
            method: method.into(),
            arguments,
        }
    }

    pub fn without_arguments(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            arguments: Map::new(),
        }
    }

    /// Integer argument; `Ok(None)` when absent or null
    ///
    /// # Errors
    ///
    /// Returns `ReaderError::InvalidArgument` if the value is not an integer.
    pub fn argument_i64(&self, name: &str) -> Result<Option<i64>> {
        match self.arguments.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value.as_i64().map(Some).ok_or_else(|| {
                ReaderError::InvalidArgument(format!("'{}' must be an integer, got {}", name, value))
            }),
        }
    }

    /// `limit` argument, defaulting to [`DEFAULT_LIMIT`]
    ///
    /// # Errors
    ///
    /// Returns `ReaderError::InvalidArgument` for non-integers and negative values.
    pub fn limit(&self) -> Result<usize> {
        match self.argument_i64("limit")? {
            None => Ok(DEFAULT_LIMIT),
            Some(limit) => usize::try_from(limit).map_err(|_| {
                ReaderError::InvalidArgument(format!("'limit' must be non-negative, got {}", limit))
            }),
        }
    }

    /// Parse a call from its JSON form
    pub fn from_json(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }
}

/// Outcome of a method call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum MethodResult {
    Success {
        payload: Value,
    },
    Error {
        code: String,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<String>,
    },
    NotImplemented,
}

impl MethodResult {
    pub fn success(payload: impl Into<Value>) -> Self {
        Self::Success {
            payload: payload.into(),
        }
    }

    pub fn error(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Option<String>,
    ) -> Self {
        Self::Error {
            code: code.into(),
            message: message.into(),
            details,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Error code, if this is an error
    pub fn error_code(&self) -> Option<&str> {
        match self {
            Self::Error { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Success payload, if this is a success
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Success { payload } => Some(payload),
            _ => None,
        }
    }
}

/// Requests understood by the call log plugin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallLogRequest {
    ReadCallLogs { limit: usize },
    IsSupported,
}

impl CallLogRequest {
    /// Parse a call; `Ok(None)` for unknown methods
    pub fn parse(call: &MethodCall) -> Result<Option<Self>> {
        match call.method.as_str() {
            METHOD_READ_CALL_LOGS => Ok(Some(Self::ReadCallLogs {
                limit: call.limit()?,
            })),
            METHOD_IS_CALL_LOG_SUPPORTED => Ok(Some(Self::IsSupported)),
            _ => Ok(None),
        }
    }
}

/// Requests understood by the SMS plugin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmsRequest {
    ReadSms { limit: usize },
    IsSupported,
}

impl SmsRequest {
    /// Parse a call; `Ok(None)` for unknown methods
    pub fn parse(call: &MethodCall) -> Result<Option<Self>> {
        match call.method.as_str() {
            METHOD_READ_SMS => Ok(Some(Self::ReadSms {
                limit: call.limit()?,
            })),
            METHOD_IS_SMS_SUPPORTED => Ok(Some(Self::IsSupported)),
            _ => Ok(None),
        }
    }
}
