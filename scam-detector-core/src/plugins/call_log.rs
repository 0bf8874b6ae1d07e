//! Call Log Reader Plugin
//!
//! Serves the call history to the calling layer, each call annotated with
//! the suspicion verdict.
//!
//! ## Protocol
//!
//! **Channel**: `com.example.scam_detector_app/call_log_reader`
//!
//! **Methods**:
//! - `readCallLogs` - arguments `{ "limit": int }` (default 50); succeeds with
//!   a JSON-encoded **string** holding an array of call records
//! - `isCallLogSupported` - no arguments; succeeds with `true`
//!
//! ## Call Records
//!
//! Each element of the encoded array contains:
//! - `phoneNumber`: remote number, `""` when unknown
//! - `callerName`: cached contact name, `""` when unknown
//! - `callDate`: milliseconds since epoch
//! - `duration`: seconds
//! - `callType`: one of "incoming", "outgoing", "missed"
//! - `isScamSuspected`: classifier verdict for `phoneNumber`
//!
//! ## Error Codes
//!
//! - `CONTEXT_ERROR` - no call log store attached
//! - `PERMISSION_DENIED` - the store refused access
//! - `READ_ERROR` - any other failure
//! - `INVALID_ARGUMENT` - `limit` is not a non-negative integer

use crate::channel::{
    CallLogRequest, MethodCall, MethodResult, CALL_LOG_CHANNEL, CODE_CONTEXT_ERROR,
    CODE_INVALID_ARGUMENT, CODE_PERMISSION_DENIED, CODE_READ_ERROR, METHOD_IS_CALL_LOG_SUPPORTED,
    METHOD_READ_CALL_LOGS,
};
use crate::reader::CallLogReader;
use crate::{ReaderError, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::{Plugin, PluginContext};

const CONTEXT_ERROR_MESSAGE: &str = "Application context is not available";
const PERMISSION_DENIED_MESSAGE: &str =
    "Call log permission not granted. Please enable call log permissions in app settings.";

/// Call log reader plugin
pub struct CallLogReaderPlugin {
    reader: Option<CallLogReader>,
}

impl CallLogReaderPlugin {
    /// Create a detached plugin
    pub fn new() -> Self {
        Self { reader: None }
    }

    /// Read call logs and encode them as a JSON string
    fn read_call_logs(&self, limit: usize) -> MethodResult {
        let reader = match self.reader.as_ref().filter(|r| r.has_provider()) {
            Some(reader) => reader,
            None => {
                warn!("readCallLogs called without a call log store");
                return MethodResult::error(CODE_CONTEXT_ERROR, CONTEXT_ERROR_MESSAGE, None);
            }
        };

        let encoded = reader
            .read(limit)
            .and_then(|records| Ok(serde_json::to_string(&records)?));

        match encoded {
            Ok(json) => MethodResult::success(Value::String(json)),
            Err(e) => {
                if e.requires_user_action() {
                    warn!("Call log read needs user action: {}", e);
                } else {
                    error!("Failed to read call logs: {}", e);
                }
                error_result(e)
            }
        }
    }
}

/// Map a reader error onto the call log channel's error codes
fn error_result(error: ReaderError) -> MethodResult {
    match error {
        ReaderError::ContextUnavailable(_) => {
            MethodResult::error(CODE_CONTEXT_ERROR, CONTEXT_ERROR_MESSAGE, None)
        }
        ReaderError::PermissionDenied(msg) => {
            MethodResult::error(CODE_PERMISSION_DENIED, PERMISSION_DENIED_MESSAGE, Some(msg))
        }
        e => MethodResult::error(
            CODE_READ_ERROR,
            format!("Failed to read call logs: {}", e),
            Some(format!("{:?}", e)),
        ),
    }
}

impl Default for CallLogReaderPlugin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Plugin for CallLogReaderPlugin {
    fn name(&self) -> &str {
        "call_log"
    }

    fn channel(&self) -> &str {
        CALL_LOG_CHANNEL
    }

    fn methods(&self) -> Vec<String> {
        vec![
            METHOD_READ_CALL_LOGS.to_string(),
            METHOD_IS_CALL_LOG_SUPPORTED.to_string(),
        ]
    }

    async fn attach(&mut self, context: &PluginContext) -> Result<()> {
        self.reader = Some(CallLogReader::new(
            context.call_log.clone(),
            context.classifier.clone(),
        ));
        info!(
            "Call log plugin attached ({})",
            context
                .call_log
                .as_ref()
                .map(|p| p.name())
                .unwrap_or("no store")
        );
        Ok(())
    }

    async fn detach(&mut self) -> Result<()> {
        self.reader = None;
        info!("Call log plugin detached");
        Ok(())
    }

    async fn handle_call(&self, call: &MethodCall) -> MethodResult {
        let request = match CallLogRequest::parse(call) {
            Ok(Some(request)) => request,
            Ok(None) => {
                warn!("Unknown call log method: {}", call.method);
                return MethodResult::NotImplemented;
            }
            Err(e) => {
                return MethodResult::error(CODE_INVALID_ARGUMENT, e.to_string(), None);
            }
        };

        debug!("Call log request: {:?}", request);

        match request {
            CallLogRequest::ReadCallLogs { limit } => self.read_call_logs(limit),
            CallLogRequest::IsSupported => MethodResult::success(true),
        }
    }

    fn is_attached(&self) -> bool {
        self.reader.is_some()
    }
}
