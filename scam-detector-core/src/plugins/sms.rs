//! SMS Reader Plugin
//!
//! Serves inbox messages to the calling layer.
//!
//! ## Protocol
//!
//! **Channel**: `com.example.scam_detector_app/sms_reader`
//!
//! **Methods**:
//! - `readSms` - arguments `{ "limit": int }` (default 50); succeeds with an
//!   array of message records
//! - `isSmsSupported` - no arguments; succeeds with `true`
//!
//! ## Message Records
//!
//! - `sender`: sender address, "Unknown" when absent
//! - `body`: message text, `""` when absent
//! - `timestamp`: milliseconds since epoch
//! - `isScamSuspected`: only when SMS annotation is enabled in the context
//!
//! Every failure, whatever its cause, is reported as `SMS_READ_ERROR`;
//! only a malformed `limit` gets its own `INVALID_ARGUMENT` code.

use crate::channel::{
    MethodCall, MethodResult, SmsRequest, CODE_INVALID_ARGUMENT, CODE_SMS_READ_ERROR,
    METHOD_IS_SMS_SUPPORTED, METHOD_READ_SMS, SMS_CHANNEL,
};
use crate::reader::SmsReader;
use crate::{ReaderError, Result};
use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use super::{Plugin, PluginContext};

/// SMS reader plugin
pub struct SmsReaderPlugin {
    reader: Option<SmsReader>,
}

impl SmsReaderPlugin {
    /// Create a detached plugin
    pub fn new() -> Self {
        Self { reader: None }
    }

    fn read_sms(&self, limit: usize) -> MethodResult {
        let result = self
            .reader
            .as_ref()
            .ok_or_else(|| ReaderError::ContextUnavailable("sms plugin is not attached".to_string()))
            .and_then(|reader| reader.read(limit))
            .and_then(|records| Ok(serde_json::to_value(records)?));

        match result {
            Ok(payload) => MethodResult::success(payload),
            Err(e) => {
                if e.requires_user_action() {
                    warn!("SMS read needs user action: {}", e);
                } else {
                    error!("Error reading SMS: {}", e);
                }
                MethodResult::error(CODE_SMS_READ_ERROR, format!("Failed to read SMS: {}", e), None)
            }
        }
    }
}

impl Default for SmsReaderPlugin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Plugin for SmsReaderPlugin {
    fn name(&self) -> &str {
        "sms"
    }

    fn channel(&self) -> &str {
        SMS_CHANNEL
    }

    fn methods(&self) -> Vec<String> {
        vec![
            METHOD_READ_SMS.to_string(),
            METHOD_IS_SMS_SUPPORTED.to_string(),
        ]
    }

    async fn attach(&mut self, context: &PluginContext) -> Result<()> {
        let reader = SmsReader::new(context.sms_inbox.clone(), context.classifier.clone())
            .with_annotation(context.annotate_sms);
        self.reader = Some(reader);

        info!(
            "SMS plugin attached ({}, annotation {})",
            context
                .sms_inbox
                .as_ref()
                .map(|p| p.name())
                .unwrap_or("no store"),
            if context.annotate_sms { "on" } else { "off" }
        );
        Ok(())
    }

    async fn detach(&mut self) -> Result<()> {
        self.reader = None;
        info!("SMS plugin detached");
        Ok(())
    }

    async fn handle_call(&self, call: &MethodCall) -> MethodResult {
        let request = match SmsRequest::parse(call) {
            Ok(Some(request)) => request,
            Ok(None) => {
                warn!("Unknown SMS method: {}", call.method);
                return MethodResult::NotImplemented;
            }
            Err(e) => {
                return MethodResult::error(CODE_INVALID_ARGUMENT, e.to_string(), None);
            }
        };

        debug!("SMS request: {:?}", request);

        match request {
            SmsRequest::ReadSms { limit } => self.read_sms(limit),
            SmsRequest::IsSupported => MethodResult::success(true),
        }
    }

    fn is_attached(&self) -> bool {
        self.reader.is_some()
    }
}
