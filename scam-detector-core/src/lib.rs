//! Scam Detector Readers
//!
//! This library reads call history and SMS inbox records from pluggable
//! stores and flags identifiers that look like scam sources, exposing both
//! readers to a host through typed method channels.

pub mod channel;
pub mod classifier;
pub mod plugins;
pub mod provider;
pub mod reader;
pub mod records;

mod error;

pub use channel::{MethodCall, MethodResult, CALL_LOG_CHANNEL, SMS_CHANNEL};
pub use classifier::{normalize, ClassifierConfig, SuspicionClassifier, SuspicionReason};
pub use error::{ReaderError, Result};
pub use plugins::{CallLogReaderPlugin, Plugin, PluginContext, PluginManager, SmsReaderPlugin};
pub use provider::{
    CallLogProvider, InMemoryStore, RawCallRow, RawSmsRow, SmsProvider, SqliteCallLog,
    SqliteSmsInbox,
};
pub use reader::{CallLogReader, SmsReader, DEFAULT_LIMIT};
pub use records::{CallRecord, CallType, MessageRecord, UNKNOWN_SENDER};
