//! Call and message records
//!
//! Records are read-only snapshots built from provider rows. The JSON field
//! names are the ones the calling layer consumes (`phoneNumber`, `callDate`,
//! `isScamSuspected`, ...).

use serde::{Deserialize, Serialize};

/// Sender placeholder for messages without an address
pub const UNKNOWN_SENDER: &str = "Unknown";

/// Provider code for an incoming call
pub const CALL_TYPE_INCOMING: i64 = 1;

/// Provider code for an outgoing call
pub const CALL_TYPE_OUTGOING: i64 = 2;

/// Provider code for a missed call
pub const CALL_TYPE_MISSED: i64 = 3;

/// Call direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallType {
    #[default]
    Incoming,
    Outgoing,
    Missed,
}

impl CallType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Incoming => "incoming",
            Self::Outgoing => "outgoing",
            Self::Missed => "missed",
        }
    }

    /// Map a provider type code; unknown codes fall back to `Incoming`
    pub fn from_code(code: i64) -> Self {
        match code {
            CALL_TYPE_INCOMING => Self::Incoming,
            CALL_TYPE_OUTGOING => Self::Outgoing,
            CALL_TYPE_MISSED => Self::Missed,
            _ => Self::Incoming,
        }
    }
}

/// Single call-history entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRecord {
    /// Remote number, empty when the provider has none
    pub phone_number: String,

    /// Cached contact name, empty when unknown
    pub caller_name: String,

    /// Call start (milliseconds since epoch)
    pub call_date: i64,

    /// Call duration in seconds
    pub duration: i64,

    pub call_type: CallType,

    /// Derived from the classifier, never persisted
    pub is_scam_suspected: bool,
}

/// Single inbox SMS entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    /// Sender address, [`UNKNOWN_SENDER`] when absent
    pub sender: String,

    pub body: String,

    /// Receive time (milliseconds since epoch)
    pub timestamp: i64,

    /// Only present when SMS annotation is enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_scam_suspected: Option<bool>,
}
