//! Record Enumerators
//!
//! [`CallLogReader`] and [`SmsReader`] pull rows from a provider, apply the
//! column fallbacks and return at most `limit` records, newest first.
//!
//! A read is single-shot: it either returns every record it collected or an
//! error, never a partial list. The provider cursor is dropped before the
//! read returns, on success and on failure alike.

use crate::classifier::SuspicionClassifier;
use crate::provider::{CallLogProvider, RawCallRow, RawSmsRow, SmsProvider};
use crate::records::{CallRecord, CallType, MessageRecord, UNKNOWN_SENDER};
use crate::{ReaderError, Result};
use std::sync::Arc;
use tracing::{debug, info};

/// Limit applied when the caller does not pass one
pub const DEFAULT_LIMIT: usize = 50;

/// Enumerates call history, annotating each call with the classifier verdict
#[derive(Clone)]
pub struct CallLogReader {
    provider: Option<Arc<dyn CallLogProvider>>,
    classifier: Arc<SuspicionClassifier>,
}

impl CallLogReader {
    pub fn new(
        provider: Option<Arc<dyn CallLogProvider>>,
        classifier: Arc<SuspicionClassifier>,
    ) -> Self {
        Self {
            provider,
            classifier,
        }
    }

    /// Whether a store handle is attached
    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Read up to `limit` call records, newest first
    ///
    /// # Errors
    ///
    /// - `ContextUnavailable` when no store is attached
    /// - `PermissionDenied` when the store refuses access
    /// - any other variant for a failed enumeration
    pub fn read(&self, limit: usize) -> Result<Vec<CallRecord>> {
        let provider = self
            .provider
            .as_ref()
            .ok_or_else(|| ReaderError::ContextUnavailable("call log store".to_string()))?;

        if limit == 0 {
            return Ok(Vec::new());
        }

        debug!("Reading up to {} calls from {}", limit, provider.name());

        let mut cursor = provider.query_calls(limit)?;
        let mut records = Vec::with_capacity(limit.min(DEFAULT_LIMIT));

        while records.len() < limit {
            match cursor.next_row()? {
                Some(row) => records.push(self.to_record(row)),
                None => break,
            }
        }

        let suspected = records.iter().filter(|r| r.is_scam_suspected).count();
        info!(
            "Read {} calls from {} ({} suspected)",
            records.len(),
            provider.name(),
            suspected
        );

        Ok(records)
    }

    fn to_record(&self, row: RawCallRow) -> CallRecord {
        let phone_number = row.number.unwrap_or_default();
        let is_scam_suspected = self.classifier.is_suspicious(&phone_number);

        CallRecord {
            caller_name: row.cached_name.unwrap_or_default(),
            call_date: row.date.unwrap_or(0),
            duration: row.duration.unwrap_or(0),
            call_type: row.call_type.map(CallType::from_code).unwrap_or_default(),
            is_scam_suspected,
            phone_number,
        }
    }
}

/// Enumerates the SMS inbox
///
/// Messages carry a verdict only when annotation is switched on; by default
/// the records keep the sender/body/timestamp shape.
#[derive(Clone)]
pub struct SmsReader {
    provider: Option<Arc<dyn SmsProvider>>,
    classifier: Arc<SuspicionClassifier>,
    annotate: bool,
}

impl SmsReader {
    pub fn new(provider: Option<Arc<dyn SmsProvider>>, classifier: Arc<SuspicionClassifier>) -> Self {
        Self {
            provider,
            classifier,
            annotate: false,
        }
    }

    /// Attach the classifier verdict to every message
    pub fn with_annotation(mut self, annotate: bool) -> Self {
        self.annotate = annotate;
        self
    }

    /// Read up to `limit` inbox messages, newest first
    pub fn read(&self, limit: usize) -> Result<Vec<MessageRecord>> {
        let provider = self
            .provider
            .as_ref()
            .ok_or_else(|| ReaderError::ContextUnavailable("sms store".to_string()))?;

        if limit == 0 {
            return Ok(Vec::new());
        }

        debug!("Reading up to {} messages from {}", limit, provider.name());

        let mut cursor = provider.query_inbox(limit)?;
        let mut records = Vec::with_capacity(limit.min(DEFAULT_LIMIT));

        while records.len() < limit {
            match cursor.next_row()? {
                Some(row) => records.push(self.to_record(row)),
                None => break,
            }
        }

        info!("Read {} messages from {}", records.len(), provider.name());
        Ok(records)
    }

    fn to_record(&self, row: RawSmsRow) -> MessageRecord {
        let sender = row.address.unwrap_or_else(|| UNKNOWN_SENDER.to_string());
        let is_scam_suspected = self
            .annotate
            .then(|| self.classifier.is_suspicious(&sender));

        MessageRecord {
            body: row.body.unwrap_or_default(),
            timestamp: row.date.unwrap_or(0),
            is_scam_suspected,
            sender,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::InMemoryStore;

    fn classifier() -> Arc<SuspicionClassifier> {
        Arc::new(SuspicionClassifier::default())
    }

    fn call(number: Option<&str>, date: Option<i64>, call_type: Option<i64>) -> RawCallRow {
        RawCallRow {
            number: number.map(String::from),
            cached_name: None,
            date,
            duration: None,
            call_type,
        }
    }

    fn sms(address: Option<&str>, body: Option<&str>, date: i64) -> RawSmsRow {
        RawSmsRow {
            address: address.map(String::from),
            body: body.map(String::from),
            date: Some(date),
        }
    }

    fn call_store(rows: Vec<RawCallRow>) -> Arc<dyn CallLogProvider> {
        Arc::new(InMemoryStore::new("calls", rows))
    }

    fn sms_store(rows: Vec<RawSmsRow>) -> Arc<dyn SmsProvider> {
        Arc::new(InMemoryStore::new("sms", rows))
    }

    #[test]
    fn test_call_defaults_applied() {
        let reader = CallLogReader::new(Some(call_store(vec![call(None, None, None)])), classifier());
        let records = reader.read(DEFAULT_LIMIT).unwrap();

        assert_eq!(
            records,
            vec![CallRecord {
                phone_number: String::new(),
                caller_name: String::new(),
                call_date: 0,
                duration: 0,
                call_type: CallType::Incoming,
                is_scam_suspected: false,
            }]
        );
    }

    #[test]
    fn test_calls_annotated_and_ordered() {
        let store = call_store(vec![
            call(Some("0722123456"), Some(100), Some(2)),
            call(Some("PRIVATE"), Some(300), Some(3)),
            call(Some("1111111111"), Some(200), Some(9)),
        ]);
        let reader = CallLogReader::new(Some(store), classifier());
        let records = reader.read(10).unwrap();

        let dates: Vec<i64> = records.iter().map(|r| r.call_date).collect();
        assert_eq!(dates, vec![300, 200, 100]);
        assert!(records[0].is_scam_suspected);
        assert_eq!(records[0].call_type, CallType::Missed);
        assert!(records[1].is_scam_suspected);
        assert_eq!(records[1].call_type, CallType::Incoming);
        assert!(!records[2].is_scam_suspected);
        assert_eq!(records[2].call_type, CallType::Outgoing);
    }

    #[test]
    fn test_limit_respected() {
        let rows = (0..20)
            .map(|i| call(Some("0722123456"), Some(i), Some(1)))
            .collect();
        let reader = CallLogReader::new(Some(call_store(rows)), classifier());

        assert_eq!(reader.read(5).unwrap().len(), 5);
        assert!(reader.read(0).unwrap().is_empty());
        assert_eq!(reader.read(100).unwrap().len(), 20);
    }

    #[test]
    fn test_missing_provider_is_context_error() {
        let reader = CallLogReader::new(None, classifier());
        assert!(!reader.has_provider());
        assert!(matches!(
            reader.read(1),
            Err(ReaderError::ContextUnavailable(_))
        ));
    }

    #[test]
    fn test_failure_returns_no_partial_results() {
        let store = Arc::new(
            InMemoryStore::new(
                "calls",
                vec![
                    call(Some("1"), Some(3), None),
                    call(Some("2"), Some(2), None),
                    call(Some("3"), Some(1), None),
                ],
            )
            .with_failure_after(2),
        );
        let provider: Arc<dyn CallLogProvider> = store.clone();
        let reader = CallLogReader::new(Some(provider), classifier());

        assert!(matches!(reader.read(10), Err(ReaderError::Read(_))));
        assert_eq!(store.open_cursors(), 0);

        // Stopping at the limit never reaches the failing row
        assert_eq!(reader.read(2).unwrap().len(), 2);
        assert_eq!(store.open_cursors(), 0);
    }

    #[test]
    fn test_sms_defaults_and_order() {
        let store = sms_store(vec![sms(None, None, 1), sms(Some("BANK"), Some("OTP 1234"), 5)]);
        let reader = SmsReader::new(Some(store), classifier());
        let records = reader.read(DEFAULT_LIMIT).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].sender, "BANK");
        assert_eq!(records[1].sender, UNKNOWN_SENDER);
        assert_eq!(records[1].body, "");
        assert!(records.iter().all(|r| r.is_scam_suspected.is_none()));
    }

    #[test]
    fn test_sms_annotation_opt_in() {
        let store = sms_store(vec![
            sms(None, Some("hi"), 2),
            sms(Some("+254711000222"), Some("hello"), 1),
        ]);
        let reader = SmsReader::new(Some(store), classifier()).with_annotation(true);
        let records = reader.read(10).unwrap();

        // The "Unknown" placeholder itself is denylisted
        assert_eq!(records[0].is_scam_suspected, Some(true));
        assert_eq!(records[1].is_scam_suspected, Some(false));
    }

    #[test]
    fn test_sms_revoked_access() {
        let store = Arc::new(InMemoryStore::new("sms", vec![sms(None, None, 1)]));
        store.set_access_granted(false);
        let provider: Arc<dyn SmsProvider> = store;
        let reader = SmsReader::new(Some(provider), classifier());

        assert!(matches!(
            reader.read(1),
            Err(ReaderError::PermissionDenied(_))
        ));
    }
}
