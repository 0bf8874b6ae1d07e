//! Suspicion Classifier
//!
//! Maps a raw identifier (phone number or SMS sender) to a scam-likelihood
//! verdict. The rule set is ordered and the first matching rule wins:
//!
//! 1. **Denylist** - the normalized identifier equals a configured entry
//! 2. **Banned substring** - it contains `private` or `restricted`, or is exactly `unknown`
//! 3. **Low-entropy digits** - its digits number at least `min_digit_count`
//!    and use at most `max_distinct_digits` distinct values
//!
//! Anything else is not suspicious. Classification is pure and total: every
//! string, including the empty one, gets a definite verdict.
//!
//! ## Example
//!
//! ```rust
//! use scam_detector_core::classifier::{SuspicionClassifier, SuspicionReason};
//!
//! let classifier = SuspicionClassifier::default();
//!
//! assert!(classifier.is_suspicious("  Private Caller "));
//! assert!(!classifier.is_suspicious("+1 (415) 555-0132"));
//! assert_eq!(
//!     classifier.evaluate("1212121212"),
//!     Some(SuspicionReason::LowEntropyDigits)
//! );
//! ```

use crate::{ReaderError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// Identifiers treated as automatically suspicious
pub const DEFAULT_DENYLIST: &[&str] = &[
    "0700000000",
    "0711111111",
    "0755555555",
    "0800000000",
    "unknown",
    "private",
    "restricted",
    "telemarketing",
    "suspicious",
];

/// Substrings that flag an identifier wherever they appear
const BANNED_SUBSTRINGS: &[&str] = &["private", "restricted"];

/// Identifier flagged only on exact match, independent of the denylist
const UNKNOWN_IDENTIFIER: &str = "unknown";

/// Lowercase and trim an identifier
///
/// Total: any string, including the empty one, normalizes without error.
pub fn normalize(identifier: &str) -> String {
    identifier.trim().to_lowercase()
}

/// Rule that flagged an identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SuspicionReason {
    /// Exact match against the denylist
    Denylisted,
    /// Contains a banned substring or is exactly "unknown"
    BannedSubstring,
    /// Long digit run drawn from very few distinct digits
    LowEntropyDigits,
}

impl SuspicionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Denylisted => "denylisted",
            Self::BannedSubstring => "bannedSubstring",
            Self::LowEntropyDigits => "lowEntropyDigits",
        }
    }
}

/// Classifier configuration
///
/// The denylist is an ordered list so that configuration files keep the
/// order they were written in; duplicates are harmless.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Known-bad identifiers, compared after normalization
    #[serde(default = "default_denylist")]
    pub denylist: Vec<String>,

    /// Minimum number of digits before the low-entropy rule applies
    #[serde(default = "default_min_digit_count")]
    pub min_digit_count: usize,

    /// Maximum distinct digits for a digit run to count as low-entropy
    #[serde(default = "default_max_distinct_digits")]
    pub max_distinct_digits: usize,
}

fn default_denylist() -> Vec<String> {
    DEFAULT_DENYLIST.iter().map(|s| s.to_string()).collect()
}

fn default_min_digit_count() -> usize {
    10
}

fn default_max_distinct_digits() -> usize {
    2
}

impl ClassifierConfig {
    /// Check the digit thresholds
    ///
    /// `min_digit_count` must be at least 1, otherwise every identifier
    /// without digits (including `""`) would be flagged. `max_distinct_digits`
    /// must stay below 10, otherwise every long digit run would be flagged.
    ///
    /// # Errors
    ///
    /// Returns `ReaderError::Configuration` naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.min_digit_count == 0 {
            return Err(ReaderError::Configuration(
                "classifier.min_digit_count must be at least 1".to_string(),
            ));
        }

        if self.max_distinct_digits >= 10 {
            return Err(ReaderError::Configuration(format!(
                "classifier.max_distinct_digits must be below 10, got {}",
                self.max_distinct_digits
            )));
        }

        Ok(())
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            denylist: default_denylist(),
            min_digit_count: default_min_digit_count(),
            max_distinct_digits: default_max_distinct_digits(),
        }
    }
}

/// Ordered rule set, evaluated first to last
const RULES: [SuspicionReason; 3] = [
    SuspicionReason::Denylisted,
    SuspicionReason::BannedSubstring,
    SuspicionReason::LowEntropyDigits,
];

/// Scam-likelihood classifier
///
/// Immutable after construction; share it between readers behind an `Arc`.
#[derive(Debug, Clone)]
pub struct SuspicionClassifier {
    denylist: BTreeSet<String>,
    min_digit_count: usize,
    max_distinct_digits: usize,
}

impl SuspicionClassifier {
    /// Build a classifier, normalizing every denylist entry
    ///
    /// # Errors
    ///
    /// Returns `ReaderError::Configuration` if the digit thresholds are out of range.
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_config(config))
    }

    fn from_config(config: &ClassifierConfig) -> Self {
        Self {
            denylist: config.denylist.iter().map(|entry| normalize(entry)).collect(),
            min_digit_count: config.min_digit_count,
            max_distinct_digits: config.max_distinct_digits,
        }
    }

    /// Return the first rule that flags `identifier`, if any
    pub fn evaluate(&self, identifier: &str) -> Option<SuspicionReason> {
        let normalized = normalize(identifier);

        let reason = RULES
            .into_iter()
            .find(|rule| self.rule_matches(*rule, &normalized));

        if let Some(reason) = reason {
            debug!("Identifier {:?} flagged: {}", identifier, reason.as_str());
        }

        reason
    }

    /// Whether `identifier` looks like a scam source
    pub fn is_suspicious(&self, identifier: &str) -> bool {
        self.evaluate(identifier).is_some()
    }

    /// Number of distinct denylist entries after normalization
    pub fn denylist_len(&self) -> usize {
        self.denylist.len()
    }

    fn rule_matches(&self, rule: SuspicionReason, normalized: &str) -> bool {
        match rule {
            SuspicionReason::Denylisted => self.denylist.contains(normalized),
            SuspicionReason::BannedSubstring => {
                BANNED_SUBSTRINGS.iter().any(|s| normalized.contains(s))
                    || normalized == UNKNOWN_IDENTIFIER
            }
            SuspicionReason::LowEntropyDigits => self.is_low_entropy(normalized),
        }
    }

    fn is_low_entropy(&self, normalized: &str) -> bool {
        let digits: Vec<char> = normalized.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.len() < self.min_digit_count {
            return false;
        }

        let distinct: BTreeSet<char> = digits.into_iter().collect();
        distinct.len() <= self.max_distinct_digits
    }
}

impl Default for SuspicionClassifier {
    fn default() -> Self {
        Self::from_config(&ClassifierConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  PrIvAtE  "), "private");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("\t+254 700\n"), "+254 700");
    }

    #[test]
    fn test_denylist_is_case_and_whitespace_insensitive() {
        let classifier = SuspicionClassifier::default();

        for entry in DEFAULT_DENYLIST {
            let padded = format!("  {}\t", entry.to_uppercase());
            assert!(classifier.is_suspicious(&padded), "{} not flagged", padded);
            assert!(classifier.is_suspicious(entry));
        }
    }

    #[test]
    fn test_denylist_reason() {
        let classifier = SuspicionClassifier::default();
        assert_eq!(
            classifier.evaluate("TELEMARKETING"),
            Some(SuspicionReason::Denylisted)
        );
        assert_eq!(
            classifier.evaluate("0700000000"),
            Some(SuspicionReason::Denylisted)
        );
    }

    #[test]
    fn test_empty_identifier_is_not_suspicious() {
        let classifier = SuspicionClassifier::default();
        assert!(!classifier.is_suspicious(""));
        assert!(!classifier.is_suspicious("   "));
    }

    #[test]
    fn test_banned_substrings() {
        let classifier = SuspicionClassifier::default();
        assert!(classifier.is_suspicious("Private Caller"));
        assert!(classifier.is_suspicious("number restricted by carrier"));
        assert_eq!(
            classifier.evaluate("Private Caller"),
            Some(SuspicionReason::BannedSubstring)
        );
        // "unknown" only matches exactly
        assert!(!classifier.is_suspicious("unknown caller"));
    }

    #[test]
    fn test_low_entropy_digits() {
        let classifier = SuspicionClassifier::default();
        assert!(classifier.is_suspicious("1111111111"));
        assert!(!classifier.is_suspicious("1234567890"));
        assert!(!classifier.is_suspicious("121212121"));
        assert!(classifier.is_suspicious("1212121212"));
        assert!(classifier.is_suspicious("+12 1212-1212"));
        assert_eq!(
            classifier.evaluate("(999) 999-9999"),
            Some(SuspicionReason::LowEntropyDigits)
        );
    }

    #[test]
    fn test_regular_numbers_pass() {
        let classifier = SuspicionClassifier::default();
        assert!(!classifier.is_suspicious("+1 (415) 555-0132"));
        assert!(!classifier.is_suspicious("0722123456"));
        assert!(!classifier.is_suspicious("Mum"));
    }

    #[test]
    fn test_custom_denylist_keeps_fixed_rules() {
        let config = ClassifierConfig {
            denylist: vec!["  +254 700 111 222 ".to_string()],
            ..ClassifierConfig::default()
        };
        let classifier = SuspicionClassifier::new(&config).unwrap();

        assert!(classifier.is_suspicious("+254 700 111 222"));
        assert!(!classifier.is_suspicious("telemarketing"));
        // Fixed substring rule still applies without a denylist entry
        assert!(classifier.is_suspicious("unknown"));
        assert!(classifier.is_suspicious("restricted"));
    }

    #[test]
    fn test_custom_thresholds() {
        let config = ClassifierConfig {
            min_digit_count: 6,
            max_distinct_digits: 1,
            ..ClassifierConfig::default()
        };
        let classifier = SuspicionClassifier::new(&config).unwrap();

        assert!(classifier.is_suspicious("777777"));
        assert!(!classifier.is_suspicious("1212121212"));
    }

    #[test]
    fn test_config_defaults_from_empty_document() {
        let config: ClassifierConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ClassifierConfig::default());
        assert_eq!(SuspicionClassifier::new(&config).unwrap().denylist_len(), 9);
    }

    #[test]
    fn test_out_of_range_thresholds_rejected() {
        let config: ClassifierConfig = serde_json::from_str(r#"{"min_digit_count": 0}"#).unwrap();
        let result = SuspicionClassifier::new(&config);
        assert!(matches!(result, Err(ReaderError::Configuration(_))));

        let config = ClassifierConfig {
            max_distinct_digits: 10,
            ..ClassifierConfig::default()
        };
        assert!(matches!(
            SuspicionClassifier::new(&config),
            Err(ReaderError::Configuration(_))
        ));
    }

    #[test]
    fn test_smallest_thresholds_keep_empty_identifier_clean() {
        let config = ClassifierConfig {
            min_digit_count: 1,
            max_distinct_digits: 9,
            ..ClassifierConfig::default()
        };
        let classifier = SuspicionClassifier::new(&config).unwrap();

        assert!(!classifier.is_suspicious(""));
        assert!(!classifier.is_suspicious("Mum"));
        assert!(classifier.is_suspicious("5"));
    }
}
