//! Host Configuration
//!
//! Configuration for the scam detector command-line host, stored as TOML in
//! `<config_dir>/scam-detector/config.toml`.

use anyhow::{Context, Result};
use scam_detector_core::{ClassifierConfig, DEFAULT_LIMIT};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.toml";
const APP_DIR: &str = "scam-detector";

/// Host configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Suspicion classifier rules
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// SMS reader options
    #[serde(default)]
    pub sms: SmsConfig,

    /// Enumeration defaults
    #[serde(default)]
    pub reader: ReaderConfig,

    /// Store locations
    #[serde(default)]
    pub paths: PathConfig,
}

/// SMS reader options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmsConfig {
    /// Attach a suspicion verdict to every message
    #[serde(default = "default_false")]
    pub annotate_suspicion: bool,
}

/// Enumeration defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// Limit used when a command does not pass one
    #[serde(default = "default_limit")]
    pub default_limit: usize,
}

/// Store locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathConfig {
    /// Directory holding `config.toml`
    #[serde(default = "default_config_dir")]
    pub config_dir: PathBuf,

    /// Call history database
    #[serde(default = "default_call_log_db")]
    pub call_log_db: PathBuf,

    /// SMS database
    #[serde(default = "default_sms_db")]
    pub sms_db: PathBuf,
}

fn default_false() -> bool {
    false
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join(APP_DIR)
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from(".local/share"))
        .join(APP_DIR)
}

fn default_call_log_db() -> PathBuf {
    default_data_dir().join("calllog.db")
}

fn default_sms_db() -> PathBuf {
    default_data_dir().join("mmssms.db")
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            annotate_suspicion: default_false(),
        }
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
        }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            call_log_db: default_call_log_db(),
            sms_db: default_sms_db(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::default(),
            sms: SmsConfig::default(),
            reader: ReaderConfig::default(),
            paths: PathConfig::default(),
        }
    }
}

impl Config {
    /// Path of the configuration file in the default location
    pub fn default_path() -> PathBuf {
        default_config_dir().join(CONFIG_FILE)
    }

    /// Load configuration from the default location, creating it if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load configuration from `path`, writing defaults there if not found
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            let config: Config = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?;
            config
                .classifier
                .validate()
                .with_context(|| format!("Invalid classifier settings in {}", path.display()))?;
            Ok(config)
        } else {
            let mut config = Config::default();
            if let Some(parent) = path.parent() {
                config.paths.config_dir = parent.to_path_buf();
            }
            config.save_to(path)?;
            tracing::info!("Wrote default configuration to {}", path.display());
            Ok(config)
        }
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.reader.default_limit, 50);
        assert!(!config.sms.annotate_suspicion);
        assert_eq!(config.classifier.min_digit_count, 10);
        assert_eq!(config.classifier.denylist.len(), 9);
        assert!(config.paths.call_log_db.ends_with("scam-detector/calllog.db"));
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: Config = toml::from_str(
            r#"
            [sms]
            annotate_suspicion = true

            [classifier]
            denylist = ["0799999999"]
            "#,
        )
        .unwrap();

        assert!(parsed.sms.annotate_suspicion);
        assert_eq!(parsed.classifier.denylist, vec!["0799999999".to_string()]);
        assert_eq!(parsed.classifier.max_distinct_digits, 2);
        assert_eq!(parsed.reader.default_limit, 50);
    }

    #[test]
    fn test_load_from_creates_default_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.paths.config_dir, dir.path().join("nested"));

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.config_dir = dir.path().to_path_buf();
        config.reader.default_limit = 7;
        let path = config.paths.config_dir.join(CONFIG_FILE);
        config.save_to(&path).unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.reader.default_limit, 7);
    }

    #[test]
    fn test_invalid_config_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "reader = 3").unwrap();

        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_zero_min_digit_count_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[classifier]\nmin_digit_count = 0\n").unwrap();

        let error = Config::load_from(&path).unwrap_err();
        assert!(format!("{:#}", error).contains("min_digit_count"));
    }
}
