//! Command Line and Logging
//!
//! Argument parsing and tracing setup for the scam detector host.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

/// Scam detector command-line interface
#[derive(Parser, Debug)]
#[command(name = "scam-detector")]
#[command(about = "Read call history and SMS, flagging likely scam sources", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Set log level (error, warn, info, debug, trace)
    #[arg(short, long, value_name = "LEVEL", default_value = "warn", global = true)]
    pub log_level: String,

    /// Enable JSON structured logging
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Show timestamps in logs
    #[arg(long, default_value_t = true, action = ArgAction::Set, global = true)]
    pub timestamps: bool,

    /// Read configuration from this file instead of the default location
    #[arg(short, long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List recent calls with their suspicion verdict
    ReadCallLogs {
        /// Maximum number of calls (defaults to reader.default_limit)
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Print the raw channel payload instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List recent inbox messages
    ReadSms {
        /// Maximum number of messages (defaults to reader.default_limit)
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Print the raw channel payload instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Classify one or more identifiers
    Check {
        /// Phone numbers or sender names
        #[arg(required = true)]
        identifiers: Vec<String>,
    },

    /// Send a raw method call to a channel and print the result
    Invoke {
        /// Channel name
        channel: String,

        /// Method name
        method: String,

        /// Arguments as a JSON object
        #[arg(long, value_name = "JSON")]
        args: Option<String>,
    },

    /// Show the effective configuration
    DumpConfig,
}

/// Initialize logging based on CLI configuration
pub fn init_logging(cli: &Cli) -> Result<()> {
    let log_level = cli.log_level.parse::<Level>().with_context(|| {
        format!(
            "Invalid log level '{}'. Valid levels: error, warn, info, debug, trace",
            cli.log_level
        )
    })?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level.as_str()))
        .context("Failed to create log filter")?;

    // Logs go to stderr so command output stays clean on stdout
    let subscriber = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false);

    match (cli.json_logs, cli.timestamps) {
        (true, true) => subscriber.json().init(),
        (true, false) => subscriber.without_time().json().init(),
        (false, true) => subscriber.init(),
        (false, false) => subscriber.without_time().init(),
    }

    info!(
        "Logging initialized: level={}, json={}, timestamps={}",
        log_level, cli.json_logs, cli.timestamps
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_read_call_logs() {
        let cli = Cli::try_parse_from(["scam-detector", "read-call-logs", "-n", "5"]).unwrap();
        assert_eq!(cli.log_level, "warn");
        assert!(cli.timestamps);
        match cli.command {
            Command::ReadCallLogs { limit, json } => {
                assert_eq!(limit, Some(5));
                assert!(!json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "scam-detector",
            "read-sms",
            "--json",
            "--timestamps",
            "false",
            "--config",
            "/tmp/detector.toml",
        ])
        .unwrap();

        assert!(!cli.timestamps);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/detector.toml")));
        assert!(matches!(cli.command, Command::ReadSms { limit: None, json: true }));
    }

    #[test]
    fn test_check_requires_identifier() {
        assert!(Cli::try_parse_from(["scam-detector", "check"]).is_err());

        let cli = Cli::try_parse_from(["scam-detector", "check", "0700000000", "Private"]).unwrap();
        match cli.command {
            Command::Check { identifiers } => assert_eq!(identifiers.len(), 2),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_invoke_arguments() {
        let cli = Cli::try_parse_from([
            "scam-detector",
            "invoke",
            "com.example.scam_detector_app/sms_reader",
            "readSms",
            "--args",
            r#"{"limit": 3}"#,
        ])
        .unwrap();

        match cli.command {
            Command::Invoke {
                channel,
                method,
                args,
            } => {
                assert!(channel.ends_with("sms_reader"));
                assert_eq!(method, "readSms");
                assert_eq!(args.as_deref(), Some(r#"{"limit": 3}"#));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
