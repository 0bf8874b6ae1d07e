mod config;
mod diagnostics;
mod output;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use diagnostics::{Cli, Command};
use scam_detector_core::channel::{METHOD_READ_CALL_LOGS, METHOD_READ_SMS};
use scam_detector_core::{
    CallRecord, MessageRecord, MethodCall, MethodResult, PluginContext, PluginManager,
    SqliteCallLog, SqliteSmsInbox, SuspicionClassifier, CALL_LOG_CHANNEL, SMS_CHANNEL,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

use config::Config;

/// Host state: the shared classifier and the attached reader plugins
struct Host {
    config: Config,
    classifier: Arc<SuspicionClassifier>,
    plugin_manager: PluginManager,
}

impl Host {
    /// Build the stores from configuration and attach every plugin
    async fn new(config: Config) -> Result<Self> {
        let classifier = Arc::new(
            SuspicionClassifier::new(&config.classifier)
                .context("Invalid classifier configuration")?,
        );
        info!(
            "Classifier ready with {} denylist entries",
            classifier.denylist_len()
        );

        let context = PluginContext::new(classifier.clone())
            .with_call_log(Arc::new(SqliteCallLog::new(&config.paths.call_log_db)))
            .with_sms_inbox(Arc::new(SqliteSmsInbox::new(&config.paths.sms_db)))
            .with_sms_annotation(config.sms.annotate_suspicion);

        let mut plugin_manager =
            PluginManager::with_default_plugins().context("Failed to register plugins")?;
        plugin_manager
            .attach_all(&context)
            .await
            .context("Failed to attach plugins")?;

        debug!("Channels: {:?}", plugin_manager.channels());

        Ok(Self {
            config,
            classifier,
            plugin_manager,
        })
    }

    /// Dispatch a call and turn a channel error into an `anyhow` error
    async fn call(&self, channel: &str, call: MethodCall) -> Result<Value> {
        match self.plugin_manager.dispatch(channel, &call).await {
            MethodResult::Success { payload } => Ok(payload),
            MethodResult::Error { code, message, .. } => Err(anyhow!("{}: {}", code, message)),
            MethodResult::NotImplemented => {
                bail!("{} is not implemented on {}", call.method, channel)
            }
        }
    }

    fn limit(&self, limit: Option<usize>) -> usize {
        limit.unwrap_or(self.config.reader.default_limit)
    }

    async fn read_call_logs(&self, limit: Option<usize>, raw: bool) -> Result<()> {
        let call = MethodCall::new(METHOD_READ_CALL_LOGS, json!({ "limit": self.limit(limit) }));
        let payload = self.call(CALL_LOG_CHANNEL, call).await?;

        let encoded = payload
            .as_str()
            .context("Call log payload is not a string")?;
        if raw {
            println!("{}", encoded);
            return Ok(());
        }

        let records: Vec<CallRecord> =
            serde_json::from_str(encoded).context("Failed to decode call log payload")?;
        print!("{}", output::call_table(&records));
        Ok(())
    }

    async fn read_sms(&self, limit: Option<usize>, raw: bool) -> Result<()> {
        let call = MethodCall::new(METHOD_READ_SMS, json!({ "limit": self.limit(limit) }));
        let payload = self.call(SMS_CHANNEL, call).await?;

        if raw {
            println!("{}", serde_json::to_string_pretty(&payload)?);
            return Ok(());
        }

        let records: Vec<MessageRecord> =
            serde_json::from_value(payload).context("Failed to decode SMS payload")?;
        print!("{}", output::message_table(&records));
        Ok(())
    }

    fn check(&self, identifiers: &[String]) {
        for identifier in identifiers {
            println!(
                "{}",
                output::verdict_line(identifier, self.classifier.evaluate(identifier))
            );
        }
    }

    async fn invoke(&self, channel: &str, method: &str, args: Option<&str>) -> Result<()> {
        let arguments = match args {
            Some(text) => serde_json::from_str(text).context("--args is not valid JSON")?,
            None => Value::Null,
        };

        let result = self
            .plugin_manager
            .dispatch(channel, &MethodCall::new(method, arguments))
            .await;
        println!("{}", serde_json::to_string_pretty(&result)?);
        Ok(())
    }

    async fn shutdown(mut self) -> Result<()> {
        self.plugin_manager
            .detach_all()
            .await
            .context("Failed to detach plugins")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    diagnostics::init_logging(&cli).context("Failed to initialize logging")?;

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;

    if let Command::DumpConfig = cli.command {
        print!(
            "{}",
            toml::to_string_pretty(&config).context("Failed to serialize config")?
        );
        return Ok(());
    }

    let host = Host::new(config).await.context("Failed to start host")?;

    let result = match &cli.command {
        Command::ReadCallLogs { limit, json } => host.read_call_logs(*limit, *json).await,
        Command::ReadSms { limit, json } => host.read_sms(*limit, *json).await,
        Command::Check { identifiers } => {
            host.check(identifiers);
            Ok(())
        }
        Command::Invoke {
            channel,
            method,
            args,
        } => host.invoke(channel, method, args.as_deref()).await,
        Command::DumpConfig => Ok(()),
    };

    host.shutdown().await?;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_host_rejects_invalid_classifier_thresholds() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.call_log_db = dir.path().join("calllog.db");
        config.paths.sms_db = dir.path().join("mmssms.db");
        config.classifier.max_distinct_digits = 10;

        let error = match Host::new(config).await {
            Ok(_) => panic!("host started with max_distinct_digits = 10"),
            Err(e) => e,
        };
        let chain = format!("{:#}", error);
        assert!(chain.starts_with("Invalid classifier configuration"));
        assert!(chain.contains("max_distinct_digits"));
    }

    #[tokio::test]
    async fn test_host_starts_with_default_config() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.call_log_db = dir.path().join("calllog.db");
        config.paths.sms_db = dir.path().join("mmssms.db");

        let host = Host::new(config).await.unwrap();
        host.shutdown().await.unwrap();
    }
}
