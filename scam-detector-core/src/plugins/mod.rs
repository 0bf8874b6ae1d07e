//! Reader Plugin Architecture
//!
//! This module provides the plugin trait and the manager that routes method
//! calls to plugins. Each plugin owns one method channel and answers the
//! calls made on it.
//!
//! ## Plugin Architecture
//!
//! A host (mobile runtime, CLI, test harness) reaches the readers only
//! through named channels:
//!
//! - `com.example.scam_detector_app/call_log_reader` - [`call_log::CallLogReaderPlugin`]
//! - `com.example.scam_detector_app/sms_reader` - [`sms::SmsReaderPlugin`]
//!
//! ### Core Principles
//!
//! 1. **Typed Requests**: plugins parse a [`MethodCall`] into a request enum once
//! 2. **One Failure Per Call**: a failed call yields a single error result, never a partial payload
//! 3. **No Retries**: a caller that wants to retry makes a new call
//! 4. **Unknown Means Not Implemented**: unknown methods and channels are not errors
//!
//! ## Plugin Lifecycle
//!
//! ```text
//! Created → Attached → (handle_call)* → Detached
//!              ↑                           ↓
//!              └──────── Re-attach ────────┘
//! ```
//!
//! - **Created**: plugin instance exists, no store handles
//! - **Attached**: plugin received a [`PluginContext`] and can read its store
//! - **Detached**: store handles dropped; reads fail as if never attached
//!
//! ## Example
//!
//! ```rust,ignore
//! use scam_detector_core::plugins::*;
//!
//! let mut manager = PluginManager::with_default_plugins()?;
//! manager.attach_all(&context).await?;
//!
//! let result = manager
//!     .dispatch(CALL_LOG_CHANNEL, &MethodCall::without_arguments("readCallLogs"))
//!     .await;
//!
//! manager.detach_all().await?;
//! ```

pub mod call_log;
pub mod sms;

use crate::channel::{MethodCall, MethodResult};
use crate::classifier::SuspicionClassifier;
use crate::provider::{CallLogProvider, SmsProvider};
use crate::{ReaderError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub use call_log::CallLogReaderPlugin;
pub use sms::SmsReaderPlugin;

/// Everything a plugin needs to serve reads
///
/// Plays the role of the application context on a device: it carries the
/// store handles, which may be missing, and the shared classifier.
#[derive(Clone)]
pub struct PluginContext {
    pub call_log: Option<Arc<dyn CallLogProvider>>,
    pub sms_inbox: Option<Arc<dyn SmsProvider>>,
    pub classifier: Arc<SuspicionClassifier>,
    /// Annotate SMS records with the classifier verdict
    pub annotate_sms: bool,
}

impl PluginContext {
    /// Context without any store handles
    pub fn new(classifier: Arc<SuspicionClassifier>) -> Self {
        Self {
            call_log: None,
            sms_inbox: None,
            classifier,
            annotate_sms: false,
        }
    }

    pub fn with_call_log(mut self, provider: Arc<dyn CallLogProvider>) -> Self {
        self.call_log = Some(provider);
        self
    }

    pub fn with_sms_inbox(mut self, provider: Arc<dyn SmsProvider>) -> Self {
        self.sms_inbox = Some(provider);
        self
    }

    pub fn with_sms_annotation(mut self, annotate: bool) -> Self {
        self.annotate_sms = annotate;
        self
    }
}

/// Plugin trait for serving a method channel
///
/// ## Thread Safety
///
/// Plugins must be `Send + Sync` so a host can drive them from any task.
///
/// ## Call Handling
///
/// `handle_call` never returns a Rust error: every failure is folded into a
/// [`MethodResult::Error`] carrying the channel's error code.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Short, lowercase identifier like "call_log" or "sms"
    fn name(&self) -> &str;

    /// Channel this plugin serves
    fn channel(&self) -> &str;

    /// Method names this plugin understands
    fn methods(&self) -> Vec<String>;

    /// Attach to a context
    ///
    /// Called before the first call. Attaching again replaces the previous
    /// context.
    async fn attach(&mut self, context: &PluginContext) -> Result<()>;

    /// Drop every store handle
    async fn detach(&mut self) -> Result<()>;

    /// Answer one method call
    async fn handle_call(&self, call: &MethodCall) -> MethodResult;

    /// Whether the plugin currently holds a context
    fn is_attached(&self) -> bool;
}

/// Plugin registry and call router
///
/// Maps each channel name to the plugin that serves it.
pub struct PluginManager {
    plugins: HashMap<String, Box<dyn Plugin>>,
}

impl PluginManager {
    /// Create a new empty plugin manager
    pub fn new() -> Self {
        Self {
            plugins: HashMap::new(),
        }
    }

    /// Manager with the call log and SMS plugins registered
    pub fn with_default_plugins() -> Result<Self> {
        let mut manager = Self::new();
        manager.register(Box::new(CallLogReaderPlugin::new()))?;
        manager.register(Box::new(SmsReaderPlugin::new()))?;
        Ok(manager)
    }

    /// Register a plugin
    ///
    /// # Errors
    ///
    /// Returns error if another plugin already serves the same channel.
    pub fn register(&mut self, plugin: Box<dyn Plugin>) -> Result<()> {
        let channel = plugin.channel().to_string();

        if let Some(existing) = self.plugins.get(&channel) {
            return Err(ReaderError::Plugin(format!(
                "Channel '{}' already served by plugin '{}'",
                channel,
                existing.name()
            )));
        }

        info!("Registered plugin {} on {}", plugin.name(), channel);
        self.plugins.insert(channel, plugin);
        Ok(())
    }

    /// Remove the plugin serving `channel`
    pub fn unregister(&mut self, channel: &str) -> Option<Box<dyn Plugin>> {
        let plugin = self.plugins.remove(channel);
        if let Some(ref p) = plugin {
            info!("Unregistered plugin {} from {}", p.name(), channel);
        }
        plugin
    }

    /// Attach every plugin to `context`
    ///
    /// # Errors
    ///
    /// Attaches as many plugins as possible, then reports the ones that failed.
    pub async fn attach_all(&mut self, context: &PluginContext) -> Result<()> {
        let mut failed = Vec::new();

        for (channel, plugin) in self.plugins.iter_mut() {
            debug!("Attaching plugin {} on {}", plugin.name(), channel);
            if let Err(e) = plugin.attach(context).await {
                warn!("Failed to attach plugin {}: {}", plugin.name(), e);
                failed.push(plugin.name().to_string());
            }
        }

        if failed.is_empty() {
            info!("Attached {} plugins", self.plugins.len());
            Ok(())
        } else {
            Err(ReaderError::Plugin(format!(
                "Failed to attach {} plugins: {:?}",
                failed.len(),
                failed
            )))
        }
    }

    /// Detach every plugin
    ///
    /// # Errors
    ///
    /// Detaches as many plugins as possible, then reports the ones that failed.
    pub async fn detach_all(&mut self) -> Result<()> {
        let mut failed = Vec::new();

        for plugin in self.plugins.values_mut() {
            if let Err(e) = plugin.detach().await {
                warn!("Failed to detach plugin {}: {}", plugin.name(), e);
                failed.push(plugin.name().to_string());
            }
        }

        if failed.is_empty() {
            info!("Detached {} plugins", self.plugins.len());
            Ok(())
        } else {
            Err(ReaderError::Plugin(format!(
                "Failed to detach {} plugins: {:?}",
                failed.len(),
                failed
            )))
        }
    }

    /// Route a call to the plugin serving `channel`
    ///
    /// Unknown channels answer `NotImplemented`, like unknown methods.
    pub async fn dispatch(&self, channel: &str, call: &MethodCall) -> MethodResult {
        match self.plugins.get(channel) {
            Some(plugin) => {
                debug!("Dispatching {} to {}", call.method, plugin.name());
                plugin.handle_call(call).await
            }
            None => {
                warn!("No plugin serves channel {}", channel);
                MethodResult::NotImplemented
            }
        }
    }

    pub fn get(&self, channel: &str) -> Option<&dyn Plugin> {
        self.plugins.get(channel).map(|p| p.as_ref())
    }

    /// Registered channel names, sorted
    pub fn channels(&self) -> Vec<String> {
        let mut channels: Vec<String> = self.plugins.keys().cloned().collect();
        channels.sort();
        channels
    }

    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }
}

impl Default for PluginManager {
    fn default() -> Self {
        Self::new()
    }
}
