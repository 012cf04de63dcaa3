//! Notification channels for alert delivery.
//!
//! This module provides the [`NotificationChannel`] trait and its
//! implementations. Channels here format a payload and log the delivery;
//! wiring them to live SMTP/Slack/SMS endpoints happens at the boundary
//! with the excluded web layer, outside this core.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use vigil_alerts::{Alert, AlertSeverity};

use crate::error::{NotifyError, Result};

/// Result of sending a notification through one channel.
#[derive(Debug, Clone)]
pub struct NotificationResult {
    /// Whether the notification was sent successfully.
    pub success: bool,
    /// The channel that processed this notification.
    pub channel: String,
    /// Optional message or error description.
    pub message: Option<String>,
}

impl NotificationResult {
    /// Creates a successful result.
    #[must_use]
    pub fn success(channel: impl Into<String>) -> Self {
        Self {
            success: true,
            channel: channel.into(),
            message: None,
        }
    }

    /// Creates a failed result.
    #[must_use]
    pub fn failure(channel: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            channel: channel.into(),
            message: Some(message.into()),
        }
    }

    /// Sets the message.
    #[must_use]
    pub fn with_message(mut self, msg: impl Into<String>) -> Self {
        self.message = Some(msg.into());
        self
    }
}

/// Trait for notification channels.
///
/// Implement this trait to create custom channels for delivering alerts via
/// different protocols or services.
pub trait NotificationChannel: Send + Sync + fmt::Debug {
    /// Returns the name of this channel.
    fn name(&self) -> &str;

    /// Sends one alert through this channel.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::DeliveryFailed` if the notification cannot be
    /// sent.
    fn send(&self, alert: &Alert) -> Result<NotificationResult>;

    /// Returns true if this channel is enabled.
    fn is_enabled(&self) -> bool {
        true
    }
}

/// The JSON payload posted by the webhook channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    /// The alert identifier.
    pub alert_id: String,
    /// What produced the alert.
    pub kind: String,
    /// Alert severity string.
    pub severity: String,
    /// Alert title.
    pub title: String,
    /// Alert message.
    pub message: String,
    /// The subsystem that raised the alert.
    pub source: String,
    /// Creation time (epoch millis).
    pub timestamp: i64,
    /// Whether the alert has been resolved.
    pub resolved: bool,
    /// Additional context.
    pub metadata: HashMap<String, String>,
}

impl WebhookPayload {
    /// Creates a payload from an alert.
    #[must_use]
    pub fn from_alert(alert: &Alert) -> Self {
        Self {
            alert_id: alert.id.clone(),
            kind: alert.kind.clone(),
            severity: alert.severity.as_str().to_string(),
            title: alert.title.clone(),
            message: alert.message.clone(),
            source: alert.source.clone(),
            timestamp: alert.timestamp,
            resolved: alert.resolved,
            metadata: alert.metadata.clone(),
        }
    }
}

/// Configuration for a webhook channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// The name of this webhook.
    pub name: String,
    /// The URL to send notifications to.
    pub url: String,
    /// HTTP headers to include with requests.
    pub headers: HashMap<String, String>,
    /// Timeout in seconds for HTTP requests.
    pub timeout_secs: u64,
    /// Whether this channel is enabled.
    pub enabled: bool,
}

impl WebhookConfig {
    /// Creates a new webhook configuration.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::DeliveryFailed` if the URL is empty.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let url = url.into();
        if url.is_empty() {
            return Err(NotifyError::DeliveryFailed {
                channel: name,
                reason: "webhook URL cannot be empty".to_string(),
            });
        }

        Ok(Self {
            name,
            url,
            headers: HashMap::new(),
            timeout_secs: 30,
            enabled: true,
        })
    }

    /// Adds a header to the configuration.
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets whether the channel is enabled.
    #[must_use]
    pub const fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// A webhook notification channel.
///
/// Formats alerts as JSON POST payloads for a configured URL.
#[derive(Debug, Clone)]
pub struct WebhookChannel {
    config: WebhookConfig,
}

impl WebhookChannel {
    /// Creates a new webhook channel with the given configuration.
    #[must_use]
    pub const fn new(config: WebhookConfig) -> Self {
        Self { config }
    }

    /// Returns the webhook URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Formats the alert as the JSON payload that would be posted.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::SerializationError` if serialization fails.
    pub fn format_payload(&self, alert: &Alert) -> Result<String> {
        let payload = WebhookPayload::from_alert(alert);
        serde_json::to_string(&payload).map_err(NotifyError::from)
    }
}

impl NotificationChannel for WebhookChannel {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn send(&self, alert: &Alert) -> Result<NotificationResult> {
        if !self.is_enabled() {
            debug!(channel = %self.name(), "channel is disabled, skipping");
            return Ok(NotificationResult::success(self.name())
                .with_message("channel disabled, notification skipped"));
        }

        let payload = self.format_payload(alert)?;

        info!(
            channel = %self.name(),
            url = %self.config.url,
            alert_id = %alert.id,
            severity = %alert.severity,
            "would post webhook notification"
        );
        debug!(payload = %payload, "webhook payload");

        Ok(NotificationResult::success(self.name()).with_message("notification queued"))
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }
}

/// Email notification channel.
///
/// Formats the alert as an email and logs the delivery; a production
/// deployment connects this to an SMTP relay at the boundary.
#[derive(Debug, Clone)]
pub struct EmailChannel {
    name: String,
    to: Vec<String>,
    from: String,
    enabled: bool,
}

impl EmailChannel {
    /// Creates a new email channel.
    #[must_use]
    pub fn new(name: impl Into<String>, to: Vec<String>, from: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            to,
            from: from.into(),
            enabled: true,
        }
    }

    /// Sets whether the channel is enabled.
    #[must_use]
    pub const fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Returns the recipient addresses.
    #[must_use]
    pub fn recipients(&self) -> &[String] {
        &self.to
    }
}

impl NotificationChannel for EmailChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&self, alert: &Alert) -> Result<NotificationResult> {
        if !self.is_enabled() {
            debug!(channel = %self.name(), "channel is disabled, skipping");
            return Ok(NotificationResult::success(self.name())
                .with_message("channel disabled, notification skipped"));
        }

        info!(
            channel = %self.name(),
            to = ?self.to,
            from = %self.from,
            subject = %format!("[{}] {}", alert.severity, alert.title),
            alert_id = %alert.id,
            "would send email notification"
        );

        Ok(NotificationResult::success(self.name()))
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Slack notification channel.
#[derive(Debug, Clone)]
pub struct SlackChannel {
    name: String,
    webhook_url: String,
    slack_channel: String,
    enabled: bool,
}

impl SlackChannel {
    /// Creates a new Slack channel.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        webhook_url: impl Into<String>,
        slack_channel: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            webhook_url: webhook_url.into(),
            slack_channel: slack_channel.into(),
            enabled: true,
        }
    }

    /// Sets whether the channel is enabled.
    #[must_use]
    pub const fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    fn severity_emoji(severity: AlertSeverity) -> &'static str {
        match severity {
            AlertSeverity::Critical => ":rotating_light:",
            AlertSeverity::High => ":warning:",
            AlertSeverity::Medium | AlertSeverity::Warning => ":large_yellow_circle:",
            AlertSeverity::Low => ":information_source:",
        }
    }
}

impl NotificationChannel for SlackChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&self, alert: &Alert) -> Result<NotificationResult> {
        if !self.is_enabled() {
            debug!(channel = %self.name(), "channel is disabled, skipping");
            return Ok(NotificationResult::success(self.name())
                .with_message("channel disabled, notification skipped"));
        }

        let text = format!(
            "{} *{}* — {}",
            Self::severity_emoji(alert.severity),
            alert.title,
            alert.message
        );

        info!(
            channel = %self.name(),
            url = %self.webhook_url,
            slack_channel = %self.slack_channel,
            alert_id = %alert.id,
            text = %text,
            "would post Slack notification"
        );

        Ok(NotificationResult::success(self.name()))
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// SMS notification channel.
#[derive(Debug, Clone)]
pub struct SmsChannel {
    name: String,
    numbers: Vec<String>,
    enabled: bool,
}

impl SmsChannel {
    /// Creates a new SMS channel.
    #[must_use]
    pub fn new(name: impl Into<String>, numbers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            numbers,
            enabled: true,
        }
    }

    /// Sets whether the channel is enabled.
    #[must_use]
    pub const fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

impl NotificationChannel for SmsChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&self, alert: &Alert) -> Result<NotificationResult> {
        if !self.is_enabled() {
            debug!(channel = %self.name(), "channel is disabled, skipping");
            return Ok(NotificationResult::success(self.name())
                .with_message("channel disabled, notification skipped"));
        }

        info!(
            channel = %self.name(),
            numbers = ?self.numbers,
            alert_id = %alert.id,
            text = %format!("[{}] {}", alert.severity, alert.title),
            "would send SMS notification"
        );

        Ok(NotificationResult::success(self.name()))
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// A channel that logs notifications for debugging.
#[derive(Debug, Clone)]
pub struct LogChannel {
    name: String,
    enabled: bool,
}

impl LogChannel {
    /// Creates a new log channel.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
        }
    }

    /// Sets whether the channel is enabled.
    #[must_use]
    pub const fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

impl Default for LogChannel {
    fn default() -> Self {
        Self::new("log")
    }
}

impl NotificationChannel for LogChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&self, alert: &Alert) -> Result<NotificationResult> {
        if !self.is_enabled() {
            return Ok(NotificationResult::success(self.name()).with_message("channel disabled"));
        }

        error!(
            alert_id = %alert.id,
            severity = %alert.severity,
            source = %alert.source,
            title = %alert.title,
            "ALERT"
        );

        Ok(NotificationResult::success(self.name()).with_message("logged to tracing"))
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// An ad-hoc single-use channel targeting one extra recipient.
///
/// Escalation levels can name additional recipients beyond the configured
/// channels; each becomes one of these for the single escalated delivery.
#[derive(Debug, Clone)]
pub struct RecipientChannel {
    recipient: String,
}

impl RecipientChannel {
    /// Creates a channel for the given recipient address.
    #[must_use]
    pub fn new(recipient: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
        }
    }
}

impl NotificationChannel for RecipientChannel {
    fn name(&self) -> &str {
        &self.recipient
    }

    fn send(&self, alert: &Alert) -> Result<NotificationResult> {
        info!(
            recipient = %self.recipient,
            alert_id = %alert.id,
            severity = %alert.severity,
            title = %alert.title,
            "would notify escalation recipient"
        );

        Ok(NotificationResult::success(self.recipient.clone()))
    }
}
