//! Monitor configuration.
//!
//! Defaults cover local development; every knob can be overridden through
//! `VIGIL_*` environment variables or the builder setters.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use tracing::warn;

use vigil_alerts::ThresholdLimits;

/// Configuration for the monitoring core.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// How often registered health probes run.
    pub health_check_interval: Duration,
    /// How often metric collectors sample.
    pub metrics_interval: Duration,
    /// How often alert rules are evaluated.
    pub rule_eval_interval: Duration,
    /// How often the notification queue is drained.
    pub queue_interval: Duration,
    /// Samples retained per metric name.
    pub max_metric_history: usize,
    /// Alerts retained before eviction.
    pub max_alerts: usize,
    /// Log entries retained before eviction.
    pub max_log_entries: usize,
    /// Error reports retained before eviction.
    pub max_error_reports: usize,
    /// Per-metric warning/critical threshold overrides.
    pub threshold_overrides: HashMap<String, ThresholdLimits>,
    /// Address the HTTP API binds to.
    pub bind_addr: SocketAddr,
    /// Include full error detail in HTTP 500 responses.
    pub dev_mode: bool,
    /// Recipients for the default email channel.
    pub email_recipients: Vec<String>,
    /// Sender for the default email channel.
    pub email_from: String,
    /// Incoming-webhook URL for the default Slack channel.
    pub slack_webhook_url: String,
    /// Slack channel the default Slack channel posts to.
    pub slack_channel: String,
    /// URL for the default webhook channel.
    pub webhook_url: String,
    /// Numbers for the default SMS channel (empty disables it).
    pub sms_numbers: Vec<String>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            health_check_interval: Duration::from_secs(30),
            metrics_interval: Duration::from_secs(60),
            rule_eval_interval: Duration::from_secs(15),
            queue_interval: Duration::from_secs(1),
            max_metric_history: 1000,
            max_alerts: 10_000,
            max_log_entries: 10_000,
            max_error_reports: 5000,
            threshold_overrides: HashMap::new(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            dev_mode: false,
            email_recipients: vec!["ops@localhost".to_string()],
            email_from: "vigil@localhost".to_string(),
            slack_webhook_url: "https://hooks.slack.com/services/replace-me".to_string(),
            slack_channel: "#alerts".to_string(),
            webhook_url: "http://localhost:9000/alerts".to_string(),
            sms_numbers: Vec::new(),
        }
    }
}

impl MonitorConfig {
    /// Builds a configuration from `VIGIL_*` environment variables, falling
    /// back to defaults for anything unset or unparsable (logged).
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(ms) = read_u64("VIGIL_HEALTH_INTERVAL_MS") {
            config.health_check_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = read_u64("VIGIL_METRICS_INTERVAL_MS") {
            config.metrics_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = read_u64("VIGIL_RULE_EVAL_INTERVAL_MS") {
            config.rule_eval_interval = Duration::from_millis(ms);
        }
        if let Some(n) = read_u64("VIGIL_MAX_METRIC_HISTORY") {
            config.max_metric_history = n as usize;
        }
        if let Some(n) = read_u64("VIGIL_MAX_ALERTS") {
            config.max_alerts = n as usize;
        }
        if let Some(n) = read_u64("VIGIL_MAX_LOG_ENTRIES") {
            config.max_log_entries = n as usize;
        }
        if let Some(n) = read_u64("VIGIL_MAX_ERROR_REPORTS") {
            config.max_error_reports = n as usize;
        }
        if let Ok(addr) = std::env::var("VIGIL_BIND_ADDR") {
            match addr.parse() {
                Ok(addr) => config.bind_addr = addr,
                Err(e) => warn!(value = %addr, error = %e, "ignoring invalid VIGIL_BIND_ADDR"),
            }
        }
        if let Ok(v) = std::env::var("VIGIL_DEV_MODE") {
            config.dev_mode = v == "1" || v.eq_ignore_ascii_case("true");
        }
        if let Some(list) = read_list("VIGIL_EMAIL_RECIPIENTS") {
            config.email_recipients = list;
        }
        if let Ok(v) = std::env::var("VIGIL_EMAIL_FROM") {
            config.email_from = v;
        }
        if let Ok(v) = std::env::var("VIGIL_SLACK_WEBHOOK_URL") {
            config.slack_webhook_url = v;
        }
        if let Ok(v) = std::env::var("VIGIL_SLACK_CHANNEL") {
            config.slack_channel = v;
        }
        if let Ok(v) = std::env::var("VIGIL_WEBHOOK_URL") {
            config.webhook_url = v;
        }
        if let Some(list) = read_list("VIGIL_SMS_NUMBERS") {
            config.sms_numbers = list;
        }
        if let Ok(spec) = std::env::var("VIGIL_THRESHOLDS") {
            config.threshold_overrides = parse_thresholds(&spec);
        }

        config
    }

    /// Overrides the health-check interval.
    #[must_use]
    pub const fn with_health_check_interval(mut self, interval: Duration) -> Self {
        self.health_check_interval = interval;
        self
    }

    /// Overrides the metrics-collection interval.
    #[must_use]
    pub const fn with_metrics_interval(mut self, interval: Duration) -> Self {
        self.metrics_interval = interval;
        self
    }

    /// Overrides the rule-evaluation interval.
    #[must_use]
    pub const fn with_rule_eval_interval(mut self, interval: Duration) -> Self {
        self.rule_eval_interval = interval;
        self
    }

    /// Adds a per-metric threshold override.
    #[must_use]
    pub fn with_threshold(mut self, metric: impl Into<String>, limits: ThresholdLimits) -> Self {
        self.threshold_overrides.insert(metric.into(), limits);
        self
    }

    /// Sets the HTTP bind address.
    #[must_use]
    pub const fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Enables development mode (full error detail in responses).
    #[must_use]
    pub const fn with_dev_mode(mut self, dev_mode: bool) -> Self {
        self.dev_mode = dev_mode;
        self
    }
}

fn read_u64(key: &str) -> Option<u64> {
    let value = std::env::var(key).ok()?;
    match value.parse() {
        Ok(n) => Some(n),
        Err(e) => {
            warn!(key, value = %value, error = %e, "ignoring unparsable environment variable");
            None
        }
    }
}

fn read_list(key: &str) -> Option<Vec<String>> {
    let value = std::env::var(key).ok()?;
    Some(
        value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect(),
    )
}

/// Parses `metric=warning:critical` pairs separated by commas, e.g.
/// `system.cpu.usage=75:90,db.query_time_ms=400:1500`.
fn parse_thresholds(spec: &str) -> HashMap<String, ThresholdLimits> {
    let mut overrides = HashMap::new();
    for pair in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let Some((metric, limits)) = pair.split_once('=') else {
            warn!(pair, "ignoring malformed threshold override");
            continue;
        };
        let Some((warning, critical)) = limits.split_once(':') else {
            warn!(pair, "ignoring malformed threshold override");
            continue;
        };
        match (warning.parse(), critical.parse()) {
            (Ok(warning), Ok(critical)) => {
                overrides.insert(
                    metric.trim().to_string(),
                    ThresholdLimits::new(warning, critical),
                );
            }
            _ => warn!(pair, "ignoring unparsable threshold override"),
        }
    }
    overrides
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = MonitorConfig::default();
        assert_eq!(config.health_check_interval, Duration::from_secs(30));
        assert_eq!(config.metrics_interval, Duration::from_secs(60));
        assert_eq!(config.queue_interval, Duration::from_secs(1));
        assert_eq!(config.max_metric_history, 1000);
        assert_eq!(config.bind_addr.port(), 8080);
        assert!(!config.dev_mode);
    }

    #[test]
    fn builder_setters() {
        let config = MonitorConfig::default()
            .with_health_check_interval(Duration::from_secs(5))
            .with_metrics_interval(Duration::from_secs(10))
            .with_threshold("custom.metric", ThresholdLimits::new(10.0, 20.0))
            .with_dev_mode(true);

        assert_eq!(config.health_check_interval, Duration::from_secs(5));
        assert!(config.dev_mode);
        assert!(config.threshold_overrides.contains_key("custom.metric"));
    }

    #[test]
    fn parse_thresholds_accepts_valid_pairs() {
        let parsed = parse_thresholds("system.cpu.usage=75:90, db.query_time_ms=400:1500");
        assert_eq!(parsed.len(), 2);
        let cpu = parsed["system.cpu.usage"];
        assert!((cpu.warning - 75.0).abs() < f64::EPSILON);
        assert!((cpu.critical - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn parse_thresholds_skips_malformed_pairs() {
        let parsed = parse_thresholds("broken,also=bad,ok.metric=1:2");
        assert_eq!(parsed.len(), 1);
        assert!(parsed.contains_key("ok.metric"));
    }
}
