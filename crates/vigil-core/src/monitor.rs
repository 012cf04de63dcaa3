//! The monitor: one explicitly-constructed object owning the whole core.
//!
//! [`Monitor`] builds every store and engine, connects the capability seams
//! between them, and owns the periodic tasks (health probing, metric
//! collection, rule evaluation, queue draining). The process entry point
//! constructs one and passes clones to whoever needs access; there is no
//! global instance.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use tracing::{info, warn};

use vigil_alerts::{AlertEngine, AlertEngineConfig, AlertSink, NewAlert};
use vigil_errors::{ErrorReportStore, ErrorReportStoreConfig};
use vigil_health::{HealthCheckRunner, HealthRegistry, ServiceDependency};
use vigil_logs::LogStore;
use vigil_metrics::{Metric, MetricCollector, MetricName, MetricStore};
use vigil_notify::{
    ChannelRegistry, EmailChannel, LogChannel, NotificationDispatcher, SlackChannel, SmsChannel,
    WebhookChannel, WebhookConfig,
};
use vigil_resilience::ResilienceExecutor;

use crate::config::MonitorConfig;

/// The assembled observability core.
///
/// Cloning shares every underlying store and task flag.
pub struct Monitor {
    config: MonitorConfig,
    metrics: MetricStore,
    logs: LogStore,
    engine: Arc<AlertEngine>,
    health_registry: HealthRegistry,
    health_runner: HealthCheckRunner,
    dispatcher: NotificationDispatcher,
    executor: ResilienceExecutor,
    errors: ErrorReportStore,
    collectors: Arc<RwLock<Vec<Arc<dyn MetricCollector>>>>,
    running: Arc<AtomicBool>,
}

impl Monitor {
    /// Builds and wires the full core from configuration.
    #[must_use]
    pub fn new(config: MonitorConfig) -> Self {
        let metrics = MetricStore::new(config.max_metric_history);
        let logs = LogStore::new(config.max_log_entries);

        let engine = Arc::new(AlertEngine::with_config(
            AlertEngineConfig {
                max_alerts: config.max_alerts,
            },
            metrics.clone(),
        ));
        engine.set_log_store(logs.clone());
        for (metric, limits) in &config.threshold_overrides {
            engine.set_threshold(metric.clone(), *limits);
        }

        let channels = ChannelRegistry::new();
        Self::register_default_channels(&channels, &config);

        let dispatcher = NotificationDispatcher::new(channels);
        dispatcher.set_status_view(engine.clone());
        engine.set_notifier(Arc::new(dispatcher.clone()));

        let health_registry = HealthRegistry::new();
        engine.set_health_source(Arc::new(health_registry.clone()));
        let health_runner =
            HealthCheckRunner::new(health_registry.clone(), engine.clone(), metrics.clone());

        let executor = ResilienceExecutor::new();
        executor.set_alert_sink(engine.clone());

        let errors = ErrorReportStore::with_config(ErrorReportStoreConfig {
            max_reports: config.max_error_reports,
        });
        errors.set_alert_sink(engine.clone());

        Self {
            config,
            metrics,
            logs,
            engine,
            health_registry,
            health_runner,
            dispatcher,
            executor,
            errors,
            collectors: Arc::new(RwLock::new(Vec::new())),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    fn register_default_channels(channels: &ChannelRegistry, config: &MonitorConfig) {
        channels.register(Arc::new(EmailChannel::new(
            "email",
            config.email_recipients.clone(),
            config.email_from.clone(),
        )));
        channels.register(Arc::new(SlackChannel::new(
            "slack",
            config.slack_webhook_url.clone(),
            config.slack_channel.clone(),
        )));
        match WebhookConfig::new("webhook", config.webhook_url.clone()) {
            Ok(webhook) => channels.register(Arc::new(WebhookChannel::new(webhook))),
            Err(e) => warn!(error = %e, "webhook channel not registered"),
        }
        if !config.sms_numbers.is_empty() {
            channels.register(Arc::new(SmsChannel::new("sms", config.sms_numbers.clone())));
        }
        channels.register(Arc::new(LogChannel::default()));
    }

    // ============ Accessors ============

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Returns the metric store.
    #[must_use]
    pub const fn metrics(&self) -> &MetricStore {
        &self.metrics
    }

    /// Returns the log store.
    #[must_use]
    pub const fn logs(&self) -> &LogStore {
        &self.logs
    }

    /// Returns the alert engine.
    #[must_use]
    pub fn engine(&self) -> Arc<AlertEngine> {
        self.engine.clone()
    }

    /// Returns the health registry.
    #[must_use]
    pub const fn health(&self) -> &HealthRegistry {
        &self.health_registry
    }

    /// Returns the health-check runner.
    #[must_use]
    pub const fn health_runner(&self) -> &HealthCheckRunner {
        &self.health_runner
    }

    /// Returns the notification dispatcher.
    #[must_use]
    pub const fn dispatcher(&self) -> &NotificationDispatcher {
        &self.dispatcher
    }

    /// Returns the resilience executor.
    #[must_use]
    pub const fn resilience(&self) -> &ResilienceExecutor {
        &self.executor
    }

    /// Returns the error-report store.
    #[must_use]
    pub const fn errors(&self) -> &ErrorReportStore {
        &self.errors
    }

    // ============ Recording ============

    /// Records a metric sample and runs inline threshold evaluation.
    ///
    /// This is the write path external code should use; recording straight
    /// into the store would skip the built-in threshold table.
    pub fn record_metric(
        &self,
        name: MetricName,
        value: f64,
        unit: impl Into<String>,
        tags: HashMap<String, String>,
    ) -> Metric {
        let metric = self.metrics.record(name, value, unit, tags);
        self.engine.check_thresholds(metric.name.as_str(), value);
        metric
    }

    /// Registers a dependency for periodic health checking.
    ///
    /// # Errors
    ///
    /// Returns an error for a duplicate dependency name.
    pub fn register_dependency(&self, dep: ServiceDependency) -> vigil_health::Result<()> {
        self.health_registry.register(dep)
    }

    /// Adds a metric collector sampled on the collection interval.
    pub fn add_collector(&self, collector: Arc<dyn MetricCollector>) {
        let mut collectors = self.collectors.write();
        info!(collector = collector.name(), "added metric collector");
        collectors.push(collector);
    }

    /// Runs every collector once, recording samples through the threshold
    /// path.
    pub fn collect_now(&self) {
        let collectors = self.collectors.read().clone();
        for collector in collectors {
            match collector.collect() {
                Ok(samples) => {
                    for sample in samples {
                        self.record_metric(sample.name, sample.value, sample.unit, sample.tags);
                    }
                }
                Err(e) => {
                    warn!(collector = collector.name(), error = %e, "metric collection failed");
                }
            }
        }
    }

    // ============ Lifecycle ============

    /// Starts every periodic task: health probing, queue draining, metric
    /// collection, and rule evaluation.
    ///
    /// Calling `start` while already running is a no-op (logged).
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("monitor already running");
            return;
        }

        info!("monitor starting");
        self.health_runner.start(self.config.health_check_interval);
        self.dispatcher.start(self.config.queue_interval);

        let monitor = self.clone();
        let interval = self.config.metrics_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            while monitor.running.load(Ordering::SeqCst) {
                ticker.tick().await;
                if !monitor.running.load(Ordering::SeqCst) {
                    break;
                }
                monitor.collect_now();
            }
        });

        let monitor = self.clone();
        let interval = self.config.rule_eval_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            while monitor.running.load(Ordering::SeqCst) {
                ticker.tick().await;
                if !monitor.running.load(Ordering::SeqCst) {
                    break;
                }
                monitor.engine.check_rules();
            }
        });
    }

    /// Stops every periodic task. Idempotent.
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            info!("monitor stopping");
        }
        self.health_runner.stop();
        self.dispatcher.stop();
    }

    /// Returns true if the monitor's periodic tasks are running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Installs the process-wide panic funnel into the error store.
    pub fn install_error_hooks(&self) {
        vigil_errors::install_panic_hook(self.errors.clone());
    }
}

impl AlertSink for Monitor {
    fn raise(&self, alert: NewAlert) -> vigil_alerts::Alert {
        self.engine.raise(alert)
    }
}

impl Clone for Monitor {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            metrics: self.metrics.clone(),
            logs: self.logs.clone(),
            engine: self.engine.clone(),
            health_registry: self.health_registry.clone(),
            health_runner: self.health_runner.clone(),
            dispatcher: self.dispatcher.clone(),
            executor: self.executor.clone(),
            errors: self.errors.clone(),
            collectors: Arc::clone(&self.collectors),
            running: Arc::clone(&self.running),
        }
    }
}

impl std::fmt::Debug for Monitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Monitor")
            .field("running", &self.is_running())
            .field("dependencies", &self.health_registry.len())
            .field("queue_len", &self.dispatcher.queue_len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use vigil_alerts::{AlertFilter, AlertSeverity};
    use vigil_health::{FnProbe, HealthStatus, ProbeReport};
    use vigil_metrics::RuntimeMetricsCollector;

    fn name(s: &str) -> MetricName {
        MetricName::new(s).unwrap()
    }

    fn monitor() -> Monitor {
        Monitor::new(MonitorConfig::default())
    }

    #[test]
    fn record_metric_runs_threshold_evaluation() {
        let m = monitor();

        m.record_metric(name("system.memory.usage"), 96.0, "percent", HashMap::new());

        let alerts = m.engine().list_alerts(&AlertFilter::default(), 10);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, AlertSeverity::Critical);
        assert!(alerts[0].title.contains("system.memory.usage"));

        // Back under the threshold: no new alert
        m.record_metric(name("system.memory.usage"), 50.0, "percent", HashMap::new());
        assert_eq!(m.engine().alert_count(), 1);
    }

    #[test]
    fn threshold_overrides_from_config_apply() {
        let config = MonitorConfig::default()
            .with_threshold("custom.metric", vigil_alerts::ThresholdLimits::new(5.0, 10.0));
        let m = Monitor::new(config);

        m.record_metric(name("custom.metric"), 12.0, "", HashMap::new());
        assert_eq!(m.engine().alert_count(), 1);
    }

    #[tokio::test]
    async fn health_failure_routes_into_alert_store() {
        let m = monitor();
        m.register_dependency(ServiceDependency::new(
            "db",
            "database",
            Arc::new(FnProbe::new(|| async {
                Err::<ProbeReport, _>("connection refused".into())
            })),
        ))
        .unwrap();

        m.health_runner().run_all().await;

        assert_eq!(
            m.health().current("db").unwrap().status,
            HealthStatus::Unhealthy
        );

        let alerts = m.engine().list_alerts(&AlertFilter::default(), 10);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].source, "health-check");
        assert!(alerts[0].severity.rank() >= AlertSeverity::High.rank());
    }

    #[test]
    fn default_channels_are_registered() {
        let m = monitor();
        let mut names = m.dispatcher().registry().names();
        names.sort();
        assert!(names.contains(&"email".to_string()));
        assert!(names.contains(&"slack".to_string()));
        assert!(names.contains(&"webhook".to_string()));
        assert!(names.contains(&"log".to_string()));
    }

    #[test]
    fn critical_error_report_becomes_alert() {
        let m = monitor();
        m.errors().handle(
            "ConnectionError",
            "connection refused",
            vigil_errors::ErrorContext::new("database", "query"),
        );

        let alerts = m.engine().list_alerts(&AlertFilter::default(), 10);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, AlertSeverity::Critical);
    }

    #[test]
    fn collect_now_samples_registered_collectors() {
        let m = monitor();
        let collector = Arc::new(RuntimeMetricsCollector::new());
        collector.set_gauge(name("system.cpu.usage"), 42.0, "percent");
        m.add_collector(collector);

        m.collect_now();

        assert_eq!(m.metrics().latest(&name("system.cpu.usage")), Some(42.0));
    }

    #[test]
    fn collected_samples_hit_thresholds_too() {
        let m = monitor();
        let collector = Arc::new(RuntimeMetricsCollector::new());
        collector.set_gauge(name("system.cpu.usage"), 99.0, "percent");
        m.add_collector(collector);

        m.collect_now();

        assert_eq!(m.engine().alert_count(), 1);
    }

    #[tokio::test]
    async fn lifecycle_start_stop() {
        let config = MonitorConfig::default()
            .with_health_check_interval(Duration::from_millis(50))
            .with_metrics_interval(Duration::from_millis(50))
            .with_rule_eval_interval(Duration::from_millis(50));
        let m = Monitor::new(config);

        m.start();
        assert!(m.is_running());
        assert!(m.health_runner().is_running());
        assert!(m.dispatcher().is_running());

        // Second start is a no-op
        m.start();
        assert!(m.is_running());

        m.stop();
        assert!(!m.is_running());
        assert!(!m.health_runner().is_running());
        assert!(!m.dispatcher().is_running());

        // Stop twice is fine
        m.stop();
    }

    #[tokio::test]
    async fn end_to_end_threshold_alert_is_dispatched() {
        let config = MonitorConfig::default().with_metrics_interval(Duration::from_secs(3600));
        let m = Monitor::new(config);

        m.record_metric(name("system.memory.usage"), 97.0, "percent", HashMap::new());

        // One critical alert waiting in the queue for email/slack/webhook
        assert_eq!(m.dispatcher().queue_len(), 1);
        let outcome = m.dispatcher().process_due();
        assert_eq!(outcome.sent, 3);
    }
}
