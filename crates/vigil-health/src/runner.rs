//! Dependency registry and the periodic health-check runner.
//!
//! [`HealthRegistry`] owns the registered dependencies and the single live
//! [`HealthCheck`] record per dependency. [`HealthCheckRunner`] probes every
//! dependency with its configured timeout, overwrites the records, raises
//! alerts for failing probes, and records probe latency as a metric
//! side-channel.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use futures::future::join_all;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use vigil_alerts::{AlertSeverity, AlertSink, HealthStatusSource, NewAlert};
use vigil_metrics::{MetricName, MetricStore, now_timestamp};

use crate::error::{HealthError, Result};
use crate::probe::DependencyProbe;
use crate::types::{HealthCheck, HealthStatus, HealthSummary};

/// A dependency registered for periodic health checking.
pub struct ServiceDependency {
    /// The dependency name (unique).
    pub name: String,
    /// What kind of dependency this is (e.g., `database`, `http`, `cache`).
    pub kind: String,
    /// Per-probe timeout.
    pub timeout: Duration,
    /// Whether a failing probe raises a critical (rather than high) alert.
    pub critical: bool,
    /// The probe capability.
    pub probe: Arc<dyn DependencyProbe>,
}

impl ServiceDependency {
    /// Creates a new dependency with a 5 second timeout.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        kind: impl Into<String>,
        probe: Arc<dyn DependencyProbe>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            timeout: Duration::from_secs(5),
            critical: false,
            probe,
        }
    }

    /// Sets the probe timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Marks failing probes of this dependency as critical.
    #[must_use]
    pub const fn critical(mut self, critical: bool) -> Self {
        self.critical = critical;
        self
    }
}

impl std::fmt::Debug for ServiceDependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceDependency")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("timeout", &self.timeout)
            .field("critical", &self.critical)
            .finish_non_exhaustive()
    }
}

/// Registry of dependencies and their current health records.
///
/// Cloning shares the underlying state.
#[derive(Debug, Default)]
pub struct HealthRegistry {
    deps: Arc<RwLock<HashMap<String, Arc<ServiceDependency>>>>,
    checks: Arc<RwLock<HashMap<String, HealthCheck>>>,
}

impl HealthRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a dependency.
    ///
    /// # Errors
    ///
    /// Returns `HealthError::AlreadyRegistered` for a duplicate name.
    pub fn register(&self, dep: ServiceDependency) -> Result<()> {
        let mut deps = self.deps.write();
        if deps.contains_key(&dep.name) {
            return Err(HealthError::AlreadyRegistered { name: dep.name });
        }

        info!(dependency = %dep.name, kind = %dep.kind, "registered dependency");
        deps.insert(dep.name.clone(), Arc::new(dep));
        Ok(())
    }

    /// Removes a dependency and its current record.
    ///
    /// Returns `true` if the dependency existed.
    pub fn unregister(&self, name: &str) -> bool {
        let removed = self.deps.write().remove(name).is_some();
        if removed {
            self.checks.write().remove(name);
            info!(dependency = %name, "unregistered dependency");
        }
        removed
    }

    /// Returns the registered dependency names.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let deps = self.deps.read();
        deps.keys().cloned().collect()
    }

    /// Returns the number of registered dependencies.
    #[must_use]
    pub fn len(&self) -> usize {
        let deps = self.deps.read();
        deps.len()
    }

    /// Returns true if no dependencies are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the current record for a dependency.
    ///
    /// A registered but never-probed dependency yields an `unchecked` record.
    #[must_use]
    pub fn current(&self, name: &str) -> Option<HealthCheck> {
        let deps = self.deps.read();
        if !deps.contains_key(name) {
            return None;
        }
        drop(deps);

        let checks = self.checks.read();
        Some(checks.get(name).cloned().unwrap_or_else(|| HealthCheck {
            name: name.to_string(),
            status: HealthStatus::Unchecked,
            message: "not probed yet".to_string(),
            timestamp: 0,
            response_time_ms: 0,
            details: HashMap::new(),
        }))
    }

    /// Returns the current record for every registered dependency.
    #[must_use]
    pub fn all_checks(&self) -> Vec<HealthCheck> {
        let names = self.names();
        names
            .iter()
            .filter_map(|name| self.current(name))
            .collect()
    }

    /// Returns the worst status across all dependencies.
    ///
    /// An empty registry is `healthy`.
    #[must_use]
    pub fn overall(&self) -> HealthStatus {
        self.all_checks()
            .iter()
            .fold(HealthStatus::Healthy, |acc, c| acc.worst(c.status))
    }

    /// Returns aggregate counts over the current records.
    #[must_use]
    pub fn summary(&self) -> HealthSummary {
        let mut summary = HealthSummary::default();
        for check in self.all_checks() {
            summary.total += 1;
            match check.status {
                HealthStatus::Healthy => summary.healthy += 1,
                HealthStatus::Degraded => summary.degraded += 1,
                HealthStatus::Unhealthy => summary.unhealthy += 1,
                HealthStatus::Unchecked => summary.unchecked += 1,
            }
        }
        summary
    }

    fn dependency(&self, name: &str) -> Option<Arc<ServiceDependency>> {
        let deps = self.deps.read();
        deps.get(name).cloned()
    }

    fn store_check(&self, check: HealthCheck) {
        let mut checks = self.checks.write();
        checks.insert(check.name.clone(), check);
    }
}

impl Clone for HealthRegistry {
    fn clone(&self) -> Self {
        Self {
            deps: Arc::clone(&self.deps),
            checks: Arc::clone(&self.checks),
        }
    }
}

impl HealthStatusSource for HealthRegistry {
    fn status_text(&self, dependency: &str) -> Option<String> {
        self.current(dependency)
            .map(|c| c.status.as_str().to_string())
    }
}

/// Periodically probes every registered dependency.
///
/// Cloning shares the registry, alert sink, and running flag.
pub struct HealthCheckRunner {
    registry: HealthRegistry,
    alerts: Arc<dyn AlertSink>,
    metrics: MetricStore,
    running: Arc<AtomicBool>,
}

impl HealthCheckRunner {
    /// Creates a new runner over the given registry.
    #[must_use]
    pub fn new(registry: HealthRegistry, alerts: Arc<dyn AlertSink>, metrics: MetricStore) -> Self {
        Self {
            registry,
            alerts,
            metrics,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns the registry this runner probes.
    #[must_use]
    pub fn registry(&self) -> &HealthRegistry {
        &self.registry
    }

    /// Probes every registered dependency once.
    ///
    /// Failures are isolated per dependency; one failing probe never aborts
    /// the batch.
    pub async fn run_all(&self) {
        let names = self.registry.names();
        let probes = names.iter().map(|name| self.run_one(name));
        let results = join_all(probes).await;

        let failures = results
            .iter()
            .filter(|r| {
                r.as_ref()
                    .is_ok_and(|c| c.status == HealthStatus::Unhealthy)
            })
            .count();
        debug!(
            dependencies = names.len(),
            unhealthy = failures,
            "health check cycle complete"
        );
    }

    /// Probes a single dependency and overwrites its record.
    ///
    /// A probe that errors, panics, or exceeds its timeout is recorded as
    /// `unhealthy` and unconditionally raises an alert.
    ///
    /// # Errors
    ///
    /// Returns `HealthError::DependencyNotFound` for an unknown name.
    pub async fn run_one(&self, name: &str) -> Result<HealthCheck> {
        let dep =
            self.registry
                .dependency(name)
                .ok_or_else(|| HealthError::DependencyNotFound {
                    name: name.to_string(),
                })?;

        let started = Instant::now();
        let probe = Arc::clone(&dep.probe);
        let handle = tokio::spawn(async move { probe.probe().await });
        let abort = handle.abort_handle();

        let outcome = tokio::time::timeout(dep.timeout, handle).await;
        let response_time_ms = started.elapsed().as_millis() as u64;

        let (status, message, details) = match outcome {
            Ok(Ok(Ok(report))) => (report.status, report.message, report.details),
            Ok(Ok(Err(e))) => {
                let err = HealthError::ProbeFailure {
                    name: name.to_string(),
                    reason: e.to_string(),
                };
                (HealthStatus::Unhealthy, err.to_string(), HashMap::new())
            }
            Ok(Err(join_err)) => {
                let err = HealthError::ProbeFailure {
                    name: name.to_string(),
                    reason: if join_err.is_panic() {
                        "probe panicked".to_string()
                    } else {
                        join_err.to_string()
                    },
                };
                (HealthStatus::Unhealthy, err.to_string(), HashMap::new())
            }
            Err(_) => {
                // The probe task keeps running past its deadline; reap it.
                abort.abort();
                let err = HealthError::ProbeTimeout {
                    name: name.to_string(),
                    timeout_ms: dep.timeout.as_millis() as u64,
                };
                (HealthStatus::Unhealthy, err.to_string(), HashMap::new())
            }
        };

        let check = HealthCheck {
            name: name.to_string(),
            status,
            message,
            timestamp: now_timestamp(),
            response_time_ms,
            details,
        };

        self.registry.store_check(check.clone());
        self.record_latency(name, response_time_ms);

        if status == HealthStatus::Unhealthy {
            warn!(
                dependency = %name,
                response_time_ms,
                message = %check.message,
                "dependency unhealthy"
            );
            let severity = if dep.critical {
                AlertSeverity::Critical
            } else {
                AlertSeverity::High
            };
            self.alerts.raise(
                NewAlert::new(
                    "health-check",
                    severity,
                    format!("dependency {name} is unhealthy"),
                    check.message.clone(),
                    "health-check",
                )
                .meta("dependency", name)
                .meta("response_time_ms", response_time_ms.to_string()),
            );
        }

        Ok(check)
    }

    fn record_latency(&self, name: &str, response_time_ms: u64) {
        let Ok(metric) = MetricName::new(format!("health.{name}.response_time_ms")) else {
            return;
        };
        self.metrics
            .record(metric, response_time_ms as f64, "ms", HashMap::new());
    }

    /// Starts the periodic probe loop.
    ///
    /// Calling `start` while already running is a no-op (logged, not an
    /// error).
    pub fn start(&self, interval: Duration) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("health check runner already running");
            return;
        }

        info!(interval_ms = interval.as_millis() as u64, "health check runner started");

        let runner = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick fires immediately; skip it so start() returns
            // before any probe runs.
            ticker.tick().await;

            while runner.running.load(Ordering::SeqCst) {
                ticker.tick().await;
                if !runner.running.load(Ordering::SeqCst) {
                    break;
                }
                runner.run_all().await;
            }
        });
    }

    /// Stops the periodic probe loop. Idempotent.
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            info!("health check runner stopped");
        }
    }

    /// Returns true if the periodic loop is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Clone for HealthCheckRunner {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            alerts: Arc::clone(&self.alerts),
            metrics: self.metrics.clone(),
            running: Arc::clone(&self.running),
        }
    }
}

impl std::fmt::Debug for HealthCheckRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthCheckRunner")
            .field("registry", &self.registry)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::FnProbe;
    use crate::types::ProbeReport;
    use parking_lot::Mutex;
    use std::sync::atomic::AtomicUsize;
    use vigil_alerts::Alert;

    /// Alert sink that records raised alerts for assertions.
    #[derive(Default)]
    struct RecordingSink {
        raised: Mutex<Vec<NewAlert>>,
    }

    impl AlertSink for RecordingSink {
        fn raise(&self, alert: NewAlert) -> Alert {
            let severity = alert.severity;
            let stored = Alert {
                id: "test".to_string(),
                kind: alert.kind.clone(),
                severity,
                title: alert.title.clone(),
                message: alert.message.clone(),
                source: alert.source.clone(),
                timestamp: now_timestamp(),
                resolved: false,
                resolved_at: None,
                metadata: alert.metadata.clone(),
            };
            self.raised.lock().push(alert);
            stored
        }
    }

    fn healthy_probe() -> Arc<dyn DependencyProbe> {
        Arc::new(FnProbe::new(|| async { Ok(ProbeReport::healthy("ok")) }))
    }

    fn failing_probe() -> Arc<dyn DependencyProbe> {
        Arc::new(FnProbe::new(|| async {
            Err::<ProbeReport, _>("connection refused".into())
        }))
    }

    fn runner() -> (HealthCheckRunner, Arc<RecordingSink>, MetricStore) {
        let sink = Arc::new(RecordingSink::default());
        let metrics = MetricStore::default();
        let runner = HealthCheckRunner::new(HealthRegistry::new(), sink.clone(), metrics.clone());
        (runner, sink, metrics)
    }

    mod registry_tests {
        use super::*;

        #[test]
        fn register_and_lookup() {
            let registry = HealthRegistry::new();
            registry
                .register(ServiceDependency::new("db", "database", healthy_probe()))
                .unwrap();

            assert_eq!(registry.len(), 1);
            let check = registry.current("db").unwrap();
            assert_eq!(check.status, HealthStatus::Unchecked);
        }

        #[test]
        fn duplicate_registration_fails() {
            let registry = HealthRegistry::new();
            registry
                .register(ServiceDependency::new("db", "database", healthy_probe()))
                .unwrap();

            let result =
                registry.register(ServiceDependency::new("db", "database", healthy_probe()));
            assert!(matches!(
                result,
                Err(HealthError::AlreadyRegistered { .. })
            ));
        }

        #[test]
        fn unregister_removes_record() {
            let registry = HealthRegistry::new();
            registry
                .register(ServiceDependency::new("db", "database", healthy_probe()))
                .unwrap();

            assert!(registry.unregister("db"));
            assert!(!registry.unregister("db"));
            assert!(registry.current("db").is_none());
        }

        #[test]
        fn empty_registry_is_healthy_overall() {
            let registry = HealthRegistry::new();
            assert_eq!(registry.overall(), HealthStatus::Healthy);
        }

        #[test]
        fn unchecked_dependency_degrades_overall() {
            let registry = HealthRegistry::new();
            registry
                .register(ServiceDependency::new("db", "database", healthy_probe()))
                .unwrap();

            assert_eq!(registry.overall(), HealthStatus::Unchecked);
        }

        #[test]
        fn status_source_reports_current_status() {
            let registry = HealthRegistry::new();
            registry
                .register(ServiceDependency::new("db", "database", healthy_probe()))
                .unwrap();

            assert_eq!(registry.status_text("db"), Some("unchecked".to_string()));
            assert_eq!(registry.status_text("ghost"), None);
        }
    }

    mod probe_tests {
        use super::*;

        #[tokio::test]
        async fn healthy_probe_records_healthy() {
            let (runner, sink, _) = runner();
            runner
                .registry()
                .register(ServiceDependency::new("db", "database", healthy_probe()))
                .unwrap();

            let check = runner.run_one("db").await.unwrap();
            assert_eq!(check.status, HealthStatus::Healthy);
            assert!(sink.raised.lock().is_empty());
            assert_eq!(runner.registry().overall(), HealthStatus::Healthy);
        }

        #[tokio::test]
        async fn failing_probe_records_unhealthy_and_raises_alert() {
            let (runner, sink, _) = runner();
            runner
                .registry()
                .register(ServiceDependency::new("db", "database", failing_probe()))
                .unwrap();

            runner.run_all().await;

            let check = runner.registry().current("db").unwrap();
            assert_eq!(check.status, HealthStatus::Unhealthy);
            assert!(check.message.contains("connection refused"));

            let raised = sink.raised.lock();
            assert_eq!(raised.len(), 1);
            assert_eq!(raised[0].source, "health-check");
            assert_eq!(raised[0].severity, AlertSeverity::High);
        }

        #[tokio::test]
        async fn critical_dependency_raises_critical() {
            let (runner, sink, _) = runner();
            runner
                .registry()
                .register(
                    ServiceDependency::new("db", "database", failing_probe()).critical(true),
                )
                .unwrap();

            runner.run_one("db").await.unwrap();

            let raised = sink.raised.lock();
            assert_eq!(raised[0].severity, AlertSeverity::Critical);
        }

        #[tokio::test]
        async fn timed_out_probe_is_unhealthy() {
            let (runner, sink, _) = runner();
            let slow = Arc::new(FnProbe::new(|| async {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok(ProbeReport::healthy("too late"))
            }));
            runner
                .registry()
                .register(
                    ServiceDependency::new("api", "http", slow)
                        .timeout(Duration::from_millis(20)),
                )
                .unwrap();

            let check = runner.run_one("api").await.unwrap();
            assert_eq!(check.status, HealthStatus::Unhealthy);
            assert!(check.message.contains("timed out"));
            assert_eq!(sink.raised.lock().len(), 1);
        }

        #[tokio::test]
        async fn degraded_probe_does_not_alert() {
            let (runner, sink, _) = runner();
            let degraded = Arc::new(FnProbe::new(|| async {
                Ok(ProbeReport::degraded("replica lag"))
            }));
            runner
                .registry()
                .register(ServiceDependency::new("db", "database", degraded))
                .unwrap();

            let check = runner.run_one("db").await.unwrap();
            assert_eq!(check.status, HealthStatus::Degraded);
            assert!(sink.raised.lock().is_empty());
        }

        #[tokio::test]
        async fn each_cycle_overwrites_previous_record() {
            let (runner, _, _) = runner();
            let flips = Arc::new(AtomicUsize::new(0));
            let flips_probe = Arc::clone(&flips);
            let probe = Arc::new(FnProbe::new(move || {
                let n = flips_probe.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Err::<ProbeReport, _>("down".into())
                    } else {
                        Ok(ProbeReport::healthy("back up"))
                    }
                }
            }));
            runner
                .registry()
                .register(ServiceDependency::new("db", "database", probe))
                .unwrap();

            runner.run_one("db").await.unwrap();
            assert_eq!(
                runner.registry().current("db").unwrap().status,
                HealthStatus::Unhealthy
            );

            runner.run_one("db").await.unwrap();
            assert_eq!(
                runner.registry().current("db").unwrap().status,
                HealthStatus::Healthy
            );
        }

        #[tokio::test]
        async fn run_one_unknown_dependency_fails() {
            let (runner, _, _) = runner();
            let result = runner.run_one("ghost").await;
            assert!(matches!(
                result,
                Err(HealthError::DependencyNotFound { .. })
            ));
        }

        #[tokio::test]
        async fn probe_latency_recorded_as_metric() {
            let (runner, _, metrics) = runner();
            runner
                .registry()
                .register(ServiceDependency::new("db", "database", healthy_probe()))
                .unwrap();

            runner.run_one("db").await.unwrap();

            let name = MetricName::new("health.db.response_time_ms").unwrap();
            assert!(metrics.latest(&name).is_some());
        }

        #[tokio::test]
        async fn failing_probe_does_not_abort_the_batch() {
            let (runner, _, _) = runner();
            runner
                .registry()
                .register(ServiceDependency::new("db", "database", failing_probe()))
                .unwrap();
            runner
                .registry()
                .register(ServiceDependency::new("cache", "cache", healthy_probe()))
                .unwrap();

            runner.run_all().await;

            let summary = runner.registry().summary();
            assert_eq!(summary.total, 2);
            assert_eq!(summary.healthy, 1);
            assert_eq!(summary.unhealthy, 1);
        }
    }

    mod lifecycle_tests {
        use super::*;

        #[tokio::test]
        async fn start_probes_periodically_until_stopped() {
            let (runner, _, _) = runner();
            let count = Arc::new(AtomicUsize::new(0));
            let count_probe = Arc::clone(&count);
            let probe = Arc::new(FnProbe::new(move || {
                count_probe.fetch_add(1, Ordering::SeqCst);
                async { Ok(ProbeReport::healthy("ok")) }
            }));
            runner
                .registry()
                .register(ServiceDependency::new("db", "database", probe))
                .unwrap();

            runner.start(Duration::from_millis(20));
            assert!(runner.is_running());

            tokio::time::sleep(Duration::from_millis(110)).await;
            runner.stop();
            assert!(!runner.is_running());

            let probed = count.load(Ordering::SeqCst);
            assert!(probed >= 2, "expected at least 2 probes, got {probed}");

            // No further probes after stop
            tokio::time::sleep(Duration::from_millis(60)).await;
            assert!(count.load(Ordering::SeqCst) <= probed + 1);
        }

        #[tokio::test]
        async fn start_twice_is_a_noop() {
            let (runner, _, _) = runner();
            runner.start(Duration::from_millis(50));
            runner.start(Duration::from_millis(50));
            assert!(runner.is_running());
            runner.stop();
        }

        #[tokio::test]
        async fn stop_twice_is_a_noop() {
            let (runner, _, _) = runner();
            runner.start(Duration::from_millis(50));
            runner.stop();
            runner.stop();
            assert!(!runner.is_running());
        }
    }
}
