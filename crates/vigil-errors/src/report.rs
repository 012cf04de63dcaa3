//! Deduplicated error reports.
//!
//! Recurring exceptions are tracked as one [`ErrorReport`] per stable
//! identity — a hash of `(service, operation, kind, message)` — with an
//! occurrence counter instead of one record per instance. Errors classified
//! critical additionally raise an immediate critical alert through the
//! shared gateway, regardless of occurrence count.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use vigil_alerts::{AlertSeverity, AlertSink, NewAlert};
use vigil_metrics::now_timestamp;

use crate::error::{ErrorStoreError, Result};

/// Services whose errors are always critical.
const CRITICAL_SERVICES: &[&str] = &["database", "auth", "payment"];

/// Operations whose errors are always critical.
const CRITICAL_OPERATIONS: &[&str] = &["startup", "shutdown", "security"];

/// Well-known message fragments that mark an error critical.
const CRITICAL_SIGNATURES: &[&str] = &["connection refused", "out of memory"];

/// Where an error happened.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorContext {
    /// The service the error occurred in.
    pub service: String,
    /// The operation that failed.
    pub operation: String,
    /// Additional context.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl ErrorContext {
    /// Creates a new context.
    #[must_use]
    pub fn new(service: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            operation: operation.into(),
            metadata: HashMap::new(),
        }
    }

    /// Attaches a metadata entry and returns self for chaining.
    #[must_use]
    pub fn meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A deduplicated record of a recurring error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Stable identity: hash of `(service, operation, kind, message)`.
    pub id: String,
    /// The error kind (e.g., `ConnectionError`, `ValidationError`).
    pub kind: String,
    /// The error message.
    pub message: String,
    /// Where the error happened.
    pub context: ErrorContext,
    /// When the error was first seen (epoch millis).
    pub timestamp: i64,
    /// How many times this error has occurred.
    pub occurrences: u64,
    /// When the error was last seen (epoch millis).
    pub last_occurrence: i64,
    /// Whether the report has been resolved.
    pub resolved: bool,
}

/// Filter for querying stored reports.
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    /// Match only reports from this service.
    pub service: Option<String>,
    /// Match only reports with this resolution state.
    pub resolved: Option<bool>,
}

/// Configuration for the error-report store.
#[derive(Debug, Clone)]
pub struct ErrorReportStoreConfig {
    /// Maximum number of reports to keep.
    pub max_reports: usize,
}

impl Default for ErrorReportStoreConfig {
    fn default() -> Self {
        Self { max_reports: 5000 }
    }
}

/// Deduplicating store of error reports.
///
/// Cloning shares the underlying state.
pub struct ErrorReportStore {
    config: ErrorReportStoreConfig,
    reports: Arc<RwLock<HashMap<String, ErrorReport>>>,
    alerts: Arc<RwLock<Option<Arc<dyn AlertSink>>>>,
}

impl std::fmt::Debug for ErrorReportStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorReportStore")
            .field("config", &self.config)
            .field("reports", &self.reports)
            .field("alerts", &self.alerts.read().is_some())
            .finish()
    }
}

impl ErrorReportStore {
    /// Creates a new store with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ErrorReportStoreConfig::default())
    }

    /// Creates a new store with custom configuration.
    #[must_use]
    pub fn with_config(config: ErrorReportStoreConfig) -> Self {
        Self {
            config,
            reports: Arc::new(RwLock::new(HashMap::new())),
            alerts: Arc::new(RwLock::new(None)),
        }
    }

    /// Connects the alert gateway used for critical errors.
    pub fn set_alert_sink(&self, alerts: Arc<dyn AlertSink>) {
        *self.alerts.write() = Some(alerts);
    }

    /// Computes the stable report identity.
    #[must_use]
    pub fn report_id(service: &str, operation: &str, kind: &str, message: &str) -> String {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        service.hash(&mut hasher);
        operation.hash(&mut hasher);
        kind.hash(&mut hasher);
        message.hash(&mut hasher);
        format!("{:016x}", hasher.finish())
    }

    /// Records an error occurrence.
    ///
    /// Identical `(service, operation, kind, message)` tuples collapse into
    /// one report whose occurrence counter grows; the first occurrence
    /// creates the report. Critical errors raise an immediate critical alert
    /// on every occurrence.
    pub fn handle(
        &self,
        kind: impl Into<String>,
        message: impl Into<String>,
        context: ErrorContext,
    ) -> ErrorReport {
        let kind = kind.into();
        let message = message.into();
        let id = Self::report_id(&context.service, &context.operation, &kind, &message);
        let now = now_timestamp();

        let report = {
            let mut reports = self.reports.write();
            let report = reports
                .entry(id.clone())
                .and_modify(|r| {
                    r.occurrences += 1;
                    r.last_occurrence = now;
                })
                .or_insert_with(|| ErrorReport {
                    id: id.clone(),
                    kind: kind.clone(),
                    message: message.clone(),
                    context: context.clone(),
                    timestamp: now,
                    occurrences: 1,
                    last_occurrence: now,
                    resolved: false,
                })
                .clone();
            Self::evict_overflow(&mut reports, self.config.max_reports);
            report
        };

        error!(
            report_id = %report.id,
            service = %context.service,
            operation = %context.operation,
            kind = %kind,
            occurrences = report.occurrences,
            message = %message,
            "error reported"
        );

        if Self::is_critical(&context, &message) {
            let alerts = self.alerts.read().clone();
            if let Some(alerts) = alerts {
                alerts.raise(
                    NewAlert::new(
                        "error-report",
                        AlertSeverity::Critical,
                        format!("critical error in {}/{}", context.service, context.operation),
                        message.clone(),
                        "error-handler",
                    )
                    .meta("report_id", report.id.clone())
                    .meta("kind", kind)
                    .meta("occurrences", report.occurrences.to_string()),
                );
            }
        }

        report
    }

    /// Classifies an error as critical.
    #[must_use]
    pub fn is_critical(context: &ErrorContext, message: &str) -> bool {
        if CRITICAL_SERVICES.contains(&context.service.as_str()) {
            return true;
        }
        if CRITICAL_OPERATIONS.contains(&context.operation.as_str()) {
            return true;
        }
        let lowered = message.to_lowercase();
        CRITICAL_SIGNATURES.iter().any(|sig| lowered.contains(sig))
    }

    /// Drops reports beyond the cap: resolved first, then oldest last
    /// occurrence.
    fn evict_overflow(reports: &mut HashMap<String, ErrorReport>, max: usize) {
        if reports.len() <= max {
            return;
        }

        let mut candidates: Vec<(String, bool, i64)> = reports
            .values()
            .map(|r| (r.id.clone(), r.resolved, r.last_occurrence))
            .collect();
        candidates.sort_by_key(|(_, resolved, at)| (!resolved, *at));

        let excess = reports.len() - max;
        for (id, _, _) in candidates.into_iter().take(excess) {
            reports.remove(&id);
        }
    }

    /// Resolves a report.
    ///
    /// Returns `true` if this call performed the transition, `false` if the
    /// report was already resolved (idempotent).
    ///
    /// # Errors
    ///
    /// Returns `ErrorStoreError::ReportNotFound` for an unknown ID.
    pub fn resolve(&self, id: &str) -> Result<bool> {
        let mut reports = self.reports.write();
        let report = reports
            .get_mut(id)
            .ok_or_else(|| ErrorStoreError::ReportNotFound { id: id.to_string() })?;

        if report.resolved {
            return Ok(false);
        }
        report.resolved = true;
        info!(report_id = %id, "error report resolved");
        Ok(true)
    }

    /// Gets a report by ID.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<ErrorReport> {
        let reports = self.reports.read();
        reports.get(id).cloned()
    }

    /// Returns reports matching the filter, most-recently-seen first, capped
    /// at `limit`.
    #[must_use]
    pub fn list(&self, filter: &ReportFilter, limit: usize) -> Vec<ErrorReport> {
        let reports = self.reports.read();
        let mut matching: Vec<ErrorReport> = reports
            .values()
            .filter(|r| {
                filter
                    .service
                    .as_ref()
                    .is_none_or(|s| &r.context.service == s)
            })
            .filter(|r| filter.resolved.is_none_or(|res| r.resolved == res))
            .cloned()
            .collect();

        matching.sort_by_key(|r| std::cmp::Reverse(r.last_occurrence));
        matching.truncate(limit);
        matching
    }

    /// Returns the number of stored reports.
    #[must_use]
    pub fn len(&self) -> usize {
        let reports = self.reports.read();
        reports.len()
    }

    /// Returns true if the store has no reports.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ErrorReportStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for ErrorReportStore {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            reports: Arc::clone(&self.reports),
            alerts: Arc::clone(&self.alerts),
        }
    }
}
