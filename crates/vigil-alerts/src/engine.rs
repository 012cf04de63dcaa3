//! The alerting engine: creation gateway, rule evaluation, thresholds.
//!
//! This module provides the [`AlertEngine`], the disciplined entry point for
//! every alert in the system. Rule evaluation, inline threshold checks,
//! health-check failures, and error escalation all create alerts here; the
//! engine stores them (bounded), logs them, and hands them to the
//! notification dispatcher through the [`AlertNotifier`] seam.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use vigil_logs::{LogEntry, LogLevel, LogStore};
use vigil_metrics::{MetricName, MetricStore, now_timestamp};

use crate::error::{AlertError, Result};
use crate::thresholds::{ThresholdLimits, default_thresholds};
use crate::traits::{AlertNotifier, AlertSink, AlertStatusView, HealthStatusSource};
use crate::types::{
    Alert, AlertAction, AlertRule, AlertSeverity, AlertStatistics, EscalationRule, NewAlert,
    ObservedValue,
};

/// Configuration for the alert engine.
#[derive(Debug, Clone)]
pub struct AlertEngineConfig {
    /// Maximum number of alerts to keep.
    pub max_alerts: usize,
}

impl Default for AlertEngineConfig {
    fn default() -> Self {
        Self { max_alerts: 10_000 }
    }
}

/// The result of one rule-evaluation pass.
#[derive(Debug, Clone, Default)]
pub struct RuleEvaluation {
    /// Number of rules evaluated.
    pub rules_evaluated: usize,
    /// Number of rules skipped because a condition errored.
    pub rules_errored: usize,
    /// IDs of the alerts created by triggered rules.
    pub triggered: Vec<String>,
}

/// Filter for querying stored alerts.
#[derive(Debug, Clone, Default)]
pub struct AlertFilter {
    /// Match only alerts with this resolution state.
    pub resolved: Option<bool>,
    /// Match only alerts with this severity.
    pub severity: Option<AlertSeverity>,
}

/// The alerting engine.
///
/// Owns the rule table, the bounded alert store, the escalation rule table,
/// and the built-in threshold table. Cloning shares all state.
pub struct AlertEngine {
    config: AlertEngineConfig,
    metrics: MetricStore,
    rules: Arc<RwLock<HashMap<String, AlertRule>>>,
    alerts: Arc<RwLock<HashMap<String, Alert>>>,
    escalations: Arc<RwLock<HashMap<String, EscalationRule>>>,
    thresholds: Arc<RwLock<HashMap<String, ThresholdLimits>>>,
    notifier: Arc<RwLock<Option<Arc<dyn AlertNotifier>>>>,
    health: Arc<RwLock<Option<Arc<dyn HealthStatusSource>>>>,
    logs: Arc<RwLock<Option<LogStore>>>,
}

impl std::fmt::Debug for AlertEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertEngine")
            .field("config", &self.config)
            .field("metrics", &self.metrics)
            .field("rules", &self.rules)
            .field("alerts", &self.alerts)
            .field("escalations", &self.escalations)
            .field("thresholds", &self.thresholds)
            .field("notifier", &self.notifier.read().is_some())
            .field("health", &self.health.read().is_some())
            .field("logs", &self.logs)
            .finish()
    }
}

impl AlertEngine {
    /// Creates a new engine with default configuration.
    #[must_use]
    pub fn new(metrics: MetricStore) -> Self {
        Self::with_config(AlertEngineConfig::default(), metrics)
    }

    /// Creates a new engine with custom configuration.
    #[must_use]
    pub fn with_config(config: AlertEngineConfig, metrics: MetricStore) -> Self {
        Self {
            config,
            metrics,
            rules: Arc::new(RwLock::new(HashMap::new())),
            alerts: Arc::new(RwLock::new(HashMap::new())),
            escalations: Arc::new(RwLock::new(HashMap::new())),
            thresholds: Arc::new(RwLock::new(default_thresholds())),
            notifier: Arc::new(RwLock::new(None)),
            health: Arc::new(RwLock::new(None)),
            logs: Arc::new(RwLock::new(None)),
        }
    }

    /// Connects the notification dispatcher.
    pub fn set_notifier(&self, notifier: Arc<dyn AlertNotifier>) {
        *self.notifier.write() = Some(notifier);
    }

    /// Connects the health status source used by `health.*` conditions.
    pub fn set_health_source(&self, source: Arc<dyn HealthStatusSource>) {
        *self.health.write() = Some(source);
    }

    /// Connects the structured log side-channel.
    pub fn set_log_store(&self, logs: LogStore) {
        *self.logs.write() = Some(logs);
    }

    // ============ Threshold Management ============

    /// Overrides (or adds) the threshold limits for a metric.
    pub fn set_threshold(&self, metric: impl Into<String>, limits: ThresholdLimits) {
        let mut thresholds = self.thresholds.write();
        thresholds.insert(metric.into(), limits);
    }

    /// Returns the threshold limits for a metric, if configured.
    #[must_use]
    pub fn threshold(&self, metric: &str) -> Option<ThresholdLimits> {
        let thresholds = self.thresholds.read();
        thresholds.get(metric).copied()
    }

    /// Evaluates the built-in threshold table for a freshly recorded sample.
    ///
    /// Called inline on every metric recording. A value at or above the
    /// critical limit raises a critical alert; at or above the warning limit,
    /// a warning alert. Below both, nothing happens.
    pub fn check_thresholds(&self, metric: &str, value: f64) -> Option<Alert> {
        let limits = self.threshold(metric)?;

        let (severity, limit) = if value >= limits.critical {
            (AlertSeverity::Critical, limits.critical)
        } else if value >= limits.warning {
            (AlertSeverity::Warning, limits.warning)
        } else {
            return None;
        };

        let alert = self.raise(
            NewAlert::new(
                "threshold",
                severity,
                format!("{metric} exceeded {severity} threshold"),
                format!("{metric} = {value}, threshold is {limit}"),
                "metrics",
            )
            .meta("metric", metric)
            .meta("value", value.to_string())
            .meta("threshold", limit.to_string()),
        );
        Some(alert)
    }

    // ============ Rule Management ============

    /// Adds a new alert rule.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::InvalidRule` if a rule with the same ID exists.
    pub fn add_rule(&self, rule: AlertRule) -> Result<()> {
        let mut rules = self.rules.write();

        if rules.contains_key(&rule.id) {
            return Err(AlertError::InvalidRule {
                reason: format!("rule with ID '{}' already exists", rule.id),
            });
        }

        info!(rule_id = %rule.id, rule_name = %rule.name, "added alert rule");
        rules.insert(rule.id.clone(), rule);

        Ok(())
    }

    /// Removes a rule by ID.
    ///
    /// Returns `true` if the rule was removed.
    pub fn remove_rule(&self, rule_id: &str) -> bool {
        let mut rules = self.rules.write();
        let removed = rules.remove(rule_id).is_some();

        if removed {
            info!(rule_id = %rule_id, "removed alert rule");
        }

        removed
    }

    /// Gets a rule by ID.
    #[must_use]
    pub fn get_rule(&self, rule_id: &str) -> Option<AlertRule> {
        let rules = self.rules.read();
        rules.get(rule_id).cloned()
    }

    /// Returns all rules.
    #[must_use]
    pub fn list_rules(&self) -> Vec<AlertRule> {
        let rules = self.rules.read();
        rules.values().cloned().collect()
    }

    /// Returns the number of rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        let rules = self.rules.read();
        rules.len()
    }

    // ============ Escalation Rules ============

    /// Registers an escalation rule.
    pub fn add_escalation(&self, rule: EscalationRule) {
        let mut escalations = self.escalations.write();
        info!(escalation_id = %rule.id, levels = rule.levels.len(), "added escalation rule");
        escalations.insert(rule.id.clone(), rule);
    }

    /// Gets an escalation rule by ID.
    #[must_use]
    pub fn get_escalation(&self, rule_id: &str) -> Option<EscalationRule> {
        let escalations = self.escalations.read();
        escalations.get(rule_id).cloned()
    }

    // ============ Evaluation ============

    /// Evaluates all enabled rules against current metric and health state.
    ///
    /// A condition error skips the owning rule without affecting others. The
    /// cooldown window is enforced with a check-and-set under the rule-table
    /// write lock, so a rule never triggers twice within `cooldown_ms` even
    /// under concurrent evaluation.
    pub fn check_rules(&self) -> RuleEvaluation {
        let mut result = RuleEvaluation::default();
        let snapshot = self.rules.read().clone();

        for rule in snapshot.values() {
            if !rule.enabled {
                continue;
            }
            if rule.in_cooldown(now_timestamp()) {
                continue;
            }

            result.rules_evaluated += 1;

            match self.evaluate_rule(rule) {
                Ok(Some(severity)) => {
                    if let Some(alert_id) = self.trigger_rule(rule, severity) {
                        result.triggered.push(alert_id);
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    result.rules_errored += 1;
                    warn!(
                        rule_id = %rule.id,
                        rule_name = %rule.name,
                        error = %e,
                        "skipping rule, condition could not be evaluated"
                    );
                }
            }
        }

        debug!(
            rules_evaluated = result.rules_evaluated,
            rules_errored = result.rules_errored,
            triggered = result.triggered.len(),
            "rule evaluation complete"
        );

        result
    }

    /// Evaluates one rule's conditions; `Some(severity)` when it should
    /// trigger, with the severity being the maximum rank across matches.
    fn evaluate_rule(&self, rule: &AlertRule) -> Result<Option<AlertSeverity>> {
        let mut matched: Option<AlertSeverity> = None;

        for condition in &rule.conditions {
            let observed = self.resolve_target(&condition.metric)?;
            if condition.evaluate(&observed)? {
                matched = Some(match matched {
                    Some(current) if current.rank() >= condition.severity.rank() => current,
                    _ => condition.severity,
                });
            }
        }

        Ok(matched)
    }

    /// Resolves a condition target to its observed value.
    ///
    /// Names starting with `health.` resolve against the health registry;
    /// everything else resolves against the metric store's latest value.
    fn resolve_target(&self, metric: &str) -> Result<ObservedValue> {
        if let Some(dependency) = metric.strip_prefix("health.") {
            let health = self.health.read();
            let source = health.as_ref().ok_or_else(|| AlertError::ConditionError {
                reason: "no health source configured".to_string(),
            })?;
            return source
                .status_text(dependency)
                .map(ObservedValue::Text)
                .ok_or_else(|| AlertError::ConditionError {
                    reason: format!("dependency '{dependency}' not registered"),
                });
        }

        let name = MetricName::new(metric).map_err(|e| AlertError::ConditionError {
            reason: e.to_string(),
        })?;
        self.metrics
            .latest(&name)
            .map(ObservedValue::Number)
            .ok_or_else(|| AlertError::ConditionError {
                reason: format!("metric '{metric}' not found"),
            })
    }

    /// Atomically claims a trigger slot for the rule and runs its actions.
    ///
    /// Returns the created alert's ID, or `None` if another evaluator
    /// claimed the cooldown window first.
    fn trigger_rule(&self, rule: &AlertRule, severity: AlertSeverity) -> Option<String> {
        {
            let mut rules = self.rules.write();
            let live = rules.get_mut(&rule.id)?;
            let now = now_timestamp();
            if live.in_cooldown(now) {
                return None;
            }
            live.last_triggered_at = Some(now);
            live.trigger_count += 1;
        }

        let alert = self.create_alert(
            NewAlert::new(
                "rule",
                severity,
                rule.name.clone(),
                format!("alert rule '{}' triggered", rule.name),
                "alert-engine",
            )
            .meta("rule_id", rule.id.clone()),
        );

        info!(
            rule_id = %rule.id,
            rule_name = %rule.name,
            alert_id = %alert.id,
            severity = %severity,
            "alert rule triggered"
        );

        for action in &rule.actions {
            self.run_action(&alert, action);
        }

        Some(alert.id)
    }

    fn run_action(&self, alert: &Alert, action: &AlertAction) {
        let notifier = self.notifier.read().clone();
        match action {
            AlertAction::Notification { channels } => {
                if let Some(notifier) = notifier {
                    notifier.enqueue(alert.clone(), Some(channels.clone()), Duration::ZERO);
                }
            }
            AlertAction::Webhook => {
                if let Some(notifier) = notifier {
                    notifier.enqueue(
                        alert.clone(),
                        Some(vec!["webhook".to_string()]),
                        Duration::ZERO,
                    );
                }
            }
            AlertAction::Automation { hook } => {
                info!(alert_id = %alert.id, hook = %hook, "automation hook requested");
            }
            AlertAction::Escalation { rule_id } => {
                if let Some(rule) = self.get_escalation(rule_id) {
                    if let Some(notifier) = notifier {
                        notifier.escalate(alert.clone(), &rule);
                    }
                } else {
                    warn!(
                        alert_id = %alert.id,
                        escalation_id = %rule_id,
                        "escalation rule not found"
                    );
                }
            }
        }
    }

    // ============ Alert Store ============

    /// Creates and stores an alert without routing it anywhere.
    ///
    /// Rule actions decide their own routing; everything else should go
    /// through [`AlertSink::raise`] which adds default severity routing.
    pub fn create_alert(&self, new: NewAlert) -> Alert {
        let alert = Alert {
            id: Uuid::new_v4().to_string(),
            kind: new.kind,
            severity: new.severity,
            title: new.title,
            message: new.message,
            source: new.source,
            timestamp: now_timestamp(),
            resolved: false,
            resolved_at: None,
            metadata: new.metadata,
        };

        {
            let mut alerts = self.alerts.write();
            alerts.insert(alert.id.clone(), alert.clone());
            Self::evict_overflow(&mut alerts, self.config.max_alerts);
        }

        info!(
            alert_id = %alert.id,
            kind = %alert.kind,
            severity = %alert.severity,
            source = %alert.source,
            title = %alert.title,
            "alert created"
        );

        if let Some(logs) = self.logs.read().as_ref() {
            let level = match alert.severity {
                AlertSeverity::Critical | AlertSeverity::High => LogLevel::Error,
                AlertSeverity::Medium | AlertSeverity::Warning => LogLevel::Warn,
                AlertSeverity::Low => LogLevel::Info,
            };
            logs.append(
                LogEntry::now(level, alert.source.clone(), alert.title.clone())
                    .meta("alert_id", serde_json::json!(alert.id))
                    .meta("severity", serde_json::json!(alert.severity.as_str())),
            );
        }

        alert
    }

    /// Drops alerts beyond the cap: resolved first (oldest resolution),
    /// then oldest by creation time.
    fn evict_overflow(alerts: &mut HashMap<String, Alert>, max: usize) {
        if alerts.len() <= max {
            return;
        }

        let mut candidates: Vec<(String, bool, i64)> = alerts
            .values()
            .map(|a| {
                (
                    a.id.clone(),
                    a.resolved,
                    a.resolved_at.unwrap_or(a.timestamp),
                )
            })
            .collect();
        // Resolved alerts sort ahead of unresolved ones; oldest first within each group
        candidates.sort_by_key(|(_, resolved, at)| (!resolved, *at));

        let excess = alerts.len() - max;
        for (id, _, _) in candidates.into_iter().take(excess) {
            alerts.remove(&id);
        }
    }

    /// Resolves an alert.
    ///
    /// Returns `true` if this call performed the transition, `false` if the
    /// alert was already resolved (idempotent).
    ///
    /// # Errors
    ///
    /// Returns `AlertError::AlertNotFound` for an unknown ID.
    pub fn resolve(&self, alert_id: &str) -> Result<bool> {
        let mut alerts = self.alerts.write();
        let alert = alerts
            .get_mut(alert_id)
            .ok_or_else(|| AlertError::AlertNotFound {
                id: alert_id.to_string(),
            })?;

        let transitioned = alert.resolve();
        if transitioned {
            info!(alert_id = %alert_id, "alert resolved");
        }
        Ok(transitioned)
    }

    /// Gets an alert by ID.
    #[must_use]
    pub fn get_alert(&self, alert_id: &str) -> Option<Alert> {
        let alerts = self.alerts.read();
        alerts.get(alert_id).cloned()
    }

    /// Returns alerts matching the filter, most-recent-first, capped at
    /// `limit`.
    #[must_use]
    pub fn list_alerts(&self, filter: &AlertFilter, limit: usize) -> Vec<Alert> {
        let alerts = self.alerts.read();
        let mut matching: Vec<Alert> = alerts
            .values()
            .filter(|a| filter.resolved.is_none_or(|r| a.resolved == r))
            .filter(|a| filter.severity.is_none_or(|s| a.severity == s))
            .cloned()
            .collect();

        matching.sort_by_key(|a| std::cmp::Reverse(a.timestamp));
        matching.truncate(limit);
        matching
    }

    /// Returns aggregate counts over the alert store.
    #[must_use]
    pub fn statistics(&self) -> AlertStatistics {
        let alerts = self.alerts.read();
        let mut stats = AlertStatistics {
            total: alerts.len(),
            ..Default::default()
        };

        for alert in alerts.values() {
            if alert.resolved {
                stats.resolved += 1;
            } else {
                stats.unresolved += 1;
            }
            *stats
                .by_severity
                .entry(alert.severity.as_str().to_string())
                .or_insert(0) += 1;
        }

        stats
    }

    /// Returns the number of stored alerts.
    #[must_use]
    pub fn alert_count(&self) -> usize {
        let alerts = self.alerts.read();
        alerts.len()
    }

    /// Clears all alerts.
    pub fn clear_alerts(&self) {
        let mut alerts = self.alerts.write();
        alerts.clear();
    }
}

impl AlertSink for AlertEngine {
    fn raise(&self, new: NewAlert) -> Alert {
        let alert = self.create_alert(new);

        if let Some(notifier) = self.notifier.read().clone() {
            notifier.enqueue(alert.clone(), None, Duration::ZERO);
        }

        alert
    }
}

impl AlertStatusView for AlertEngine {
    fn is_resolved(&self, alert_id: &str) -> bool {
        let alerts = self.alerts.read();
        alerts.get(alert_id).is_some_and(|a| a.resolved)
    }
}

impl Clone for AlertEngine {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            metrics: self.metrics.clone(),
            rules: Arc::clone(&self.rules),
            alerts: Arc::clone(&self.alerts),
            escalations: Arc::clone(&self.escalations),
            thresholds: Arc::clone(&self.thresholds),
            notifier: Arc::clone(&self.notifier),
            health: Arc::clone(&self.health),
            logs: Arc::clone(&self.logs),
        }
    }
}
