//! Core types for the alerting system.
//!
//! This module provides the fundamental types used throughout the
//! vigil-alerts crate:
//! - [`AlertSeverity`]: The severity level of an alert
//! - [`ConditionOperator`]: Operators for comparing metric/health values
//! - [`AlertCondition`]: A condition that triggers an alert
//! - [`AlertAction`]: What happens when a rule triggers
//! - [`AlertRule`]: A declarative condition set plus actions, with a cooldown
//! - [`Alert`]: A discrete notification-worthy event
//! - [`EscalationRule`]: Levels for delayed re-notification

use std::collections::HashMap;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AlertError, Result};

/// The severity level of an alert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    /// Informational; never routed to notification channels by default.
    Low,
    /// Should be looked at during working hours.
    #[default]
    Medium,
    /// Same urgency as medium; kept distinct for threshold-breach alerts.
    Warning,
    /// Requires prompt attention.
    High,
    /// Requires immediate attention.
    Critical,
}

impl AlertSeverity {
    /// Returns the severity as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::Warning => "warning",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Returns the urgency rank of this severity (higher = more urgent).
    ///
    /// `medium` and `warning` deliberately share a rank; callers comparing
    /// severities must use this method rather than variant order.
    #[must_use]
    pub const fn rank(&self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium | Self::Warning => 2,
            Self::High => 3,
            Self::Critical => 4,
        }
    }

    /// Parses a severity from its string form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "warning" => Some(Self::Warning),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Comparison operators for alert conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionOperator {
    /// Greater than (>).
    #[serde(rename = ">")]
    GreaterThan,
    /// Less than (<).
    #[serde(rename = "<")]
    LessThan,
    /// Greater than or equal (>=).
    #[serde(rename = ">=")]
    GreaterThanOrEqual,
    /// Less than or equal (<=).
    #[serde(rename = "<=")]
    LessThanOrEqual,
    /// Equal (==).
    #[serde(rename = "==")]
    Equal,
    /// Not equal (!=).
    #[serde(rename = "!=")]
    NotEqual,
    /// Substring match on the string form of the value.
    #[serde(rename = "contains")]
    Contains,
    /// Regular-expression match on the string form of the value.
    #[serde(rename = "regex")]
    Regex,
}

impl ConditionOperator {
    /// Returns the operator as a string symbol.
    #[must_use]
    pub const fn as_symbol(&self) -> &'static str {
        match self {
            Self::GreaterThan => ">",
            Self::LessThan => "<",
            Self::GreaterThanOrEqual => ">=",
            Self::LessThanOrEqual => "<=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Contains => "contains",
            Self::Regex => "regex",
        }
    }

    /// Returns true if this operator compares numbers.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        !matches!(self, Self::Contains | Self::Regex)
    }
}

impl std::fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_symbol())
    }
}

/// The expected value in an alert condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    /// A numeric threshold.
    Number(f64),
    /// A text pattern (for `==`, `!=`, `contains`, `regex` on string inputs).
    Text(String),
}

impl ConditionValue {
    /// Returns the numeric form, if this value is a number.
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }

    /// Returns the text form of this value.
    #[must_use]
    pub fn as_text(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(t) => t.clone(),
        }
    }
}

/// The observed value a condition is evaluated against.
///
/// Metrics resolve to numbers; health statuses resolve to their string form.
#[derive(Debug, Clone, PartialEq)]
pub enum ObservedValue {
    /// A numeric observation (metric latest value).
    Number(f64),
    /// A textual observation (health status).
    Text(String),
}

/// A condition that triggers an alert based on a metric value or a health
/// status.
///
/// Conditions whose `metric` name starts with `health.` resolve against the
/// health registry; all other names resolve against the metric store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertCondition {
    /// The metric name (or `health.<dependency>`) to evaluate.
    pub metric: String,
    /// The comparison operator.
    pub operator: ConditionOperator,
    /// The expected value to compare against.
    pub value: ConditionValue,
    /// The severity assigned when this condition matches.
    pub severity: AlertSeverity,
}

impl AlertCondition {
    /// Creates a new numeric condition.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::InvalidRule` if the metric name is empty.
    pub fn numeric(
        metric: impl Into<String>,
        operator: ConditionOperator,
        threshold: f64,
        severity: AlertSeverity,
    ) -> Result<Self> {
        Self::new(metric, operator, ConditionValue::Number(threshold), severity)
    }

    /// Creates a new text condition.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::InvalidRule` if the metric name is empty.
    pub fn text(
        metric: impl Into<String>,
        operator: ConditionOperator,
        pattern: impl Into<String>,
        severity: AlertSeverity,
    ) -> Result<Self> {
        Self::new(
            metric,
            operator,
            ConditionValue::Text(pattern.into()),
            severity,
        )
    }

    /// Creates a new condition.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::InvalidRule` if the metric name is empty.
    pub fn new(
        metric: impl Into<String>,
        operator: ConditionOperator,
        value: ConditionValue,
        severity: AlertSeverity,
    ) -> Result<Self> {
        let metric = metric.into();
        if metric.is_empty() {
            return Err(AlertError::InvalidRule {
                reason: "condition metric name cannot be empty".to_string(),
            });
        }

        Ok(Self {
            metric,
            operator,
            value,
            severity,
        })
    }

    /// Evaluates the condition against an observed value.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::ConditionError` when a numeric operator is
    /// applied to a textual observation, the expected value has the wrong
    /// type, or a regex pattern fails to compile.
    pub fn evaluate(&self, observed: &ObservedValue) -> Result<bool> {
        match self.operator {
            ConditionOperator::Contains => {
                let haystack = Self::observed_text(observed);
                Ok(haystack.contains(&self.value.as_text()))
            }
            ConditionOperator::Regex => {
                let haystack = Self::observed_text(observed);
                let pattern = self.value.as_text();
                let re = Regex::new(&pattern).map_err(|e| AlertError::ConditionError {
                    reason: format!("invalid regex '{pattern}': {e}"),
                })?;
                Ok(re.is_match(&haystack))
            }
            ConditionOperator::Equal | ConditionOperator::NotEqual => match observed {
                ObservedValue::Number(left) => {
                    let right = self.expected_number()?;
                    let equal = (left - right).abs() < f64::EPSILON;
                    Ok(if self.operator == ConditionOperator::Equal {
                        equal
                    } else {
                        !equal
                    })
                }
                ObservedValue::Text(left) => {
                    let equal = *left == self.value.as_text();
                    Ok(if self.operator == ConditionOperator::Equal {
                        equal
                    } else {
                        !equal
                    })
                }
            },
            _ => {
                let left = match observed {
                    ObservedValue::Number(n) => *n,
                    ObservedValue::Text(t) => {
                        return Err(AlertError::ConditionError {
                            reason: format!(
                                "operator '{}' requires a numeric value, got '{t}'",
                                self.operator
                            ),
                        });
                    }
                };
                let right = self.expected_number()?;
                Ok(match self.operator {
                    ConditionOperator::GreaterThan => left > right,
                    ConditionOperator::LessThan => left < right,
                    ConditionOperator::GreaterThanOrEqual => left >= right,
                    ConditionOperator::LessThanOrEqual => left <= right,
                    _ => unreachable!("numeric comparison covered above"),
                })
            }
        }
    }

    fn expected_number(&self) -> Result<f64> {
        self.value
            .as_number()
            .ok_or_else(|| AlertError::ConditionError {
                reason: format!(
                    "operator '{}' requires a numeric threshold",
                    self.operator
                ),
            })
    }

    fn observed_text(observed: &ObservedValue) -> String {
        match observed {
            ObservedValue::Number(n) => n.to_string(),
            ObservedValue::Text(t) => t.clone(),
        }
    }
}

impl std::fmt::Display for AlertCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.metric, self.operator, self.value.as_text())
    }
}

/// What happens when a rule triggers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AlertAction {
    /// Enqueue the alert to the named notification channels.
    Notification {
        /// Channel names to notify.
        channels: Vec<String>,
    },
    /// Enqueue the alert to the `webhook` channel.
    Webhook,
    /// Invoke a named side-effecting hook. Intent is logged only.
    Automation {
        /// The hook name.
        hook: String,
    },
    /// Schedule delayed re-notification per the named escalation rule.
    Escalation {
        /// The escalation rule ID.
        rule_id: String,
    },
}

/// A rule that defines when and how to trigger an alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRule {
    /// Unique identifier for the rule.
    pub id: String,
    /// Human-readable name for the rule.
    pub name: String,
    /// The conditions evaluated for this rule; any match triggers it.
    pub conditions: Vec<AlertCondition>,
    /// Actions executed when the rule triggers.
    pub actions: Vec<AlertAction>,
    /// Minimum interval between consecutive triggers, in milliseconds.
    pub cooldown_ms: i64,
    /// When the rule last triggered (epoch millis).
    pub last_triggered_at: Option<i64>,
    /// How many times the rule has triggered.
    pub trigger_count: u64,
    /// Whether this rule is enabled.
    pub enabled: bool,
}

impl AlertRule {
    /// Maximum allowed length for rule names.
    pub const MAX_NAME_LENGTH: usize = 256;

    /// Creates a new alert rule builder.
    pub fn builder(name: impl Into<String>) -> AlertRuleBuilder {
        AlertRuleBuilder::new(name)
    }

    /// Returns true if the rule is within its cooldown window at `now`.
    #[must_use]
    pub fn in_cooldown(&self, now: i64) -> bool {
        self.last_triggered_at
            .is_some_and(|last| now - last < self.cooldown_ms)
    }
}

/// Builder for creating [`AlertRule`] instances.
#[derive(Debug)]
pub struct AlertRuleBuilder {
    name: String,
    conditions: Vec<AlertCondition>,
    actions: Vec<AlertAction>,
    cooldown_ms: i64,
    enabled: bool,
}

impl AlertRuleBuilder {
    /// Creates a new builder with required fields.
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            conditions: Vec::new(),
            actions: Vec::new(),
            cooldown_ms: 300_000,
            enabled: true,
        }
    }

    /// Adds a condition to the rule.
    #[must_use]
    pub fn condition(mut self, condition: AlertCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Adds an action to the rule.
    #[must_use]
    pub fn action(mut self, action: AlertAction) -> Self {
        self.actions.push(action);
        self
    }

    /// Sets the cooldown in milliseconds.
    #[must_use]
    pub const fn cooldown_ms(mut self, cooldown_ms: i64) -> Self {
        self.cooldown_ms = cooldown_ms;
        self
    }

    /// Sets whether the rule is enabled.
    #[must_use]
    pub const fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Builds the [`AlertRule`].
    ///
    /// # Errors
    ///
    /// Returns `AlertError::InvalidRule` if:
    /// - The name is empty or exceeds the maximum length
    /// - The rule has no conditions
    pub fn build(self) -> Result<AlertRule> {
        if self.name.is_empty() {
            return Err(AlertError::InvalidRule {
                reason: "rule name cannot be empty".to_string(),
            });
        }

        if self.name.len() > AlertRule::MAX_NAME_LENGTH {
            return Err(AlertError::InvalidRule {
                reason: format!(
                    "rule name exceeds maximum length of {} characters",
                    AlertRule::MAX_NAME_LENGTH
                ),
            });
        }

        if self.conditions.is_empty() {
            return Err(AlertError::InvalidRule {
                reason: "rule must have at least one condition".to_string(),
            });
        }

        Ok(AlertRule {
            id: Uuid::new_v4().to_string(),
            name: self.name,
            conditions: self.conditions,
            actions: self.actions,
            cooldown_ms: self.cooldown_ms,
            last_triggered_at: None,
            trigger_count: 0,
            enabled: self.enabled,
        })
    }
}

/// A discrete notification-worthy event.
///
/// Alerts are created through the engine's creation gateway and get a fresh
/// unique id each time; they are throttled by rule cooldowns, never
/// deduplicated by content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Unique identifier for this alert.
    pub id: String,
    /// What produced the alert (e.g., `threshold`, `rule`, `health-check`).
    pub kind: String,
    /// The severity of the alert.
    pub severity: AlertSeverity,
    /// Short human-readable title.
    pub title: String,
    /// Longer description of what happened.
    pub message: String,
    /// The subsystem that raised the alert.
    pub source: String,
    /// When the alert was created (epoch millis).
    pub timestamp: i64,
    /// Whether the alert has been resolved. Transitions false→true only.
    pub resolved: bool,
    /// When the alert was resolved (epoch millis).
    pub resolved_at: Option<i64>,
    /// Additional context.
    pub metadata: HashMap<String, String>,
}

impl Alert {
    /// Marks the alert resolved.
    ///
    /// Returns true if this call performed the transition; resolving an
    /// already-resolved alert is a no-op.
    pub fn resolve(&mut self) -> bool {
        if self.resolved {
            return false;
        }
        self.resolved = true;
        self.resolved_at = Some(vigil_metrics::now_timestamp());
        true
    }
}

/// A request to create an alert through the creation gateway.
#[derive(Debug, Clone)]
pub struct NewAlert {
    /// What produced the alert.
    pub kind: String,
    /// The severity of the alert.
    pub severity: AlertSeverity,
    /// Short human-readable title.
    pub title: String,
    /// Longer description of what happened.
    pub message: String,
    /// The subsystem raising the alert.
    pub source: String,
    /// Additional context.
    pub metadata: HashMap<String, String>,
}

impl NewAlert {
    /// Creates a new alert request.
    #[must_use]
    pub fn new(
        kind: impl Into<String>,
        severity: AlertSeverity,
        title: impl Into<String>,
        message: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            severity,
            title: title.into(),
            message: message.into(),
            source: source.into(),
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

/// One level of an escalation rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationLevel {
    /// Level number, starting at 1.
    pub level: u32,
    /// Delay after the original alert before this level fires, in millis.
    pub delay_ms: i64,
    /// Channel names notified at this level.
    pub channels: Vec<String>,
    /// Extra recipients realized as ad-hoc single-use channels.
    pub additional_recipients: Vec<String>,
    /// Optional message override for this level.
    pub message: Option<String>,
}

/// Drives delayed re-notification of unresolved critical alerts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationRule {
    /// Unique identifier for the escalation rule.
    pub id: String,
    /// The escalation levels, fired in order of their delays.
    pub levels: Vec<EscalationLevel>,
}

impl EscalationRule {
    /// Creates a new escalation rule with a generated id.
    #[must_use]
    pub fn new(levels: Vec<EscalationLevel>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            levels,
        }
    }
}

/// Aggregate counts over the alert store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertStatistics {
    /// Total number of alerts retained.
    pub total: usize,
    /// Number of resolved alerts.
    pub resolved: usize,
    /// Number of unresolved alerts.
    pub unresolved: usize,
    /// Counts keyed by severity string.
    pub by_severity: HashMap<String, usize>,
}
