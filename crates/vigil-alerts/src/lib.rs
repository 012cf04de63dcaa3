//! Rule- and threshold-driven alerting for Vigil.
//!
//! `vigil-alerts` provides the alerting engine at the center of the
//! observability core: a single disciplined creation gateway for alerts,
//! declarative rules with cooldowns, an always-on built-in threshold table
//! evaluated inline on every metric recording, and escalation rules for
//! delayed re-notification.
//!
//! # Features
//!
//! - **Creation gateway**: every raiser (rules, thresholds, health checks,
//!   error escalation, circuit breakers) goes through [`AlertSink::raise`]
//! - **Rules with cooldowns**: any matching condition triggers; severity is
//!   the maximum rank across matches; a rule never fires twice within its
//!   cooldown window
//! - **Inline thresholds**: a fixed table of warning/critical limits checked
//!   on every recording, independent of user rules
//! - **Capability seams**: notification and health lookups go through traits
//!   wired at startup, keeping the crate graph acyclic
//!
//! # Example
//!
//! ```rust
//! use vigil_alerts::{
//!     AlertCondition, AlertEngine, AlertRule, AlertSeverity, ConditionOperator,
//! };
//! use vigil_metrics::{MetricName, MetricStore};
//! use std::collections::HashMap;
//!
//! let metrics = MetricStore::default();
//! let engine = AlertEngine::new(metrics.clone());
//!
//! let rule = AlertRule::builder("HighCpu")
//!     .condition(
//!         AlertCondition::numeric(
//!             "system.cpu.usage",
//!             ConditionOperator::GreaterThan,
//!             80.0,
//!             AlertSeverity::Warning,
//!         )
//!         .unwrap(),
//!     )
//!     .cooldown_ms(300_000)
//!     .build()
//!     .unwrap();
//! engine.add_rule(rule).unwrap();
//!
//! metrics.record(
//!     MetricName::new("system.cpu.usage").unwrap(),
//!     92.0,
//!     "percent",
//!     HashMap::new(),
//! );
//!
//! let result = engine.check_rules();
//! assert_eq!(result.triggered.len(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod engine;
pub mod error;
pub mod thresholds;
pub mod traits;
pub mod types;

// Re-export main types at crate root
pub use engine::{AlertEngine, AlertEngineConfig, AlertFilter, RuleEvaluation};
pub use error::{AlertError, Result};
pub use thresholds::{ThresholdLimits, default_thresholds};
pub use traits::{AlertNotifier, AlertSink, AlertStatusView, HealthStatusSource};
pub use types::{
    Alert, AlertAction, AlertCondition, AlertRule, AlertRuleBuilder, AlertSeverity,
    AlertStatistics, ConditionOperator, ConditionValue, EscalationLevel, EscalationRule, NewAlert,
    ObservedValue,
};
