//! Capability seams between the alerting engine and its collaborators.
//!
//! Health checking, resilience, and error reporting raise alerts through
//! [`AlertSink`]; the notification dispatcher consumes alerts through
//! [`AlertNotifier`] and checks resolution state through [`AlertStatusView`];
//! the health registry answers status lookups through [`HealthStatusSource`].
//! The wiring object owns the concrete instances and connects the handles at
//! startup, keeping the crate graph acyclic.

use std::time::Duration;

use crate::types::{Alert, EscalationRule, NewAlert};

/// The shared alert-creation entry point.
///
/// Every alert raiser (rule evaluation, health checks, threshold breaches,
/// error escalation, circuit breakers) goes through this capability.
pub trait AlertSink: Send + Sync {
    /// Creates and stores a new alert, routing it to notification defaults.
    fn raise(&self, alert: NewAlert) -> Alert;
}

/// Consumes alerts for delayed, severity-routed fan-out.
pub trait AlertNotifier: Send + Sync {
    /// Enqueues an alert for delivery.
    ///
    /// `channels = None` selects defaults by severity; `delay` postpones
    /// delivery until at least that much time has passed.
    fn enqueue(&self, alert: Alert, channels: Option<Vec<String>>, delay: Duration);

    /// Schedules delayed re-notification per the escalation rule's levels.
    fn escalate(&self, alert: Alert, rule: &EscalationRule);
}

/// Read-only view of alert resolution state.
///
/// Used by the dispatcher to drop escalations whose alert has been resolved
/// by the time they come due.
pub trait AlertStatusView: Send + Sync {
    /// Returns true if the alert exists and has been resolved.
    fn is_resolved(&self, alert_id: &str) -> bool;
}

/// Resolves the current status of a named dependency.
///
/// Implemented by the health registry; consumed by rule evaluation for
/// `health.<dependency>` conditions.
pub trait HealthStatusSource: Send + Sync {
    /// Returns the status string (`healthy`, `degraded`, `unhealthy`,
    /// `unchecked`) for a dependency, or `None` if it is not registered.
    fn status_text(&self, dependency: &str) -> Option<String>;
}
