//! Core types for the health-check system.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The health state of a dependency.
///
/// Dependencies start `unchecked` and move between the other states on every
/// probe cycle; there is no terminal state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Not probed yet.
    #[default]
    Unchecked,
    /// The dependency answered within limits.
    Healthy,
    /// The dependency answered but with reduced capability.
    Degraded,
    /// The dependency failed, errored, or timed out.
    Unhealthy,
}

impl HealthStatus {
    /// Returns the status as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unchecked => "unchecked",
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Unhealthy => "unhealthy",
        }
    }

    /// Returns how bad this status is (higher = worse).
    ///
    /// Used to aggregate an overall status as the worst across dependencies;
    /// `unchecked` ranks between healthy and degraded so a never-probed
    /// dependency keeps the aggregate out of `healthy`.
    #[must_use]
    pub const fn badness(&self) -> u8 {
        match self {
            Self::Healthy => 0,
            Self::Unchecked => 1,
            Self::Degraded => 2,
            Self::Unhealthy => 3,
        }
    }

    /// Returns the worse of two statuses.
    #[must_use]
    pub const fn worst(self, other: Self) -> Self {
        if other.badness() > self.badness() {
            other
        } else {
            self
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The current health record for one dependency.
///
/// Exactly one live record exists per dependency name; each probe cycle
/// overwrites the previous record (last-write-wins, no history).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthCheck {
    /// The dependency name.
    pub name: String,
    /// The observed status.
    pub status: HealthStatus,
    /// Human-readable detail about the observation.
    pub message: String,
    /// When the probe completed (epoch millis).
    pub timestamp: i64,
    /// How long the probe took, in milliseconds.
    pub response_time_ms: u64,
    /// Probe-specific details (versions, pool sizes, endpoints).
    pub details: HashMap<String, String>,
}

/// What a successful probe reports back.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeReport {
    /// The observed status.
    pub status: HealthStatus,
    /// Human-readable detail.
    pub message: String,
    /// Probe-specific details.
    pub details: HashMap<String, String>,
}

impl ProbeReport {
    /// Creates a healthy report.
    #[must_use]
    pub fn healthy(message: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Healthy,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates a degraded report.
    #[must_use]
    pub fn degraded(message: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Degraded,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates an unhealthy report.
    #[must_use]
    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Attaches a detail entry and returns self for chaining.
    #[must_use]
    pub fn detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

/// Aggregate counts over the registry's current records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthSummary {
    /// Total registered dependencies.
    pub total: usize,
    /// Dependencies currently healthy.
    pub healthy: usize,
    /// Dependencies currently degraded.
    pub degraded: usize,
    /// Dependencies currently unhealthy.
    pub unhealthy: usize,
    /// Dependencies never probed.
    pub unchecked: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_as_str() {
        assert_eq!(HealthStatus::Unchecked.as_str(), "unchecked");
        assert_eq!(HealthStatus::Healthy.as_str(), "healthy");
        assert_eq!(HealthStatus::Degraded.as_str(), "degraded");
        assert_eq!(HealthStatus::Unhealthy.as_str(), "unhealthy");
    }

    #[test]
    fn status_worst_ordering() {
        assert_eq!(
            HealthStatus::Healthy.worst(HealthStatus::Unhealthy),
            HealthStatus::Unhealthy
        );
        assert_eq!(
            HealthStatus::Degraded.worst(HealthStatus::Healthy),
            HealthStatus::Degraded
        );
        assert_eq!(
            HealthStatus::Unchecked.worst(HealthStatus::Healthy),
            HealthStatus::Unchecked
        );
    }

    #[test]
    fn status_serialization_is_lowercase() {
        let json = serde_json::to_string(&HealthStatus::Unhealthy).unwrap();
        assert_eq!(json, "\"unhealthy\"");
    }

    #[test]
    fn probe_report_builders() {
        let report = ProbeReport::healthy("pool ok").detail("pool_size", "10");
        assert_eq!(report.status, HealthStatus::Healthy);
        assert_eq!(report.details.get("pool_size"), Some(&"10".to_string()));

        assert_eq!(
            ProbeReport::degraded("slow").status,
            HealthStatus::Degraded
        );
        assert_eq!(
            ProbeReport::unhealthy("down").status,
            HealthStatus::Unhealthy
        );
    }
}
