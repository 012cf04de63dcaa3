//! Built-in metric thresholds.
//!
//! A fixed table of per-metric warning/critical limits evaluated inline on
//! every metric recording, independent of user-defined rules. Breaches
//! produce immediate alerts with no cooldown beyond the natural recording
//! frequency.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Warning and critical limits for one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdLimits {
    /// Value at or above which a warning alert is raised.
    pub warning: f64,
    /// Value at or above which a critical alert is raised.
    pub critical: f64,
}

impl ThresholdLimits {
    /// Creates a new limit pair.
    #[must_use]
    pub const fn new(warning: f64, critical: f64) -> Self {
        Self { warning, critical }
    }
}

/// Returns the built-in threshold table.
///
/// Covers the resource and latency metrics the core always watches; entries
/// can be overridden or extended through configuration.
#[must_use]
pub fn default_thresholds() -> HashMap<String, ThresholdLimits> {
    let mut table = HashMap::new();
    table.insert(
        "system.cpu.usage".to_string(),
        ThresholdLimits::new(80.0, 95.0),
    );
    table.insert(
        "system.memory.usage".to_string(),
        ThresholdLimits::new(85.0, 95.0),
    );
    table.insert(
        "system.disk.usage".to_string(),
        ThresholdLimits::new(85.0, 95.0),
    );
    table.insert(
        "http.response_time_ms".to_string(),
        ThresholdLimits::new(1000.0, 5000.0),
    );
    table.insert(
        "db.query_time_ms".to_string(),
        ThresholdLimits::new(500.0, 2000.0),
    );
    table
}
