//! Core types for the metrics system.
//!
//! This module provides the fundamental types used throughout the
//! vigil-metrics crate:
//! - [`Metric`]: A single measurement with timestamp, value, unit, and tags
//! - [`MetricName`]: A validated metric name

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{MetricsError, Result};

/// A single recorded metric sample.
///
/// Samples are immutable once recorded. Multiple samples under the same name
/// form a time-ordered, size-bounded history inside the
/// [`MetricStore`](crate::store::MetricStore).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    /// The metric name.
    pub name: MetricName,
    /// The measured value.
    pub value: f64,
    /// The unit of the value (e.g., `percent`, `ms`, `bytes`).
    pub unit: String,
    /// Unix timestamp in milliseconds.
    pub timestamp: i64,
    /// Optional dimensional tags (e.g., `service`, `host`).
    pub tags: HashMap<String, String>,
}

impl Metric {
    /// Creates a new metric sample stamped with the current time.
    #[must_use]
    pub fn now(name: MetricName, value: f64, unit: impl Into<String>) -> Self {
        Self {
            name,
            value,
            unit: unit.into(),
            timestamp: now_timestamp(),
            tags: HashMap::new(),
        }
    }

    /// Adds a tag to this sample and returns self for chaining.
    #[must_use]
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Replaces the tag set wholesale.
    #[must_use]
    pub fn with_tags(mut self, tags: HashMap<String, String>) -> Self {
        self.tags = tags;
        self
    }
}

/// Returns the current Unix timestamp in milliseconds.
#[must_use]
pub fn now_timestamp() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// A validated metric name.
///
/// Metric names must:
/// - Be non-empty
/// - Contain only alphanumeric characters, underscores, dots, and colons
/// - Start with a letter or underscore
/// - Be at most 256 characters long
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetricName(String);

impl MetricName {
    /// Maximum allowed length for a metric name.
    pub const MAX_LENGTH: usize = 256;

    /// Creates a new validated metric name.
    ///
    /// # Errors
    ///
    /// Returns `MetricsError::InvalidMetricName` if the name is invalid.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();

        if name.is_empty() {
            return Err(MetricsError::InvalidMetricName {
                reason: "metric name cannot be empty".to_string(),
            });
        }

        if name.len() > Self::MAX_LENGTH {
            return Err(MetricsError::InvalidMetricName {
                reason: format!(
                    "metric name exceeds maximum length of {} characters",
                    Self::MAX_LENGTH
                ),
            });
        }

        let first_char = name.chars().next();
        if let Some(c) = first_char {
            if !c.is_ascii_alphabetic() && c != '_' {
                return Err(MetricsError::InvalidMetricName {
                    reason: "metric name must start with a letter or underscore".to_string(),
                });
            }
        }

        for c in name.chars() {
            if !c.is_ascii_alphanumeric() && c != '_' && c != '.' && c != ':' {
                return Err(MetricsError::InvalidMetricName {
                    reason: format!("invalid character '{c}' in metric name"),
                });
            }
        }

        Ok(Self(name))
    }

    /// Returns the metric name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `MetricName` and returns the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for MetricName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for MetricName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod metric_name_tests {
        use super::*;

        #[test]
        fn valid_names() {
            assert!(MetricName::new("cpu_usage").is_ok());
            assert!(MetricName::new("system.memory.usage").is_ok());
            assert!(MetricName::new("_internal:counter").is_ok());
            assert!(MetricName::new("http.response_time_ms").is_ok());
        }

        #[test]
        fn empty_name_fails() {
            let result = MetricName::new("");
            assert!(result.is_err());
            match result {
                Err(MetricsError::InvalidMetricName { reason }) => {
                    assert!(reason.contains("empty"));
                }
                _ => panic!("expected InvalidMetricName error"),
            }
        }

        #[test]
        fn name_too_long_fails() {
            let long = "a".repeat(MetricName::MAX_LENGTH + 1);
            assert!(MetricName::new(long).is_err());
        }

        #[test]
        fn name_starting_with_digit_fails() {
            assert!(MetricName::new("9lives").is_err());
        }

        #[test]
        fn name_with_invalid_character_fails() {
            assert!(MetricName::new("cpu usage").is_err());
            assert!(MetricName::new("cpu/usage").is_err());
        }

        #[test]
        fn as_str_and_display() {
            let name = MetricName::new("disk.usage").unwrap();
            assert_eq!(name.as_str(), "disk.usage");
            assert_eq!(format!("{name}"), "disk.usage");
        }

        #[test]
        fn into_inner() {
            let name = MetricName::new("disk.usage").unwrap();
            assert_eq!(name.into_inner(), "disk.usage");
        }
    }

    mod metric_tests {
        use super::*;

        #[test]
        fn metric_now_stamps_current_time() {
            let before = now_timestamp();
            let metric = Metric::now(MetricName::new("cpu").unwrap(), 42.0, "percent");
            let after = now_timestamp();

            assert!(metric.timestamp >= before);
            assert!(metric.timestamp <= after);
            assert!((metric.value - 42.0).abs() < f64::EPSILON);
            assert_eq!(metric.unit, "percent");
        }

        #[test]
        fn metric_with_tags() {
            let metric = Metric::now(MetricName::new("cpu").unwrap(), 42.0, "percent")
                .tag("host", "node-1")
                .tag("env", "prod");

            assert_eq!(metric.tags.get("host"), Some(&"node-1".to_string()));
            assert_eq!(metric.tags.get("env"), Some(&"prod".to_string()));
        }

        #[test]
        fn metric_serialization_roundtrip() {
            let metric = Metric::now(MetricName::new("cpu").unwrap(), 42.0, "percent")
                .tag("host", "node-1");

            let json = serde_json::to_string(&metric).unwrap();
            let parsed: Metric = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, metric);
        }
    }
}
