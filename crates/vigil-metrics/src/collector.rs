//! Metric collectors for runtime and system samples.
//!
//! This module provides trait definitions and implementations for collecting
//! metrics from various sources on a periodic schedule.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::error::Result;
use crate::store::MetricStore;
use crate::types::MetricName;

/// A single collected sample, before it is recorded into a store.
#[derive(Debug, Clone)]
pub struct Sample {
    /// The metric name.
    pub name: MetricName,
    /// The sampled value.
    pub value: f64,
    /// The unit of the value.
    pub unit: String,
    /// Dimensional tags.
    pub tags: HashMap<String, String>,
}

impl Sample {
    /// Creates a new sample with no tags.
    #[must_use]
    pub fn new(name: MetricName, value: f64, unit: impl Into<String>) -> Self {
        Self {
            name,
            value,
            unit: unit.into(),
            tags: HashMap::new(),
        }
    }
}

/// Trait for metric collectors.
///
/// Implement this trait to create custom collectors that gather samples from
/// various sources (process statistics, OS resources, application counters).
pub trait MetricCollector: Send + Sync {
    /// Collects samples from the source.
    ///
    /// # Errors
    ///
    /// Returns an error if collection fails.
    fn collect(&self) -> Result<Vec<Sample>>;

    /// Returns the name of this collector for logging purposes.
    fn name(&self) -> &'static str;

    /// Collects samples and records them into the given store.
    ///
    /// Returns the recorded samples so callers can run follow-up evaluation
    /// (threshold checks) on each.
    ///
    /// # Errors
    ///
    /// Returns an error if collection fails.
    fn collect_and_record(&self, store: &MetricStore) -> Result<Vec<crate::types::Metric>> {
        let samples = self.collect()?;
        debug!(collector = self.name(), samples = samples.len(), "collected samples");

        Ok(samples
            .into_iter()
            .map(|s| store.record(s.name, s.value, s.unit, s.tags))
            .collect())
    }
}

/// Collector for process runtime gauges.
///
/// Tracks resource gauges (CPU, memory, disk) that the hosting process
/// updates through [`RuntimeMetricsCollector::set_gauge`]. In production the
/// gauges are fed by an OS resource reader; tests inject values directly.
#[derive(Debug, Default)]
pub struct RuntimeMetricsCollector {
    gauges: Arc<RwLock<HashMap<MetricName, (f64, String)>>>,
}

impl RuntimeMetricsCollector {
    /// Creates a new runtime collector with no gauges.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets or updates a gauge value.
    pub fn set_gauge(&self, name: MetricName, value: f64, unit: impl Into<String>) {
        let mut gauges = self.gauges.write();
        gauges.insert(name, (value, unit.into()));
    }

    /// Removes a gauge from the collector.
    pub fn remove_gauge(&self, name: &MetricName) {
        let mut gauges = self.gauges.write();
        gauges.remove(name);
    }

    /// Returns the number of tracked gauges.
    #[must_use]
    pub fn gauge_count(&self) -> usize {
        let gauges = self.gauges.read();
        gauges.len()
    }
}

impl MetricCollector for RuntimeMetricsCollector {
    fn collect(&self) -> Result<Vec<Sample>> {
        let gauges = self.gauges.read();
        Ok(gauges
            .iter()
            .map(|(name, (value, unit))| Sample::new(name.clone(), *value, unit.clone()))
            .collect())
    }

    fn name(&self) -> &'static str {
        "runtime"
    }
}
