//! In-memory metric storage with bounded per-name history.
//!
//! This module provides the [`MetricStore`] which stores metric samples in
//! memory, keeping at most a fixed number of samples per metric name. The
//! oldest samples are evicted first, on every write, so memory bounds stay
//! deterministic.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::types::{Metric, MetricName, now_timestamp};

/// Default number of samples retained per metric name.
pub const DEFAULT_MAX_HISTORY: usize = 1000;

/// Thread-safe in-memory storage for metric samples.
///
/// Each metric name owns an append-only, time-ordered history capped at
/// `max_history` samples; the oldest sample is dropped when the cap is
/// exceeded. Cloning the store shares the underlying data.
#[derive(Debug)]
pub struct MetricStore {
    /// Maximum number of samples kept per metric name.
    max_history: usize,
    /// The actual sample storage, keyed by metric name.
    data: Arc<RwLock<HashMap<MetricName, VecDeque<Metric>>>>,
}

impl MetricStore {
    /// Creates a new metric store with the given per-name history cap.
    #[must_use]
    pub fn new(max_history: usize) -> Self {
        Self {
            max_history: max_history.max(1),
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns the per-name history cap.
    #[must_use]
    pub const fn max_history(&self) -> usize {
        self.max_history
    }

    /// Records a new sample, returning the stored metric.
    ///
    /// The sample is stamped with the current time, appended to the metric's
    /// history, and the history is trimmed to the cap (oldest first).
    pub fn record(
        &self,
        name: MetricName,
        value: f64,
        unit: impl Into<String>,
        tags: HashMap<String, String>,
    ) -> Metric {
        let metric = Metric {
            name: name.clone(),
            value,
            unit: unit.into(),
            timestamp: now_timestamp(),
            tags,
        };

        let mut data = self.data.write();
        let history = data.entry(name).or_default();
        history.push_back(metric.clone());
        while history.len() > self.max_history {
            history.pop_front();
        }

        debug!(
            metric = %metric.name,
            value = metric.value,
            samples = history.len(),
            "recorded metric"
        );

        metric
    }

    /// Returns the most recent value for a metric, if any.
    #[must_use]
    pub fn latest(&self, name: &MetricName) -> Option<f64> {
        let data = self.data.read();
        data.get(name).and_then(|h| h.back()).map(|m| m.value)
    }

    /// Returns the most recent sample for a metric, if any.
    #[must_use]
    pub fn latest_sample(&self, name: &MetricName) -> Option<Metric> {
        let data = self.data.read();
        data.get(name).and_then(|h| h.back()).cloned()
    }

    /// Returns a snapshot of a metric's history, most-recent-last.
    ///
    /// At most `limit` samples are returned, counted from the most recent.
    /// Returns an empty vector for unknown metrics.
    #[must_use]
    pub fn history(&self, name: &MetricName, limit: usize) -> Vec<Metric> {
        let data = self.data.read();
        data.get(name).map_or_else(Vec::new, |history| {
            let skip = history.len().saturating_sub(limit);
            history.iter().skip(skip).cloned().collect()
        })
    }

    /// Returns a list of all metric names in the store.
    #[must_use]
    pub fn names(&self) -> Vec<MetricName> {
        let data = self.data.read();
        data.keys().cloned().collect()
    }

    /// Returns the number of samples stored for a metric.
    ///
    /// Returns 0 if the metric doesn't exist.
    #[must_use]
    pub fn count(&self, name: &MetricName) -> usize {
        let data = self.data.read();
        data.get(name).map_or(0, VecDeque::len)
    }

    /// Clears all samples from the store.
    pub fn clear(&self) {
        let mut data = self.data.write();
        data.clear();
    }
}

impl Clone for MetricStore {
    fn clone(&self) -> Self {
        Self {
            max_history: self.max_history,
            data: Arc::clone(&self.data),
        }
    }
}

impl Default for MetricStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}
