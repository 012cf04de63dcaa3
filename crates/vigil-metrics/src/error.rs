//! Error types for the vigil-metrics crate.

use thiserror::Error;

/// Errors that can occur in the metrics system.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// The metric name is invalid (empty or contains invalid characters).
    #[error("invalid metric name: {reason}")]
    InvalidMetricName {
        /// The reason the name is invalid.
        reason: String,
    },

    /// Collection operation failed.
    #[error("collection error: {reason}")]
    CollectionError {
        /// The reason the collection operation failed.
        reason: String,
    },
}

/// Result type for metrics operations.
pub type Result<T> = std::result::Result<T, MetricsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_invalid_metric_name() {
        let err = MetricsError::InvalidMetricName {
            reason: "empty name".to_string(),
        };
        assert_eq!(err.to_string(), "invalid metric name: empty name");
    }

    #[test]
    fn error_display_collection_error() {
        let err = MetricsError::CollectionError {
            reason: "sampler unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "collection error: sampler unavailable");
    }
}
