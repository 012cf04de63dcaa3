//! Error types for the vigil-errors crate.

use thiserror::Error;

/// Errors that can occur in the error-report store.
#[derive(Debug, Error)]
pub enum ErrorStoreError {
    /// An error report with the given ID was not found.
    #[error("error report not found: {id}")]
    ReportNotFound {
        /// The report ID that was not found.
        id: String,
    },
}

/// Result type for error-report operations.
pub type Result<T> = std::result::Result<T, ErrorStoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_report_not_found() {
        let err = ErrorStoreError::ReportNotFound {
            id: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "error report not found: abc");
    }
}
