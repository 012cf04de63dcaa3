//! Error types for the vigil-resilience crate.

/// Errors produced by the resilience primitives, wrapping the error type of
/// the guarded operation.
///
/// `Display` and `Error` are implemented by hand rather than derived: the
/// `RetryExhausted` variant is recursive (`Box<ResilienceError<E>>`), which
/// makes `thiserror`'s inferred `Display` bound on the boxed field
/// unsatisfiable for concrete `E`. The hand-written impls below reproduce the
/// exact messages and `source` forwarding the derive would have generated.
#[derive(Debug)]
pub enum ResilienceError<E>
where
    E: std::error::Error + 'static,
{
    /// The circuit breaker is open; the operation was not invoked.
    CircuitOpen {
        /// The breaker name.
        name: String,
    },

    /// The operation failed on a single attempt.
    Operation(E),

    /// All retry attempts failed; carries the last error.
    RetryExhausted {
        /// Total attempts made (initial try plus retries).
        attempts: u32,
        /// The error from the final attempt.
        last: Box<ResilienceError<E>>,
    },
}

impl<E> std::fmt::Display for ResilienceError<E>
where
    E: std::error::Error + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CircuitOpen { name } => {
                write!(f, "circuit breaker '{name}' is open")
            }
            Self::Operation(inner) => std::fmt::Display::fmt(inner, f),
            Self::RetryExhausted { attempts, last } => {
                write!(f, "retries exhausted after {attempts} attempts: {last}")
            }
        }
    }
}

impl<E> std::error::Error for ResilienceError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::CircuitOpen { .. } => None,
            // `transparent`: forward to the inner error's own source.
            Self::Operation(inner) => inner.source(),
            Self::RetryExhausted { last, .. } => Some(last.as_ref()),
        }
    }
}

impl<E> ResilienceError<E>
where
    E: std::error::Error + 'static,
{
    /// Returns true if this error is a fail-fast circuit-open rejection.
    #[must_use]
    pub const fn is_circuit_open(&self) -> bool {
        matches!(self, Self::CircuitOpen { .. })
    }

    /// Returns true if this error is a retry exhaustion.
    #[must_use]
    pub const fn is_retry_exhausted(&self) -> bool {
        matches!(self, Self::RetryExhausted { .. })
    }
}

/// Result type for resilience operations.
pub type Result<T, E> = std::result::Result<T, ResilienceError<E>>;
