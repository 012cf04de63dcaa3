//! Failure-isolation primitives for Vigil.
//!
//! `vigil-resilience` provides the two guards the core wraps around
//! unreliable operations:
//!
//! - [`CircuitBreaker`] — a per-named-operation state machine that stops
//!   invoking a failing operation until a cool-down period passes
//! - [`retry_with_backoff`] — exponential backoff with bounded jitter
//!
//! The two compose through [`ResilienceExecutor`], which caches breakers by
//! name and records each retried run's overall outcome on its breaker.
//!
//! # Example
//!
//! ```rust,no_run
//! use vigil_resilience::{CircuitBreakerConfig, ResilienceExecutor};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let executor = ResilienceExecutor::new();
//!
//! let value = executor
//!     .execute_with_resilience(
//!         "billing",
//!         || async { Ok::<_, std::io::Error>(42) },
//!         Some(CircuitBreakerConfig::default()),
//!         3,
//!     )
//!     .await?;
//! assert_eq!(value, 42);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod breaker;
pub mod error;
pub mod executor;
pub mod retry;

// Re-export main types at crate root
pub use breaker::{
    BreakerRegistry, BreakerSnapshot, CircuitBreaker, CircuitBreakerConfig, CircuitState,
};
pub use error::{ResilienceError, Result};
pub use executor::ResilienceExecutor;
pub use retry::{RetryPolicy, retry_with_backoff};
