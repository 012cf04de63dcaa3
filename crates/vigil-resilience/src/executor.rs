//! Composed breaker-plus-retry execution.
//!
//! [`ResilienceExecutor`] keeps a cache of named circuit breakers and runs
//! operations through breaker-guarded retry: the breaker gates whether a run
//! may start at all, the retry loop handles transient failures inside the
//! run, and the breaker records the run's overall outcome. A run that
//! eventually succeeds therefore counts as one success, which is what lets a
//! flaky-then-recovered operation leave its breaker closed with zero
//! failures.

use std::future::Future;

use vigil_alerts::AlertSink;

use crate::breaker::{BreakerRegistry, BreakerSnapshot, CircuitBreakerConfig};
use crate::error::{ResilienceError, Result};
use crate::retry::{RetryPolicy, retry_with_backoff};

/// Runs operations under cached named breakers with retry.
///
/// Cloning shares the breaker cache.
#[derive(Debug, Clone, Default)]
pub struct ResilienceExecutor {
    breakers: BreakerRegistry,
}

impl ResilienceExecutor {
    /// Creates a new executor with an empty breaker cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Connects the alert gateway; breakers opened by this executor raise
    /// high alerts.
    pub fn set_alert_sink(&self, alerts: std::sync::Arc<dyn AlertSink>) {
        self.breakers.set_alert_sink(alerts);
    }

    /// Returns the breaker registry.
    #[must_use]
    pub fn breakers(&self) -> &BreakerRegistry {
        &self.breakers
    }

    /// Returns a snapshot of every cached breaker.
    #[must_use]
    pub fn snapshots(&self) -> Vec<BreakerSnapshot> {
        self.breakers.snapshots()
    }

    /// Runs `op` under the named breaker with retry.
    ///
    /// The breaker for `name` is created on first use (with
    /// `breaker_config`, or defaults). While it is open the call fails fast
    /// without invoking `op`. Otherwise `op` runs with up to `max_retries`
    /// retries under the given backoff policy; the run's overall outcome is
    /// recorded on the breaker once.
    ///
    /// # Errors
    ///
    /// Returns `CircuitOpen` when rejected, or `RetryExhausted` wrapping the
    /// last error when every attempt failed.
    pub async fn execute_with_resilience<T, E, F, Fut>(
        &self,
        name: &str,
        op: F,
        breaker_config: Option<CircuitBreakerConfig>,
        max_retries: u32,
    ) -> Result<T, E>
    where
        E: std::error::Error + 'static,
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        let breaker = self.breakers.breaker(name, breaker_config);

        if !breaker.can_execute() {
            return Err(ResilienceError::CircuitOpen {
                name: name.to_string(),
            });
        }

        let policy = RetryPolicy {
            max_retries,
            ..RetryPolicy::default()
        };

        match retry_with_backoff(policy, op).await {
            Ok(value) => {
                breaker.record_success();
                Ok(value)
            }
            Err(e) => {
                breaker.record_failure();
                Err(e)
            }
        }
    }

    /// Like [`Self::execute_with_resilience`] but with an explicit backoff
    /// policy, used by tests to keep delays short.
    ///
    /// # Errors
    ///
    /// Same contract as [`Self::execute_with_resilience`].
    pub async fn execute_with_policy<T, E, F, Fut>(
        &self,
        name: &str,
        op: F,
        breaker_config: Option<CircuitBreakerConfig>,
        policy: RetryPolicy,
    ) -> Result<T, E>
    where
        E: std::error::Error + 'static,
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        let breaker = self.breakers.breaker(name, breaker_config);

        if !breaker.can_execute() {
            return Err(ResilienceError::CircuitOpen {
                name: name.to_string(),
            });
        }

        match retry_with_backoff(policy, op).await {
            Ok(value) => {
                breaker.record_success();
                Ok(value)
            }
            Err(e) => {
                breaker.record_failure();
                Err(e)
            }
        }
    }
}
