//! Circuit breaker for preventing cascading failures.
//!
//! A breaker wraps one named operation. While `closed`, calls pass through
//! and consecutive failures are counted; at the failure threshold the
//! breaker opens and rejects calls immediately without invoking the
//! operation. After the reset timeout the breaker lets one call through
//! (`half_open`); three consecutive successes close it again, any failure
//! reopens it.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use vigil_alerts::{AlertSeverity, AlertSink, NewAlert};

use crate::error::{ResilienceError, Result};

/// Circuit breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Calls pass through; failures are counted.
    Closed,
    /// Calls are rejected immediately.
    Open,
    /// Probing: calls pass through, watching for consecutive successes.
    HalfOpen,
}

impl CircuitState {
    /// Returns the state as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::HalfOpen => "half_open",
        }
    }
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Configuration for a circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open the breaker.
    pub failure_threshold: u32,
    /// How long the breaker stays open before probing.
    pub reset_timeout: Duration,
    /// Consecutive half-open successes required to close.
    pub success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            reset_timeout: Duration::from_secs(60),
            success_threshold: 3,
        }
    }
}

/// Point-in-time view of a breaker, for the HTTP surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakerSnapshot {
    /// The breaker name.
    pub name: String,
    /// The current state string.
    pub state: String,
    /// The current failure count.
    pub failures: u32,
}

#[derive(Debug)]
struct BreakerInner {
    state: CircuitState,
    failure_count: u32,
    consecutive_successes: u32,
    last_failure_at: Option<Instant>,
}

/// Failure-isolation state machine around one named operation.
///
/// Cloning shares the underlying state.
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: Arc<Mutex<BreakerInner>>,
    alerts: Arc<Mutex<Option<Arc<dyn AlertSink>>>>,
}

impl CircuitBreaker {
    /// Creates a new closed breaker.
    #[must_use]
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            inner: Arc::new(Mutex::new(BreakerInner {
                state: CircuitState::Closed,
                failure_count: 0,
                consecutive_successes: 0,
                last_failure_at: None,
            })),
            alerts: Arc::new(Mutex::new(None)),
        }
    }

    /// Connects the alert gateway; opening the breaker raises a high alert.
    pub fn set_alert_sink(&self, alerts: Arc<dyn AlertSink>) {
        *self.alerts.lock() = Some(alerts);
    }

    /// Returns the breaker name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the current state, applying the open→half-open transition if
    /// the reset timeout has elapsed.
    #[must_use]
    pub fn state(&self) -> CircuitState {
        let mut inner = self.inner.lock();
        self.refresh(&mut inner);
        inner.state
    }

    /// Returns the current failure count.
    #[must_use]
    pub fn failure_count(&self) -> u32 {
        let inner = self.inner.lock();
        inner.failure_count
    }

    /// Returns a point-in-time snapshot.
    #[must_use]
    pub fn snapshot(&self) -> BreakerSnapshot {
        let mut inner = self.inner.lock();
        self.refresh(&mut inner);
        BreakerSnapshot {
            name: self.name.clone(),
            state: inner.state.as_str().to_string(),
            failures: inner.failure_count,
        }
    }

    /// Checks whether a call may proceed right now.
    ///
    /// While open, returns false until the reset timeout has elapsed, at
    /// which point the breaker moves to half-open and the call is allowed.
    #[must_use]
    pub fn can_execute(&self) -> bool {
        let mut inner = self.inner.lock();
        self.refresh(&mut inner);
        inner.state != CircuitState::Open
    }

    /// Applies the open→half-open transition when the timeout has elapsed.
    fn refresh(&self, inner: &mut BreakerInner) {
        if inner.state == CircuitState::Open {
            let elapsed = inner
                .last_failure_at
                .is_some_and(|at| at.elapsed() >= self.config.reset_timeout);
            if elapsed {
                inner.state = CircuitState::HalfOpen;
                inner.consecutive_successes = 0;
                info!(breaker = %self.name, "circuit breaker half-open, probing");
            }
        }
    }

    /// Records a successful operation.
    pub fn record_success(&self) {
        let mut inner = self.inner.lock();
        match inner.state {
            CircuitState::Closed => {
                inner.failure_count = 0;
                inner.consecutive_successes = 0;
            }
            CircuitState::HalfOpen => {
                inner.consecutive_successes += 1;
                if inner.consecutive_successes >= self.config.success_threshold {
                    inner.state = CircuitState::Closed;
                    inner.failure_count = 0;
                    inner.consecutive_successes = 0;
                    info!(breaker = %self.name, "circuit breaker closed, service recovered");
                }
            }
            CircuitState::Open => {}
        }
    }

    /// Records a failed operation.
    pub fn record_failure(&self) {
        let opened = {
            let mut inner = self.inner.lock();
            inner.last_failure_at = Some(Instant::now());
            inner.consecutive_successes = 0;

            match inner.state {
                CircuitState::Closed => {
                    inner.failure_count += 1;
                    if inner.failure_count >= self.config.failure_threshold {
                        inner.state = CircuitState::Open;
                        Some(inner.failure_count)
                    } else {
                        None
                    }
                }
                CircuitState::HalfOpen => {
                    inner.failure_count += 1;
                    inner.state = CircuitState::Open;
                    Some(inner.failure_count)
                }
                CircuitState::Open => None,
            }
        };

        if let Some(failures) = opened {
            error!(breaker = %self.name, failures, "circuit breaker opened");
            let alerts = self.alerts.lock().clone();
            if let Some(alerts) = alerts {
                alerts.raise(
                    NewAlert::new(
                        "circuit-breaker",
                        AlertSeverity::High,
                        format!("circuit breaker '{}' opened", self.name),
                        format!("operation '{}' failed {failures} consecutive times", self.name),
                        "resilience",
                    )
                    .meta("breaker", self.name.clone())
                    .meta("failures", failures.to_string()),
                );
            }
        }
    }

    /// Runs one operation through the breaker.
    ///
    /// Fails fast with [`ResilienceError::CircuitOpen`] while the breaker is
    /// open, without invoking the operation.
    ///
    /// # Errors
    ///
    /// Returns `CircuitOpen` when rejected, or `Operation` wrapping the
    /// operation's own error.
    pub async fn execute<T, E, Fut>(&self, op: Fut) -> Result<T, E>
    where
        E: std::error::Error + 'static,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        if !self.can_execute() {
            return Err(ResilienceError::CircuitOpen {
                name: self.name.clone(),
            });
        }

        match op.await {
            Ok(value) => {
                self.record_success();
                Ok(value)
            }
            Err(e) => {
                self.record_failure();
                Err(ResilienceError::Operation(e))
            }
        }
    }
}

impl Clone for CircuitBreaker {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            config: self.config,
            inner: Arc::clone(&self.inner),
            alerts: Arc::clone(&self.alerts),
        }
    }
}

impl std::fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("CircuitBreaker")
            .field("name", &self.name)
            .field("state", &inner.state)
            .field("failure_count", &inner.failure_count)
            .finish_non_exhaustive()
    }
}

/// Registry of breakers, lazily created and cached by name.
///
/// Cloning shares the underlying table.
#[derive(Default)]
pub struct BreakerRegistry {
    breakers: Arc<Mutex<HashMap<String, CircuitBreaker>>>,
    alerts: Arc<Mutex<Option<Arc<dyn AlertSink>>>>,
}

impl BreakerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Connects the alert gateway applied to every breaker created here.
    pub fn set_alert_sink(&self, alerts: Arc<dyn AlertSink>) {
        *self.alerts.lock() = Some(alerts);
    }

    /// Returns the breaker registered under `name`, creating it with the
    /// given configuration on first use.
    ///
    /// A configuration passed for an existing breaker is ignored; the
    /// breaker keeps the configuration it was created with.
    #[must_use]
    pub fn breaker(&self, name: &str, config: Option<CircuitBreakerConfig>) -> CircuitBreaker {
        let mut breakers = self.breakers.lock();
        breakers
            .entry(name.to_string())
            .or_insert_with(|| {
                let breaker = CircuitBreaker::new(name, config.unwrap_or_default());
                if let Some(alerts) = self.alerts.lock().clone() {
                    breaker.set_alert_sink(alerts);
                }
                breaker
            })
            .clone()
    }

    /// Returns the breaker registered under `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<CircuitBreaker> {
        let breakers = self.breakers.lock();
        breakers.get(name).cloned()
    }

    /// Returns a snapshot of every breaker.
    #[must_use]
    pub fn snapshots(&self) -> Vec<BreakerSnapshot> {
        let breakers = self.breakers.lock();
        let mut snapshots: Vec<BreakerSnapshot> =
            breakers.values().map(CircuitBreaker::snapshot).collect();
        snapshots.sort_by(|a, b| a.name.cmp(&b.name));
        snapshots
    }

    /// Returns the number of breakers.
    #[must_use]
    pub fn len(&self) -> usize {
        let breakers = self.breakers.lock();
        breakers.len()
    }

    /// Returns true if no breakers exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Clone for BreakerRegistry {
    fn clone(&self) -> Self {
        Self {
            breakers: Arc::clone(&self.breakers),
            alerts: Arc::clone(&self.alerts),
        }
    }
}

impl std::fmt::Debug for BreakerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BreakerRegistry")
            .field("breakers", &self.len())
            .finish_non_exhaustive()
    }
}
