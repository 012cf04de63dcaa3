//! Retry with exponential backoff and jitter.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::{error, warn};

use crate::error::{ResilienceError, Result};

/// Retry configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of retries after the initial attempt.
    pub max_retries: u32,
    /// Base delay; attempt `n` waits `base_delay * 2^n` plus jitter.
    pub base_delay: Duration,
    /// Upper bound on the random jitter added to each delay.
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            max_jitter: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with the given retry count and base delay.
    #[must_use]
    pub const fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            max_jitter: Duration::from_millis(1000),
        }
    }

    /// Returns the backoff delay for a zero-indexed attempt, jitter included.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exp = self.base_delay.saturating_mul(1_u32 << attempt.min(16));
        let jitter_ms = if self.max_jitter.is_zero() {
            0
        } else {
            rand::thread_rng().gen_range(0..=self.max_jitter.as_millis() as u64)
        };
        exp + Duration::from_millis(jitter_ms)
    }
}

/// Retries an asynchronous operation with exponential backoff.
///
/// The operation runs once plus up to `max_retries` more times. Intermediate
/// failures are logged at `warn`; exhausting every attempt logs the full
/// attempt count and returns [`ResilienceError::RetryExhausted`] wrapping the
/// last error. There is no overall deadline; callers needing one must impose
/// it externally.
///
/// # Errors
///
/// Returns `RetryExhausted` when every attempt failed.
pub async fn retry_with_backoff<T, E, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T, E>
where
    E: std::error::Error + 'static,
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
{
    let mut attempt: u32 = 0;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if attempt >= policy.max_retries {
                    let attempts = attempt + 1;
                    error!(attempts, error = %e, "retries exhausted");
                    return Err(ResilienceError::RetryExhausted {
                        attempts,
                        last: Box::new(ResilienceError::Operation(e)),
                    });
                }

                let delay = policy.delay_for_attempt(attempt);
                warn!(
                    attempt = attempt + 1,
                    max_attempts = policy.max_retries + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "operation failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
