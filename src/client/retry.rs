//! Retry policy with exponential backoff and jitter

use rand::Rng;
use std::future::Future;
use std::time::Duration;

use crate::error::Result;

/// Default number of attempts (first try + 3 retries)
pub const DEFAULT_MAX_ATTEMPTS: u32 = 4;

/// Default delay before the first retry
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(1000);

/// Default jitter ratio; jitter is uniform in `[0, ratio * delay]`
pub const DEFAULT_JITTER_RATIO: f64 = 0.3;

/// Position of one attempt within a retry run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attempt {
    /// Zero-based attempt index
    pub index: u32,
    /// No further attempt follows this one
    pub is_last: bool,
}

impl Attempt {
    /// A lone attempt outside any retry run
    pub fn single() -> Self {
        Self {
            index: 0,
            is_last: true,
        }
    }
}

/// Retry policy for memory service requests
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_delay: Duration,
    jitter_ratio: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay: DEFAULT_INITIAL_DELAY,
            jitter_ratio: DEFAULT_JITTER_RATIO,
        }
    }
}

impl RetryPolicy {
    /// Create a policy; `max_attempts` is clamped to at least 1
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay,
            jitter_ratio: DEFAULT_JITTER_RATIO,
        }
    }

    /// Single attempt, no retries
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Set jitter ratio (clamped to `[0, 1]`)
    pub fn with_jitter_ratio(mut self, ratio: f64) -> Self {
        self.jitter_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Backoff before jitter: `initial_delay * 2^attempt_index`
    pub fn base_delay(&self, attempt_index: u32) -> Duration {
        self.initial_delay
            .saturating_mul(2u32.saturating_pow(attempt_index))
    }

    /// Backoff with jitter uniform in `[0, jitter_ratio * base]`
    pub fn delay_for(&self, attempt_index: u32) -> Duration {
        let base = self.base_delay(attempt_index);
        if self.jitter_ratio <= 0.0 || base.is_zero() {
            return base;
        }
        let factor = rand::thread_rng().gen_range(0.0..=self.jitter_ratio);
        base + base.mul_f64(factor)
    }

    /// Run `operation` until it succeeds, fails fatally, or attempts run out.
    ///
    /// Each call receives its [`Attempt`] so the final try can skip waits
    /// nobody will act on. The error of the last attempt is returned.
    /// Rate-limit failures have already served their wait inside the
    /// executor, so no extra backoff is added after them.
    pub async fn run<F, Fut, T>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut(Attempt) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut index: u32 = 0;
        loop {
            let attempt = Attempt {
                index,
                is_last: index + 1 >= self.max_attempts,
            };
            let err = match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };

            if !err.is_retryable() {
                tracing::debug!(kind = err.kind(), "Non-retryable failure: {}", err);
                return Err(err);
            }

            if attempt.is_last {
                tracing::warn!(attempts = index + 1, "Retries exhausted: {}", err);
                return Err(err);
            }

            let delay = if err.already_waited() {
                Duration::ZERO
            } else {
                self.delay_for(index)
            };
            index += 1;
            tracing::warn!(
                attempt = index,
                max_attempts = self.max_attempts,
                backoff_ms = delay.as_millis() as u64,
                "Request failed, retrying: {}",
                err
            );
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Run `operation` under the default policy
pub async fn with_retry<F, Fut, T>(operation: F) -> Result<T>
where
    F: FnMut(Attempt) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    RetryPolicy::default().run(operation).await
}
