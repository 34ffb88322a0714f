//! Reusable retry with linear backoff.
//!
//! One policy object is shared by every upstream fetch site so transient
//! failures are handled the same way everywhere.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Retry policy as plain data: how often to try and how long to back off.
///
/// Backoff is linear in the failure count: `base`, `2*base`, `3*base`, …
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_base: Duration,
}

impl RetryPolicy {
    pub fn linear(max_attempts: u32, backoff_base: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_base,
        }
    }

    /// Delay before the attempt following the given failure count.
    pub fn backoff_for(&self, failures: u32) -> Duration {
        self.backoff_base * failures
    }
}

impl Default for RetryPolicy {
    /// Three attempts with 1s, 2s waits between them.
    fn default() -> Self {
        Self::linear(3, Duration::from_secs(1))
    }
}

/// Runs `operation` until it succeeds or the policy's attempts are exhausted,
/// sleeping the policy's backoff between attempts. Returns the final error on
/// exhaustion.
pub async fn with_retry<T, E, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut failures = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                failures += 1;
                if failures >= policy.max_attempts {
                    return Err(err);
                }
                let delay = policy.backoff_for(failures);
                warn!(
                    attempt = failures,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "attempt failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
