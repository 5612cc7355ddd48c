//! Retry with linear backoff.

use std::future::Future;
use std::time::Duration;

use crate::error::CodexError;

/// Retry policy configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; `0` means a single attempt.
    pub max_retries: u32,
    /// Delay after the first failed attempt; attempt `n` waits `n × base_delay`.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Delay to sleep after failed attempt number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }

    /// Execute an async operation with retry.
    ///
    /// The operation receives the 1-based attempt number. Non-retryable
    /// errors are returned as-is on the first occurrence; retryable errors
    /// that outlast every attempt come back wrapped in
    /// [`CodexError::Transport`].
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> Result<T, CodexError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, CodexError>>,
    {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => {
                    if attempt > self.max_retries {
                        return Err(CodexError::transport(attempt, e));
                    }

                    let delay = self.delay_for(attempt);
                    tracing::warn!(
                        attempt,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Retrying after transport error"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
