//! Retry manager with exponential backoff
//!
//! Wraps GDC requests so that transient failures (connection resets,
//! timeouts, 5xx responses) are attempted again after waiting
//! `base * 2^n` milliseconds, capped at `max_delay_ms`.

use crate::errors::{FetchError, Result};
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Default number of attempts (including the first one)
pub const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (1 second)
const BASE_DELAY_MS: u64 = 1000;

/// Maximum delay cap (16 seconds)
const MAX_DELAY_MS: u64 = 16000;

/// Retry manager with exponential backoff
#[derive(Debug, Clone)]
pub struct RetryManager {
    /// Maximum attempts
    max_retries: u32,

    /// Base delay in milliseconds
    base_delay_ms: u64,

    /// Maximum delay cap in milliseconds
    max_delay_ms: u64,

    /// Enable jitter
    enable_jitter: bool,
}

impl Default for RetryManager {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryManager {
    /// Create new retry manager: 3 attempts, waits of 1s then 2s
    pub fn new() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            base_delay_ms: BASE_DELAY_MS,
            max_delay_ms: MAX_DELAY_MS,
            enable_jitter: false,
        }
    }

    /// Create retry manager with custom settings
    pub fn with_config(max_retries: u32, base_delay_ms: u64) -> Self {
        Self {
            max_retries: max_retries.max(1),
            base_delay_ms,
            max_delay_ms: MAX_DELAY_MS,
            enable_jitter: false,
        }
    }

    /// Enable ±25% random variation on each delay
    pub fn with_jitter(mut self, enable: bool) -> Self {
        self.enable_jitter = enable;
        self
    }

    /// Execute operation with retry logic.
    ///
    /// Non-transient errors are returned immediately. Once attempts are
    /// exhausted the last error is returned unchanged.
    pub async fn execute_with_retry<F, Fut, T>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if !self.is_retryable(&e) {
                        return Err(e);
                    }

                    attempt += 1;
                    if attempt >= self.max_retries {
                        return Err(e);
                    }

                    let delay = self.calculate_delay(attempt - 1);
                    warn!(
                        attempt,
                        max = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "Request failed, retrying: {}",
                        e
                    );
                    sleep(delay).await;
                }
            }
        }
    }

    /// Calculate delay before the retry following failed attempt `attempt` (0-based)
    fn calculate_delay(&self, attempt: u32) -> Duration {
        let exponential_delay = self
            .base_delay_ms
            .saturating_mul(2u64.saturating_pow(attempt));
        let delay_ms = exponential_delay.min(self.max_delay_ms);

        let final_delay = if self.enable_jitter {
            let jitter = (delay_ms / 4) as i64;
            let random_jitter = (rand::random::<f64>() * 2.0 - 1.0) * jitter as f64;
            ((delay_ms as i64) + random_jitter as i64).max(0) as u64
        } else {
            delay_ms
        };

        Duration::from_millis(final_delay)
    }

    fn is_retryable(&self, error: &FetchError) -> bool {
        error.is_transient()
    }

    /// Get max attempts
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }
}
