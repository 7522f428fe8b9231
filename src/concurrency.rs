//! Bounded access to the remote store
//!
//! Every remote call passes through a [`RemoteGate`]: a semaphore caps the
//! number of calls in flight and a [`RetryPolicy`] retries rate-limited calls
//! with exponential backoff. A permit is held for a single attempt only, so a
//! call waiting out its backoff does not block other callers.

use crate::error::ApiError;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Default number of remote calls allowed in flight
pub const DEFAULT_CONCURRENCY: usize = 2;

/// Default number of attempts per remote call
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

/// Default backoff before the first retry, in milliseconds
pub const DEFAULT_BASE_DELAY_MS: u64 = 1000;

/// Retry policy for rate-limited remote calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: usize,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Delay before retrying after the zero-based `attempt` failed.
    pub fn backoff(&self, attempt: usize) -> Duration {
        let factor = 1u32.checked_shl(attempt as u32).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_ATTEMPTS,
            Duration::from_millis(DEFAULT_BASE_DELAY_MS),
        )
    }
}

/// Concurrency gate with retry
#[derive(Debug, Clone)]
pub struct RemoteGate {
    semaphore: Arc<Semaphore>,
    retry: RetryPolicy,
}

impl RemoteGate {
    pub fn new(max_concurrent: usize, retry: RetryPolicy) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
            retry,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Number of permits currently free
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Run `call` under the gate, retrying while it reports a rate limit.
    ///
    /// Any other error is returned immediately. When every attempt was rate
    /// limited the last error is returned.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T, ApiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let mut attempt = 0;
        loop {
            let result = {
                let _permit = self
                    .semaphore
                    .acquire()
                    .await
                    .map_err(|_| ApiError::ConfigError("Remote gate closed".to_string()))?;
                call().await
            };

            match result {
                Err(err) if err.is_rate_limited() && attempt + 1 < self.retry.max_attempts => {
                    let delay = self.retry.backoff(attempt);
                    warn!(
                        operation,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        "Rate limited, backing off"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    if err.is_rate_limited() {
                        debug!(operation, attempts = attempt + 1, "Retries exhausted");
                    }
                    return Err(err);
                }
                Ok(value) => return Ok(value),
            }
        }
    }
}

impl Default for RemoteGate {
    fn default() -> Self {
        Self::new(DEFAULT_CONCURRENCY, RetryPolicy::default())
    }
}
