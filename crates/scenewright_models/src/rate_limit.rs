//! Rate limiting and retry for provider calls.
//!
//! Requests per minute are enforced with governor (GCRA), concurrency with a
//! Tokio semaphore. [`RateLimiter::execute`] wraps an operation with both limits
//! and retries transient failures with exponential backoff and jitter.

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as GovernorRateLimiter};
use scenewright_error::RetryableError;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_retry2::strategy::{ExponentialBackoff, jitter};
use tokio_retry2::{Retry, RetryError};
use tracing::{debug, warn};

type DirectRateLimiter = GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// How transient failures are retried.
///
/// `None` overrides fall back to the failing error's own
/// [`RetryableError::retry_strategy_params`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Never retry
    pub no_retry: bool,
    /// Override for the retry count
    pub max_retries: Option<usize>,
    /// Override for the initial backoff
    pub backoff_ms: Option<u64>,
}

/// Rate limiter shared by every call a client makes.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    rpm_limiter: Option<Arc<DirectRateLimiter>>,
    concurrent_semaphore: Option<Arc<Semaphore>>,
    retry: RetryPolicy,
}

impl RateLimiter {
    /// Create a limiter. `None` leaves that dimension unlimited.
    pub fn new(rpm: Option<u32>, max_concurrent: Option<u32>, retry: RetryPolicy) -> Self {
        let rpm_limiter = rpm.and_then(NonZeroU32::new).map(|n| {
            let quota = Quota::per_minute(n);
            Arc::new(GovernorRateLimiter::direct(quota))
        });

        let concurrent_semaphore = max_concurrent
            .filter(|n| *n > 0)
            .map(|n| Arc::new(Semaphore::new(n as usize)));

        Self {
            rpm_limiter,
            concurrent_semaphore,
            retry,
        }
    }

    /// A limiter that never waits and never retries.
    pub fn unlimited() -> Self {
        Self::new(
            None,
            None,
            RetryPolicy {
                no_retry: true,
                ..RetryPolicy::default()
            },
        )
    }

    /// The retry policy in effect.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Wait until the request may be issued.
    ///
    /// The returned guard holds the concurrency slot until dropped.
    pub async fn acquire(&self) -> RateLimiterGuard {
        if let Some(limiter) = &self.rpm_limiter {
            limiter.until_ready().await;
        }

        // Concurrency slot last, so it is not held while waiting on RPM
        let permit = match &self.concurrent_semaphore {
            Some(semaphore) => semaphore.clone().acquire_owned().await.ok(),
            None => None,
        };

        RateLimiterGuard { _permit: permit }
    }

    /// Execute an operation with rate limiting and automatic retry.
    ///
    /// Every attempt acquires rate limit permission first. A failure whose
    /// [`RetryableError::is_retryable`] is false is returned immediately; a
    /// transient one is retried with exponential backoff and jitter, using the
    /// error's own strategy unless the policy overrides it.
    pub async fn execute<F, Fut, R, E>(&self, operation: F) -> Result<R, E>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<R, E>>,
        E: RetryableError + std::fmt::Display,
    {
        let first = {
            let _guard = self.acquire().await;
            operation().await
        };

        let err = match first {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if self.retry.no_retry || !err.is_retryable() {
            debug!(error = %err, "Not retrying");
            return Err(err);
        }

        let (default_backoff, default_retries, max_delay_secs) = err.retry_strategy_params();
        let backoff_ms = self.retry.backoff_ms.unwrap_or(default_backoff);
        let max_retries = self.retry.max_retries.unwrap_or(default_retries);
        if max_retries == 0 {
            return Err(err);
        }

        warn!(
            error = %err,
            backoff_ms,
            max_retries,
            "Transient error, will retry"
        );

        let mut strategy = ExponentialBackoff::from_millis(backoff_ms)
            .factor(2)
            .max_delay(Duration::from_secs(max_delay_secs))
            .map(jitter)
            .take(max_retries);

        // Retry::spawn attempts immediately; the first failure already happened
        if let Some(delay) = strategy.next() {
            tokio::time::sleep(delay).await;
        }

        Retry::spawn(strategy, || async {
            let _guard = self.acquire().await;
            match operation().await {
                Ok(value) => Ok(value),
                Err(e) if e.is_retryable() => {
                    warn!(error = %e, "Transient error, will retry");
                    Err(RetryError::Transient {
                        err: e,
                        retry_after: None,
                    })
                }
                Err(e) => {
                    warn!(error = %e, "Permanent error, failing immediately");
                    Err(RetryError::Permanent(e))
                }
            }
        })
        .await
    }
}

/// RAII guard for the concurrency slot.
#[derive(Debug)]
pub struct RateLimiterGuard {
    _permit: Option<OwnedSemaphorePermit>,
}
