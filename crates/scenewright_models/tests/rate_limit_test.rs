//! Tests for rate limiting and retry behavior.

use scenewright_error::{GeminiError, GeminiErrorKind};
use scenewright_models::{RateLimiter, RetryPolicy};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn fast_retry(max_retries: usize) -> RetryPolicy {
    RetryPolicy {
        no_retry: false,
        max_retries: Some(max_retries),
        backoff_ms: Some(1),
    }
}

fn http(status_code: u16) -> GeminiError {
    GeminiError::new(GeminiErrorKind::HttpError {
        status_code,
        message: "test".to_string(),
    })
}

#[tokio::test]
async fn test_transient_error_is_retried_until_success() {
    let limiter = RateLimiter::new(None, None, fast_retry(3));
    let attempts = Arc::new(AtomicUsize::new(0));

    let result = limiter
        .execute(|| {
            let attempts = attempts.clone();
            async move {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                if n < 2 { Err(http(503)) } else { Ok("done") }
            }
        })
        .await;

    assert_eq!(result.unwrap(), "done");
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_permanent_error_fails_immediately() {
    let limiter = RateLimiter::new(None, None, fast_retry(3));
    let attempts = Arc::new(AtomicUsize::new(0));

    let result: Result<(), GeminiError> = limiter
        .execute(|| {
            let attempts = attempts.clone();
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(http(400))
            }
        })
        .await;

    assert!(result.is_err());
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_retry_gives_up_after_max_retries() {
    let limiter = RateLimiter::new(None, None, fast_retry(2));
    let attempts = Arc::new(AtomicUsize::new(0));

    let result: Result<(), GeminiError> = limiter
        .execute(|| {
            let attempts = attempts.clone();
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(http(429))
            }
        })
        .await;

    let err = result.unwrap_err();
    assert!(matches!(
        err.kind,
        GeminiErrorKind::HttpError {
            status_code: 429,
            ..
        }
    ));
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_no_retry_policy_disables_retries() {
    let limiter = RateLimiter::unlimited();
    let attempts = Arc::new(AtomicUsize::new(0));

    let result: Result<(), GeminiError> = limiter
        .execute(|| {
            let attempts = attempts.clone();
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(http(503))
            }
        })
        .await;

    assert!(result.is_err());
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_concurrency_limit_is_enforced() {
    let limiter = RateLimiter::new(None, Some(2), RetryPolicy::default());
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let tasks = (0..6).map(|_| {
        let limiter = limiter.clone();
        let in_flight = in_flight.clone();
        let peak = peak.clone();
        async move {
            limiter
                .execute(|| {
                    let in_flight = in_flight.clone();
                    let peak = peak.clone();
                    async move {
                        let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                        in_flight.fetch_sub(1, Ordering::SeqCst);
                        Ok::<_, GeminiError>(())
                    }
                })
                .await
        }
    });

    for result in futures::future::join_all(tasks).await {
        assert!(result.is_ok());
    }
    assert!(peak.load(Ordering::SeqCst) <= 2);
    assert!(peak.load(Ordering::SeqCst) >= 1);
}
