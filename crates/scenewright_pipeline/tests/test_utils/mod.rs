//! Test utilities for pipeline tests.
//!
//! This module provides a mock generative driver and polling helpers.

pub mod mock_driver;

#[allow(unused_imports)]
pub use mock_driver::{MockDriver, MockFailure, RecordedRequest, RequestKind, THUMBNAIL_PROMPT};

use std::time::Duration;

/// Poll `condition` until it holds, panicking after two seconds.
#[allow(dead_code)]
pub async fn wait_until<F, Fut>(mut condition: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..400 {
        if condition().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached within two seconds");
}
