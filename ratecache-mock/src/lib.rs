//! Mock fetchers for CI-safe tests and demos.
//!
//! - [`MockFetcher`]: deterministic synthetic prices from static fixtures.
//! - [`DynamicMockFetcher`]: behavior scripted at runtime through a controller.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use ratecache_core::{FetchWindow, RateCacheError, RateFetcher, RateSample};

mod dynamic;
mod fixtures;

pub use dynamic::{DynamicMockController, DynamicMockFetcher, MockBehavior};
pub use fixtures::rates::{batch as fixture_batch, rate_at as fixture_rate};

/// Mock fetcher for CI-safe demos. Provides deterministic data from static fixtures.
pub struct MockFetcher {
    failure: Option<String>,
    latency: Option<Duration>,
    calls: AtomicUsize,
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFetcher {
    /// A fetcher that always succeeds immediately.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            failure: None,
            latency: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// A fetcher whose every call fails with a `Connector` error carrying `msg`.
    #[must_use]
    pub fn failing(msg: impl Into<String>) -> Self {
        Self {
            failure: Some(msg.into()),
            ..Self::new()
        }
    }

    /// Delay every response by `latency` (uses the Tokio clock, so paused time applies).
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of `fetch` calls observed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RateFetcher for MockFetcher {
    fn name(&self) -> &'static str {
        "ratecache-mock"
    }

    async fn fetch(&self, window: FetchWindow) -> Result<Vec<RateSample>, RateCacheError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if let Some(msg) = &self.failure {
            return Err(RateCacheError::connector(
                "ratecache-mock",
                format!("forced failure at {}: {msg}", window.start),
            ));
        }
        Ok(fixtures::rates::batch(window))
    }
}
