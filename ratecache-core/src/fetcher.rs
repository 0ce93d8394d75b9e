use async_trait::async_trait;

use crate::{FetchWindow, RateCacheError, RateSample};

/// Byte budget reserved per requested sample when capping provider responses.
///
/// A candle row is six numeric fields; ten bytes per field is a generous bound.
pub const BYTES_PER_SAMPLE: u64 = 10 * 6;

/// Upper bound on the response body size for a fetch of `points` samples.
///
/// Fetchers must refuse bodies larger than this so that outbound cost is
/// statically bounded by the batch size.
#[must_use]
pub const fn max_response_bytes(points: u64) -> u64 {
    points.saturating_mul(BYTES_PER_SAMPLE)
}

/// Typed key identifying a fetcher in logs and middleware introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetcherKey(pub &'static str);

impl FetcherKey {
    /// Construct a new typed fetcher key from a static name.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Returns the inner static string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

/// Remote data provider consumed by the dispatcher.
///
/// One call retrieves a single batch window for the fixed product the fetcher
/// was configured with.
#[async_trait]
pub trait RateFetcher: Send + Sync {
    /// Stable name used in errors and logs.
    fn name(&self) -> &'static str;

    /// Typed key derived from [`name`](Self::name).
    fn key(&self) -> FetcherKey {
        FetcherKey::new(self.name())
    }

    /// Fetch `window.points()` samples spaced `window.granularity_secs` apart
    /// covering `[window.start, window.end)`.
    ///
    /// # Errors
    /// Returns a fetch-path error (`Connector`, `Data`, `FetchTimeout`,
    /// `QuotaExceeded`) when the provider cannot serve the window.
    async fn fetch(&self, window: FetchWindow) -> Result<Vec<RateSample>, RateCacheError>;
}
