// Re-export helpers so tests can `use helpers::*;`
pub mod recording_fetcher;

use std::str::FromStr;
use std::sync::Arc;

pub use recording_fetcher::RecordingFetcher;

use ratecache::{Decimal, RateCache, RateFetcher, RateSample};

/// Granularity used across tests.
pub const G: u64 = 60;

/// 2023-11-14T22:13:20Z, a convenient non-aligned anchor.
#[allow(dead_code)]
pub const T0: u64 = 1_700_000_000;

/// Parse a decimal literal without unwrap noise in tests.
pub fn rate(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

#[allow(dead_code)]
pub fn sample(ts: u64, r: &str) -> RateSample {
    RateSample::new(ts, rate(r))
}

/// Engine with `G = 60`, the given batch size and limiter factor, defaults elsewhere.
pub fn cache_with(fetcher: Arc<dyn RateFetcher>, points_per_batch: u64, factor: u64) -> RateCache {
    RateCache::builder()
        .with_fetcher(fetcher)
        .granularity_secs(G)
        .points_per_batch(points_per_batch)
        .rate_limit_factor(factor)
        .build()
        .expect("valid test config")
}
