use std::sync::Arc;

use ratecache_coinbase::CoinbaseFetcher;
use ratecache_core::{RateCacheError, RateFetcher};

/// Environment variable that switches every demo to the offline mock fetcher.
pub const USE_MOCK_ENV: &str = "RATECACHE_DEMOS_USE_MOCK";

/// Product fetched when running against Coinbase.
pub const PRODUCT: &str = "ICP-USD";

/// Whether demos should stay offline.
#[must_use]
pub fn using_mock() -> bool {
    std::env::var(USE_MOCK_ENV).is_ok()
}

/// Return a fetcher for demos.
///
/// # Errors
/// Returns `InvalidArg` if [`PRODUCT`] is not a valid product id.
pub fn get_fetcher() -> Result<Arc<dyn RateFetcher>, RateCacheError> {
    if using_mock() {
        println!("--- (Using Mock Fetcher for CI) ---");
        Ok(Arc::new(ratecache_mock::MockFetcher::new()))
    } else {
        Ok(CoinbaseFetcher::rate_limited(PRODUCT)?.build())
    }
}

/// Current Unix time in seconds.
#[must_use]
pub fn now() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
}
