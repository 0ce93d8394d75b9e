use std::sync::Arc;
use std::time::Duration;

use ratecache_core::{QuotaConfig, QuotaConsumptionStrategy, RateCacheError, RateFetcher};
use ratecache_middleware::FetcherBuilder as GenericFetcherBuilder;

use crate::CoinbaseFetcher;

/// Builder type alias specialized for Coinbase fetchers.
pub type CoinbaseFetcherBuilder = GenericFetcherBuilder;

impl CoinbaseFetcher {
    /// Returns an unconfigured builder around a default fetcher for `product`.
    ///
    /// # Errors
    /// Returns `InvalidArg` for a malformed product id.
    pub fn builder(product: impl Into<String>) -> Result<CoinbaseFetcherBuilder, RateCacheError> {
        let raw: Arc<dyn RateFetcher> = Arc::new(Self::try_new(product)?);
        Ok(GenericFetcherBuilder::new(raw))
    }

    /// Returns a builder with a conservative outbound budget.
    ///
    /// The public candles endpoint allows roughly ten requests per second per
    /// IP; this stays well below it at 600 batch fetches per hour.
    ///
    /// # Errors
    /// Returns `InvalidArg` for a malformed product id.
    pub fn rate_limited(
        product: impl Into<String>,
    ) -> Result<CoinbaseFetcherBuilder, RateCacheError> {
        let cfg = QuotaConfig {
            limit: 600,
            window: Duration::from_secs(60 * 60),
            strategy: QuotaConsumptionStrategy::Unit,
        };
        Ok(Self::builder(product)?.with_quota(&cfg))
    }
}
