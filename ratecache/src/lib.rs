//! ratecache keeps a time-bucketed cache of price samples for one product and
//! fills its gaps in the background at a throttled rate.
//!
//! Overview
//! - Range queries ([`RateCache::get_rates`]) answer from the cache immediately,
//!   downsampled along a ladder of strides so responses stay under `max_points`.
//! - Every missing bucket schedules the fetch batch that covers it. Batches are
//!   `granularity_secs * points_per_batch` wide and deduplicated.
//! - A tick driver ([`Ticker`]) allows one dispatch every `rate_limit_factor`
//!   ticks. Each dispatch pops the oldest batch and fetches it unless its first
//!   bucket is already cached.
//!
//! Key behaviors and trade-offs
//! - Non-blocking queries: a first query over an uncached range returns an
//!   empty (or partial) answer; repeating it later returns more as batches land.
//! - Bounded outbound cost: at most one fetch per `rate_limit_factor` ticks, each
//!   capped at `max_response_bytes(points_per_batch)` bytes. Wrap the fetcher with
//!   [`FetcherBuilder`] to add an hourly quota on top.
//! - No retries: a failed fetch is logged and dropped; a later query over the
//!   same range schedules it again.
//! - Append-only: the first value written for a bucket wins and nothing is evicted.
//!
//! Examples
//! ```rust,ignore
//! use std::sync::Arc;
//! use ratecache::RateCache;
//! use ratecache_mock::MockFetcher;
//!
//! let cache = RateCache::builder()
//!     .with_fetcher(Arc::new(MockFetcher::new()))
//!     .rate_limit_factor(5)
//!     .build()?;
//! let ticker = cache.spawn_ticker();
//!
//! let resp = cache.get_rates(1_700_000_000, 1_700_086_400)?;
//! println!("{} samples every {}s", resp.rates.len(), resp.interval);
//!
//! ticker.stop().await;
//! ```
//!
//! See `demos/examples/` for runnable end-to-end demonstrations.
#![warn(missing_docs)]

pub(crate) mod core;
mod engine;

pub use crate::core::{RateCache, RateCacheBuilder};
pub use engine::dispatch::{DispatchOutcome, TickOutcome};
pub use engine::limiter::step as limiter_step;
pub use engine::ticker::Ticker;

pub use ratecache_middleware::{FetcherBuilder, QuotaAwareFetcher, QuotaMiddleware};

// Re-export core types for convenience
pub use ratecache_core::{
    BYTES_PER_SAMPLE, CacheConfig, CacheStats, DEFAULT_LADDER, Decimal, FetchWindow, QuotaConfig,
    QuotaConsumptionStrategy, QuotaState, Rate, RateCacheError, RateFetcher, RateSample,
    RatesResponse, TaskHandle, Timestamp, align_down, batch_start, max_response_bytes,
    sample_with_ladder, select_stride,
};
