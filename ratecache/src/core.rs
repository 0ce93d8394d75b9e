use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use ratecache_core::{
    CacheConfig, CacheStats, FetchWindow, Rate, RateCacheError, RateFetcher, RateSample,
    Timestamp, align_down,
};

use crate::engine::EngineState;

/// Time-bucketed rate cache with a throttled backfill scheduler.
///
/// Cloning is cheap and every clone shares the same cache, pending set and
/// limiter. The tick driver holds one clone and in-flight fetches hold others.
#[derive(Clone)]
pub struct RateCache {
    pub(crate) state: Arc<Mutex<EngineState>>,
    pub(crate) fetcher: Arc<dyn RateFetcher>,
    pub(crate) cfg: Arc<CacheConfig>,
}

/// Builder for constructing a [`RateCache`] with custom configuration.
pub struct RateCacheBuilder {
    fetcher: Option<Arc<dyn RateFetcher>>,
    cfg: CacheConfig,
}

impl Default for RateCacheBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RateCacheBuilder {
    /// Create a new builder with the default [`CacheConfig`].
    ///
    /// Defaults: one-minute granularity, 200-point batches, one dispatch every
    /// 5 ticks of 2 seconds, 100 000 point responses, 30 second fetch timeout.
    #[must_use]
    pub fn new() -> Self {
        Self {
            fetcher: None,
            cfg: CacheConfig::default(),
        }
    }

    /// Set the provider used to backfill missing batches.
    ///
    /// Wrap it with `FetcherBuilder` first to add quota accounting.
    #[must_use]
    pub fn with_fetcher(mut self, fetcher: Arc<dyn RateFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, cfg: CacheConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Cache granularity `G` in seconds.
    #[must_use]
    pub const fn granularity_secs(mut self, secs: u64) -> Self {
        self.cfg.granularity_secs = secs;
        self
    }

    /// Samples requested per fetch.
    ///
    /// Larger batches mean fewer outbound calls but a larger response byte cap.
    #[must_use]
    pub const fn points_per_batch(mut self, points: u64) -> Self {
        self.cfg.points_per_batch = points;
        self
    }

    /// Allow one dispatch every `factor` ticks.
    #[must_use]
    pub const fn rate_limit_factor(mut self, factor: u64) -> Self {
        self.cfg.rate_limit_factor = factor;
        self
    }

    /// Exclusive ceiling on the number of points in a range-query response.
    #[must_use]
    pub const fn max_points(mut self, max_points: u64) -> Self {
        self.cfg.max_points = max_points;
        self
    }

    /// Candidate sampling strides in multiples of the granularity, ascending.
    #[must_use]
    pub fn ladder(mut self, ladder: Vec<u64>) -> Self {
        self.cfg.ladder = ladder;
        self
    }

    /// Upper bound on a single provider fetch.
    #[must_use]
    pub const fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.fetch_timeout = timeout;
        self
    }

    /// Period used by [`RateCache::spawn_ticker`].
    #[must_use]
    pub const fn tick_period(mut self, period: Duration) -> Self {
        self.cfg.tick_period = period;
        self
    }

    /// Build the engine with empty cache, pending set and limiter.
    ///
    /// # Errors
    /// Returns `InvalidArg` if no fetcher was registered or the configuration
    /// fails [`CacheConfig::validate`].
    pub fn build(self) -> Result<RateCache, RateCacheError> {
        let Some(fetcher) = self.fetcher else {
            return Err(RateCacheError::invalid_arg(
                "no fetcher registered; add one via with_fetcher(...)",
            ));
        };
        self.cfg.validate()?;
        Ok(RateCache {
            state: Arc::new(Mutex::new(EngineState::new(&self.cfg))),
            fetcher,
            cfg: Arc::new(self.cfg),
        })
    }
}

impl RateCache {
    /// Start building a new `RateCache`.
    #[must_use]
    pub fn builder() -> RateCacheBuilder {
        RateCacheBuilder::new()
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &CacheConfig {
        &self.cfg
    }

    /// Name of the backing fetcher.
    #[must_use]
    pub fn fetcher_name(&self) -> &'static str {
        self.fetcher.name()
    }

    // A panic while holding the lock leaves the maps structurally valid, so
    // poisoning is ignored.
    pub(crate) fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Window `[job, job + BATCH)` fetched for a pending job.
    #[must_use]
    pub fn window_for(&self, job: Timestamp) -> FetchWindow {
        FetchWindow {
            start: job,
            end: job.saturating_add(self.cfg.batch_secs()),
            granularity_secs: self.cfg.granularity_secs,
        }
    }

    /// Point-in-time counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let st = self.lock();
        CacheStats {
            cached_points: st.store.len(),
            pending_jobs: st.jobs.len(),
            limiter_counter: st.limiter.counter(),
        }
    }

    /// Pending batch starts in dispatch order.
    #[must_use]
    pub fn pending_jobs(&self) -> Vec<Timestamp> {
        self.lock().jobs.snapshot()
    }

    /// Schedule the batch covering `ts` for backfill.
    ///
    /// Returns `false` if that batch was already pending.
    pub fn schedule(&self, ts: Timestamp) -> bool {
        self.lock().jobs.add(ts)
    }

    /// Cached rate for the bucket containing `ts`.
    #[must_use]
    pub fn cached_rate(&self, ts: Timestamp) -> Option<Rate> {
        let key = align_down(ts, self.cfg.granularity_secs);
        self.lock().store.get(key)
    }

    /// Write samples directly into the cache.
    ///
    /// Timestamps are aligned down to the granularity and existing buckets are
    /// left untouched. Returns the number of buckets populated.
    pub fn insert_samples<I>(&self, samples: I) -> usize
    where
        I: IntoIterator<Item = RateSample>,
    {
        let g = self.cfg.granularity_secs;
        let mut st = self.lock();
        samples
            .into_iter()
            .filter(|s| st.store.insert(RateSample::new(align_down(s.timestamp, g), s.rate)))
            .count()
    }

    /// Wrap a fetch with the configured timeout and standardized timeout error mapping.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "ratecache::core::fetch_with_timeout",
            skip(self),
            fields(
                fetcher = self.fetcher.name(),
                start = window.start,
                timeout_ms = u64::try_from(self.cfg.fetch_timeout.as_millis()).unwrap_or(u64::MAX),
            ),
        )
    )]
    pub(crate) async fn fetch_with_timeout(
        &self,
        window: FetchWindow,
    ) -> Result<Vec<RateSample>, RateCacheError> {
        let name = self.fetcher.name();
        (tokio::time::timeout(self.cfg.fetch_timeout, self.fetcher.fetch(window)).await)
            .unwrap_or_else(|_| Err(RateCacheError::fetch_timeout(name)))
    }
}
