//! Rate-limited dispatcher.
//!
//! A tick is split in two halves. [`RateCache::tick`] takes the dispatch
//! decision synchronously under the engine lock: count the tick, pop the oldest
//! job, drop it if its start bucket is already cached. [`RateCache::fetch_window`]
//! then performs the fetch without holding the lock, so a slow provider never
//! blocks range queries or later ticks.

use ratecache_core::{FetchWindow, RateCacheError, RateSample, Timestamp, align_down};

use crate::RateCache;

/// Result of one counted tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The limiter did not allow a dispatch on this tick.
    Throttled,
    /// Dispatch was allowed but no job was pending.
    Idle,
    /// The popped job's start bucket was already cached; no fetch is needed.
    AlreadyCached(Timestamp),
    /// The popped job must be fetched.
    Dispatch(FetchWindow),
}

/// Result of fetching one dispatched window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The fetch succeeded and `inserted` new buckets were cached.
    Fetched {
        /// Batch start that was fetched.
        job: Timestamp,
        /// Buckets newly populated by this fetch.
        inserted: usize,
    },
    /// The fetch failed or timed out. The job is not re-enqueued.
    Failed {
        /// Batch start that was attempted.
        job: Timestamp,
        /// Error reported by the fetcher or the timeout.
        error: RateCacheError,
    },
}

impl RateCache {
    /// Count one tick and, if the limiter allows it, pop the next job.
    ///
    /// Never waits. A [`TickOutcome::Dispatch`] must be passed to
    /// [`fetch_window`](Self::fetch_window) to actually populate the cache.
    pub fn tick(&self) -> TickOutcome {
        let mut st = self.lock();
        if !st.limiter.advance() {
            return TickOutcome::Throttled;
        }
        let Some(job) = st.jobs.pop() else {
            #[cfg(feature = "tracing")]
            tracing::debug!("dispatch allowed but no job pending");
            return TickOutcome::Idle;
        };
        if st.store.contains(job) {
            #[cfg(feature = "tracing")]
            tracing::debug!(job, "job already cached; skipping fetch");
            return TickOutcome::AlreadyCached(job);
        }
        drop(st);
        TickOutcome::Dispatch(self.window_for(job))
    }

    /// Fetch `window` and cache every returned sample that lies inside it.
    ///
    /// Samples are aligned down to the granularity and never overwrite an
    /// existing bucket. Failures are logged and reported, never retried.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "ratecache::dispatch::fetch_window",
            skip(self),
            fields(fetcher = self.fetcher.name(), job = window.start),
        )
    )]
    pub async fn fetch_window(&self, window: FetchWindow) -> DispatchOutcome {
        let job = window.start;
        match self.fetch_with_timeout(window).await {
            Ok(samples) => {
                let inserted = self.store_window(&window, samples);
                #[cfg(feature = "tracing")]
                tracing::debug!(job, inserted, "batch cached");
                DispatchOutcome::Fetched { job, inserted }
            }
            Err(error) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(job, error = %error, "batch fetch failed; job dropped");
                DispatchOutcome::Failed { job, error }
            }
        }
    }

    /// Run one tick to completion, awaiting the fetch if one is dispatched.
    ///
    /// Returns `None` when the tick was throttled, idle, or skipped as already
    /// cached. The tick driver does not use this; it spawns the fetch instead.
    pub async fn run_tick(&self) -> Option<DispatchOutcome> {
        match self.tick() {
            TickOutcome::Dispatch(window) => Some(self.fetch_window(window).await),
            TickOutcome::Throttled | TickOutcome::Idle | TickOutcome::AlreadyCached(_) => None,
        }
    }

    fn store_window(&self, window: &FetchWindow, samples: Vec<RateSample>) -> usize {
        let g = self.cfg.granularity_secs;
        let mut st = self.lock();
        samples
            .into_iter()
            .filter(|s| window.contains(s.timestamp))
            .filter(|s| {
                st.store
                    .insert(RateSample::new(align_down(s.timestamp, g), s.rate))
            })
            .count()
    }
}
