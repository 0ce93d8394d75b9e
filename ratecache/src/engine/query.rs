use ratecache_core::{
    RateCacheError, RateSample, RatesResponse, Timestamp, bucket_count, buckets,
    sample_with_ladder,
};

use crate::RateCache;

impl RateCache {
    /// Return the cached part of `[start, end]`, downsampled under `max_points`.
    ///
    /// Both bounds are aligned down to the granularity and the aligned range
    /// is inclusive. Every missing bucket schedules the batch covering it; the
    /// call never waits for those fetches, so an immediate retry usually sees
    /// the same answer until the tick driver catches up.
    ///
    /// The whole query runs under one lock acquisition. Sampling happens
    /// before anything is scheduled, so an error leaves the pending set as it
    /// was.
    ///
    /// # Errors
    /// - `InvalidArg` when `start > end`.
    /// - `SamplingLadderExhausted` when even the coarsest ladder stride would
    ///   return `max_points` or more samples, counting every bucket of the
    ///   aligned span. Such a span is refused before the lock is taken.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "ratecache::query::get_rates", skip(self), err)
    )]
    pub fn get_rates(&self, start: Timestamp, end: Timestamp) -> Result<RatesResponse, RateCacheError> {
        if start > end {
            return Err(RateCacheError::invalid_arg(format!(
                "start {start} is after end {end}"
            )));
        }
        let g = self.cfg.granularity_secs;
        let max_points = self.cfg.max_points;
        let coarsest = self.cfg.ladder.last().copied().unwrap_or(1);
        // Spans this wide can never be sampled under the ceiling once filled.
        // Refusing them up front keeps the bucket walk below bounded.
        let span = bucket_count(start, end, g).unwrap_or(u64::MAX);
        if span >= max_points.saturating_mul(coarsest) {
            return Err(RateCacheError::SamplingLadderExhausted {
                points: span,
                max_points,
                coarsest,
            });
        }
        let mut st = self.lock();

        let hits: Vec<RateSample> = buckets(start, end, g)
            .filter_map(|m| st.store.get(m).map(|rate| RateSample::new(m, rate)))
            .collect();
        let (interval, rates) =
            sample_with_ladder(hits, g, &self.cfg.ladder, self.cfg.max_points)?;

        // Consecutive misses share a batch; only ask the set once per batch.
        let mut last_batch = None;
        let mut scheduled = 0usize;
        for m in buckets(start, end, g) {
            if st.store.contains(m) {
                continue;
            }
            let batch = st.jobs.normalize(m);
            if last_batch == Some(batch) {
                continue;
            }
            last_batch = Some(batch);
            if st.jobs.add(batch) {
                scheduled += 1;
            }
        }
        drop(st);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            returned = rates.len(),
            interval,
            scheduled,
            "range query served from cache"
        );
        #[cfg(not(feature = "tracing"))]
        let _ = scheduled;

        Ok(RatesResponse { interval, rates })
    }
}
