//! Configuration types shared by the engine, fetchers and middleware.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::RateCacheError;

/// Default downsampling ladder, in multiples of the cache granularity.
///
/// With a 60 second granularity this covers 1m, 5m, 15m, 1h, 12h and 1d strides.
pub const DEFAULT_LADDER: [u64; 6] = [1, 5, 15, 60, 720, 1440];

/// Engine configuration for the time-bucketed cache and its backfill scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache granularity `G` in seconds. Every cache key is a multiple of it.
    pub granularity_secs: u64,
    /// Number of samples requested from the provider per fetch.
    pub points_per_batch: u64,
    /// One dispatch is allowed every `rate_limit_factor` ticks.
    pub rate_limit_factor: u64,
    /// Exclusive ceiling on the number of points returned by a range query.
    pub max_points: u64,
    /// Ascending candidate sampling strides, in multiples of `granularity_secs`.
    pub ladder: Vec<u64>,
    /// Upper bound on a single provider fetch.
    pub fetch_timeout: Duration,
    /// Period of the tick driver.
    pub tick_period: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            granularity_secs: 60,
            points_per_batch: 200,
            rate_limit_factor: 5,
            max_points: 100_000,
            ladder: DEFAULT_LADDER.to_vec(),
            fetch_timeout: Duration::from_secs(30),
            tick_period: Duration::from_secs(2),
        }
    }
}

impl CacheConfig {
    /// Width of one fetch batch in seconds (`G * PointsPerBatch`).
    #[must_use]
    pub const fn batch_secs(&self) -> u64 {
        self.granularity_secs.saturating_mul(self.points_per_batch)
    }

    /// Check the invariants the engine relies on.
    ///
    /// # Errors
    /// Returns `InvalidArg` when any numeric knob or duration is zero, when the batch width
    /// overflows, or when the ladder is empty, contains zero, or is not strictly
    /// ascending.
    pub fn validate(&self) -> Result<(), RateCacheError> {
        if self.granularity_secs == 0 {
            return Err(RateCacheError::invalid_arg("granularity_secs must be > 0"));
        }
        if self.points_per_batch == 0 {
            return Err(RateCacheError::invalid_arg("points_per_batch must be > 0"));
        }
        if self
            .granularity_secs
            .checked_mul(self.points_per_batch)
            .is_none()
        {
            return Err(RateCacheError::invalid_arg(
                "granularity_secs * points_per_batch overflows",
            ));
        }
        if self.rate_limit_factor == 0 {
            return Err(RateCacheError::invalid_arg("rate_limit_factor must be > 0"));
        }
        if self.max_points == 0 {
            return Err(RateCacheError::invalid_arg("max_points must be > 0"));
        }
        if self.fetch_timeout.is_zero() {
            return Err(RateCacheError::invalid_arg("fetch_timeout must be > 0"));
        }
        if self.tick_period.is_zero() {
            return Err(RateCacheError::invalid_arg("tick_period must be > 0"));
        }
        if self.ladder.is_empty() {
            return Err(RateCacheError::invalid_arg("sampling ladder is empty"));
        }
        if self.ladder.contains(&0) {
            return Err(RateCacheError::invalid_arg(
                "sampling ladder contains a zero stride",
            ));
        }
        if !self.ladder.windows(2).all(|w| w[0] < w[1]) {
            return Err(RateCacheError::invalid_arg(
                "sampling ladder must be strictly ascending",
            ));
        }
        Ok(())
    }
}

/// Strategy for consuming units from an outbound quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub enum QuotaConsumptionStrategy {
    /// Each fetch deducts exactly one unit.
    #[default]
    Unit,
    /// Each fetch deducts one unit per requested sample.
    PerPoint,
}

/// Configuration for an outbound call budget over a fixed window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Maximum number of units that may be consumed within a single window.
    pub limit: u64,
    /// Duration of the accounting window.
    pub window: Duration,
    /// Strategy for how fetches consume units from the budget.
    pub strategy: QuotaConsumptionStrategy,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            limit: 1000,
            window: Duration::from_secs(60 * 60),
            strategy: QuotaConsumptionStrategy::Unit,
        }
    }
}

/// Snapshot of a quota budget at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuotaState {
    /// Configured maximum units per window.
    pub limit: u64,
    /// Remaining units available in the current window.
    pub remaining: u64,
    /// Time remaining until the current window resets.
    pub reset_in: Duration,
}
