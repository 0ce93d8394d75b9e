//! Rate samples, fetch windows and range-query responses.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Seconds since the Unix epoch.
pub type Timestamp = u64;

/// Opaque price value stored in the cache.
pub type Rate = Decimal;

/// One cached price sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RateSample {
    /// Sample time, aligned to the cache granularity once stored.
    pub timestamp: Timestamp,
    /// Price at `timestamp`.
    pub rate: Rate,
}

impl RateSample {
    /// Construct a sample.
    #[must_use]
    pub const fn new(timestamp: Timestamp, rate: Rate) -> Self {
        Self { timestamp, rate }
    }
}

/// Half-open span `[start, end)` requested from a provider in one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FetchWindow {
    /// Batch-aligned window start (inclusive).
    pub start: Timestamp,
    /// Window end (exclusive).
    pub end: Timestamp,
    /// Spacing between requested samples, in seconds.
    pub granularity_secs: u64,
}

impl FetchWindow {
    /// Number of samples the window covers at its granularity.
    #[must_use]
    pub const fn points(&self) -> u64 {
        if self.granularity_secs == 0 {
            return 0;
        }
        self.end.saturating_sub(self.start) / self.granularity_secs
    }

    /// Whether `ts` falls inside `[start, end)`.
    #[must_use]
    pub const fn contains(&self, ts: Timestamp) -> bool {
        ts >= self.start && ts < self.end
    }

    /// Timestamp of the last sample in the window (inclusive end used by some providers).
    #[must_use]
    pub const fn last_point(&self) -> Timestamp {
        self.end.saturating_sub(self.granularity_secs)
    }
}

/// Result of a range query: the sampling stride and the retained samples.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RatesResponse {
    /// Stride between returned samples, in seconds.
    pub interval: u64,
    /// Cached samples inside the requested range, ascending by timestamp.
    pub rates: Vec<RateSample>,
}
