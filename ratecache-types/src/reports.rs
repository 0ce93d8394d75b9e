//! Introspection snapshots produced by the engine.

use serde::{Deserialize, Serialize};

/// Point-in-time counters for a running cache engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of samples held in the time-bucketed cache.
    pub cached_points: usize,
    /// Number of batch starts waiting to be fetched.
    pub pending_jobs: usize,
    /// Rate-limiter counter value before the next tick.
    pub limiter_counter: u64,
}
