//! Engine internals: cache, pending set, limiter, and the operations that
//! drive them.

pub mod dispatch;
pub mod jobs;
pub mod limiter;
pub mod query;
pub mod store;
pub mod ticker;

use ratecache_core::CacheConfig;

use jobs::PendingJobs;
use limiter::RateLimiter;
use store::RateStore;

/// All mutable engine state, guarded by one mutex in [`crate::RateCache`].
#[derive(Debug)]
pub struct EngineState {
    pub store: RateStore,
    pub jobs: PendingJobs,
    pub limiter: RateLimiter,
}

impl EngineState {
    pub fn new(cfg: &CacheConfig) -> Self {
        Self {
            store: RateStore::default(),
            jobs: PendingJobs::new(cfg.batch_secs()),
            limiter: RateLimiter::new(cfg.rate_limit_factor),
        }
    }
}
