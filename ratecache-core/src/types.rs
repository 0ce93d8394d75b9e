//! Re-export of foundational types from `ratecache-types`.
// Consolidated re-exports so downstream crates can depend on `ratecache-core` only

pub use ratecache_types::{
    CacheConfig, CacheStats, DEFAULT_LADDER, FetchWindow, QuotaConfig, QuotaConsumptionStrategy,
    QuotaState, Rate, RateCacheError, RateSample, RatesResponse, Timestamp,
};

pub use rust_decimal::Decimal;
