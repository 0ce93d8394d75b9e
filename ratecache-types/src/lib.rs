//! Ratecache data transfer objects and configuration primitives.
#![warn(missing_docs)]

mod config;
mod error;
mod rates;
mod reports;

pub use config::{
    CacheConfig, DEFAULT_LADDER, QuotaConfig, QuotaConsumptionStrategy, QuotaState,
};
pub use error::RateCacheError;
pub use rates::{FetchWindow, Rate, RateSample, RatesResponse, Timestamp};
pub use reports::CacheStats;
