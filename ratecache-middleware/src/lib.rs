#![doc = include_str!("../README.md")]
//! ratecache-middleware
//!
//! Re-exports for fetcher middleware wrappers.

mod builder;
mod quota;

pub use crate::builder::FetcherBuilder;
pub use crate::quota::{QuotaAwareFetcher, QuotaMiddleware};
