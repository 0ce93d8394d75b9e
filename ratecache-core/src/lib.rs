//! ratecache-core
//!
//! Core types, traits, and utilities shared across the ratecache workspace.
//!
//! - `types`: re-exported configuration, samples and the unified error.
//! - `fetcher`: the `RateFetcher` collaborator trait and response budget helpers.
//! - `sanitize`: deterministic response sanitization before data is trusted.
//! - `timeseries`: bucket alignment and ladder downsampling.
//!
//! Async runtime (Tokio)
//! ---------------------
//! `task::TaskHandle` wraps `tokio::task::JoinHandle<()>` and uses
//! `tokio::sync::oneshot::Sender<()>` for cooperative shutdown, so code that
//! drives the tick loop must run under a Tokio 1.x runtime.
#![warn(missing_docs)]

/// Fetcher collaborator trait and response size budget.
pub mod fetcher;
/// Middleware trait implemented by fetcher wrappers.
pub mod middleware;
/// Response sanitization applied before provider data is trusted.
pub mod sanitize;
/// Background task handle used by the tick driver.
pub mod task;
/// Bucket alignment and downsampling helpers.
pub mod timeseries;
/// Re-exported configuration, samples and the unified error.
pub mod types;

pub use fetcher::{BYTES_PER_SAMPLE, FetcherKey, RateFetcher, max_response_bytes};
pub use middleware::Middleware;
pub use sanitize::{RawResponse, ResponseSanitizer, SECURITY_HEADERS, SecurityHeaders};
pub use task::TaskHandle;
pub use timeseries::align::{align_down, batch_start, bucket_count, buckets};
pub use timeseries::sample::{sample_with_ladder, select_stride};
pub use types::*;
