//! Middleware trait for wrapping `RateFetcher` implementations.

use std::sync::Arc;

use crate::fetcher::RateFetcher;

/// Trait implemented by fetcher middleware layers.
///
/// A middleware consumes an inner `RateFetcher` and returns a wrapped fetcher
/// that augments or restricts behavior (e.g., outbound quotas).
pub trait Middleware: Send + Sync {
    /// Apply this middleware to wrap an inner fetcher and return the wrapped fetcher.
    fn apply(self: Box<Self>, inner: Arc<dyn RateFetcher>) -> Arc<dyn RateFetcher>;

    /// Human-readable middleware name for introspection/logging.
    fn name(&self) -> &'static str;

    /// Opaque configuration snapshot for serialization/inspection.
    fn config_json(&self) -> serde_json::Value;
}
