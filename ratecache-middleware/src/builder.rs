//! Builder for composing fetchers with middleware layers.
//!
//! # Middleware Ordering Convention
//!
//! Middleware layers form an "onion" around the raw fetcher:
//!
//! ```text
//! Dispatcher
//!     ↓
//! Outermost Middleware (checks first, handles errors last)
//!     ↓
//! Inner Middleware
//!     ↓
//! Raw Fetcher (e.g., Coinbase - makes actual API calls)
//! ```
//!
//! The `layers` vector stores middleware in **outermost-first** order, and
//! they are **applied in reverse** during `build()` to construct the nesting.

use std::sync::Arc;
use std::time::Duration;

use ratecache_core::{Middleware, QuotaConfig, QuotaConsumptionStrategy, RateFetcher};

const QUOTA_LAYER: &str = "QuotaAwareFetcher";

/// Generic middleware builder for composing a fetcher with layered wrappers.
///
/// See [module-level documentation](self) for details on middleware ordering.
pub struct FetcherBuilder {
    raw: Arc<dyn RateFetcher>,
    /// Middleware layers in outermost-first order.
    layers: Vec<Box<dyn Middleware>>,
}

impl FetcherBuilder {
    /// Create a new builder from a raw, unwrapped fetcher.
    #[must_use]
    pub fn new(raw: Arc<dyn RateFetcher>) -> Self {
        Self {
            raw,
            layers: Vec::new(),
        }
    }

    /// Internal: extract existing quota config from layers if present.
    fn existing_quota_config(&self) -> Option<QuotaConfig> {
        let layer = self.layers.iter().find(|l| l.name() == QUOTA_LAYER)?;
        let cfg = layer.config_json();
        let defaults = QuotaConfig::default();
        let limit = cfg
            .get("limit")
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(defaults.limit);
        let window_ms = cfg
            .get("window_ms")
            .and_then(serde_json::Value::as_u64)
            .unwrap_or_else(|| u64::try_from(defaults.window.as_millis()).unwrap_or(u64::MAX));
        let strategy = match cfg.get("strategy").and_then(|v| v.as_str()) {
            Some("PerPoint") => QuotaConsumptionStrategy::PerPoint,
            Some("Unit") => QuotaConsumptionStrategy::Unit,
            _ => defaults.strategy,
        };
        Some(QuotaConfig {
            limit,
            window: Duration::from_millis(window_ms),
            strategy,
        })
    }

    /// Add or replace quota configuration.
    ///
    /// Quota is inserted as the outermost layer so a rejected fetch never
    /// reaches any inner layer or the provider.
    #[must_use]
    pub fn with_quota(mut self, cfg: &QuotaConfig) -> Self {
        self.layers.retain(|m| m.name() != QUOTA_LAYER);
        self.layers
            .insert(0, Box::new(crate::quota::QuotaMiddleware::new(cfg.clone())));
        self
    }

    /// Remove quota if present.
    #[must_use]
    pub fn without_quota(mut self) -> Self {
        self.layers.retain(|m| m.name() != QUOTA_LAYER);
        self
    }

    /// Shortcut: set quota limit only (preserves existing window/strategy if already set).
    #[must_use]
    pub fn quota_limit(self, limit: u64) -> Self {
        let mut cfg = self.existing_quota_config().unwrap_or_default();
        cfg.limit = limit;
        self.with_quota(&cfg)
    }

    /// Shortcut: set window (preserves existing limit/strategy if already set).
    #[must_use]
    pub fn quota_window(self, window: Duration) -> Self {
        let mut cfg = self.existing_quota_config().unwrap_or_default();
        cfg.window = window;
        self.with_quota(&cfg)
    }

    /// Shortcut: set strategy (preserves existing limit/window if already set).
    #[must_use]
    pub fn quota_strategy(self, strategy: QuotaConsumptionStrategy) -> Self {
        let mut cfg = self.existing_quota_config().unwrap_or_default();
        cfg.strategy = strategy;
        self.with_quota(&cfg)
    }

    /// Layer names in outermost-first order, followed by the raw fetcher name.
    #[must_use]
    pub fn layer_names(&self) -> Vec<&'static str> {
        self.layers
            .iter()
            .map(|l| l.name())
            .chain(std::iter::once(self.raw.name()))
            .collect()
    }

    /// Configuration snapshots of every layer in outermost-first order.
    #[must_use]
    pub fn describe(&self) -> serde_json::Value {
        let layers: Vec<serde_json::Value> = self
            .layers
            .iter()
            .map(|l| serde_json::json!({ "name": l.name(), "config": l.config_json() }))
            .collect();
        serde_json::json!({ "layers": layers, "raw": self.raw.name() })
    }

    /// Build the wrapped fetcher.
    ///
    /// Applies layers innermost-first so that `layers[0]` ends up outermost.
    #[must_use]
    pub fn build(self) -> Arc<dyn RateFetcher> {
        let mut acc: Arc<dyn RateFetcher> = Arc::clone(&self.raw);
        for layer in self.layers.into_iter().rev() {
            acc = layer.apply(acc);
        }
        acc
    }
}
