//! Quota-aware fetcher wrapper.
//!
//! Every outbound fetch spends units from a fixed-window budget before the
//! inner fetcher is called. A rejected fetch never reaches the provider.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use ratecache_core::{
    FetchWindow, Middleware, QuotaConfig, QuotaConsumptionStrategy, QuotaState, RateCacheError,
    RateFetcher, RateSample,
};

/// Wrapper that enforces an outbound quota.
pub struct QuotaAwareFetcher {
    inner: Arc<dyn RateFetcher>,
    config: QuotaConfig,
    runtime: Mutex<QuotaRuntime>,
}

struct QuotaRuntime {
    used_in_window: u64,
    last_reset: Instant,
}

impl QuotaAwareFetcher {
    /// Create a new quota-aware wrapper around an existing fetcher.
    pub fn new(inner: Arc<dyn RateFetcher>, config: QuotaConfig) -> Self {
        Self {
            inner,
            config,
            runtime: Mutex::new(QuotaRuntime {
                used_in_window: 0,
                last_reset: Instant::now(),
            }),
        }
    }

    /// Access the inner fetcher.
    pub fn inner(&self) -> &Arc<dyn RateFetcher> {
        &self.inner
    }

    /// Units a fetch of `window` costs under the configured strategy.
    #[must_use]
    pub fn cost_of(&self, window: &FetchWindow) -> u64 {
        match self.config.strategy {
            QuotaConsumptionStrategy::PerPoint => window.points().max(1),
            _ => 1,
        }
    }

    fn runtime(&self) -> std::sync::MutexGuard<'_, QuotaRuntime> {
        self.runtime.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn roll_window(rt: &mut QuotaRuntime, window: Duration, now: Instant) {
        let elapsed = now.duration_since(rt.last_reset);
        if window.is_zero() || elapsed < window {
            return;
        }
        rt.used_in_window = 0;
        // Keep windows aligned to regular boundaries even across idle gaps.
        let windows_passed = elapsed.as_nanos() / window.as_nanos();
        let boundary_offset = Duration::from_nanos(
            (windows_passed * window.as_nanos())
                .try_into()
                .unwrap_or(u64::MAX),
        );
        rt.last_reset += boundary_offset;
    }

    /// Check whether a fetch costing `cost` units fits the budget, and spend it if so.
    ///
    /// # Errors
    /// Returns `RateCacheError::QuotaExceeded` when the window budget cannot
    /// cover `cost`; nothing is spent in that case.
    pub fn should_allow_call(&self, cost: u64) -> Result<(), RateCacheError> {
        let mut rt = self.runtime();
        let now = Instant::now();
        Self::roll_window(&mut rt, self.config.window, now);

        if rt.used_in_window.saturating_add(cost) <= self.config.limit {
            rt.used_in_window += cost;
            return Ok(());
        }

        let reset_in_ms = self
            .config
            .window
            .saturating_sub(now.duration_since(rt.last_reset))
            .as_millis()
            .try_into()
            .unwrap_or(u64::MAX);
        let remaining = self.config.limit.saturating_sub(rt.used_in_window);
        drop(rt);
        Err(RateCacheError::QuotaExceeded {
            remaining,
            reset_in_ms,
        })
    }

    /// Snapshot of the current budget.
    pub fn state(&self) -> QuotaState {
        let mut rt = self.runtime();
        let now = Instant::now();
        Self::roll_window(&mut rt, self.config.window, now);
        QuotaState {
            limit: self.config.limit,
            remaining: self.config.limit.saturating_sub(rt.used_in_window),
            reset_in: self
                .config
                .window
                .saturating_sub(now.duration_since(rt.last_reset)),
        }
    }
}

#[async_trait]
impl RateFetcher for QuotaAwareFetcher {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn fetch(&self, window: FetchWindow) -> Result<Vec<RateSample>, RateCacheError> {
        let cost = self.cost_of(&window);
        if let Err(e) = self.should_allow_call(cost) {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                fetcher = self.inner.name(),
                window_start = window.start,
                cost,
                error = %e,
                "outbound quota exhausted; fetch rejected"
            );
            return Err(e);
        }
        self.inner.fetch(window).await
    }
}

/// Middleware config for constructing a [`QuotaAwareFetcher`].
pub struct QuotaMiddleware {
    pub config: QuotaConfig,
}

impl QuotaMiddleware {
    #[must_use]
    pub const fn new(config: QuotaConfig) -> Self {
        Self { config }
    }
}

impl Middleware for QuotaMiddleware {
    fn apply(self: Box<Self>, inner: Arc<dyn RateFetcher>) -> Arc<dyn RateFetcher> {
        Arc::new(QuotaAwareFetcher::new(inner, self.config))
    }

    fn name(&self) -> &'static str {
        "QuotaAwareFetcher"
    }

    fn config_json(&self) -> serde_json::Value {
        let strategy = match self.config.strategy {
            QuotaConsumptionStrategy::PerPoint => "PerPoint",
            _ => "Unit",
        };
        serde_json::json!({
            "limit": self.config.limit,
            "window_ms": self.config.window.as_millis(),
            "strategy": strategy,
        })
    }
}
