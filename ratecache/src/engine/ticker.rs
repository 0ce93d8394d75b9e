use std::time::Duration;

use ratecache_core::TaskHandle;
use tokio::sync::oneshot;
use tokio::time::MissedTickBehavior;

use super::dispatch::TickOutcome;
use crate::RateCache;

/// Periodic tick driver for a [`RateCache`].
pub struct Ticker;

impl Ticker {
    /// Tick `engine` every `period` until the returned handle is stopped or dropped.
    ///
    /// The first tick fires immediately. Late ticks are skipped rather than
    /// replayed in a burst. Each dispatched fetch runs in its own task and is
    /// allowed to finish after the driver stops.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn spawn(engine: RateCache, period: Duration) -> TaskHandle {
        // tokio::time::interval panics on a zero period.
        let period = period.max(Duration::from_millis(1));
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        let join = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    biased;
                    _ = &mut stop_rx => break,
                    _ = interval.tick() => {
                        if let TickOutcome::Dispatch(window) = engine.tick() {
                            let engine = engine.clone();
                            tokio::spawn(async move {
                                let _ = engine.fetch_window(window).await;
                            });
                        }
                    }
                }
            }
            #[cfg(feature = "tracing")]
            tracing::debug!("tick driver stopped");
        });

        TaskHandle::new(join, stop_tx)
    }
}

impl RateCache {
    /// Spawn a [`Ticker`] using the configured `tick_period`.
    #[must_use]
    pub fn spawn_ticker(&self) -> TaskHandle {
        Ticker::spawn(self.clone(), self.cfg.tick_period)
    }
}
