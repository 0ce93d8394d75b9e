use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ratecache_core::{FetchWindow, RateCacheError, RateFetcher, RateSample, Timestamp};
use tokio::sync::Mutex;

/// Instruction for how a fetch should behave for a given window.
#[derive(Clone)]
pub enum MockBehavior<T> {
    /// Return the provided value immediately.
    Return(T),
    /// Return the provided value after a delay on the Tokio clock.
    ReturnAfter(Duration, T),
    /// Fail immediately with the provided error.
    Fail(RateCacheError),
    /// Hang indefinitely (simulate a stalled provider).
    Hang,
}

#[derive(Default)]
struct InternalState {
    rules: HashMap<Timestamp, MockBehavior<Vec<RateSample>>>,
    default_rule: Option<MockBehavior<Vec<RateSample>>>,
    requests: Vec<FetchWindow>,
}

/// Controller handle used by tests to drive the dynamic mock from the outside.
#[derive(Clone)]
pub struct DynamicMockController {
    state: Arc<Mutex<InternalState>>,
}

impl DynamicMockController {
    /// Set the behavior for fetches whose window starts at `start`.
    pub async fn set_behavior(&self, start: Timestamp, behavior: MockBehavior<Vec<RateSample>>) {
        let mut guard = self.state.lock().await;
        guard.rules.insert(start, behavior);
    }

    /// Set the behavior used when no per-window rule matches.
    ///
    /// Without a default, unmatched windows are answered from the fixture curve.
    pub async fn set_default_behavior(&self, behavior: MockBehavior<Vec<RateSample>>) {
        let mut guard = self.state.lock().await;
        guard.default_rule = Some(behavior);
    }

    /// Return a copy of every window requested so far, in call order.
    pub async fn requests(&self) -> Vec<FetchWindow> {
        let guard = self.state.lock().await;
        guard.requests.clone()
    }

    /// Clear all configured behaviors and the request log.
    pub async fn clear_all_behaviors(&self) {
        let mut guard = self.state.lock().await;
        guard.rules.clear();
        guard.default_rule = None;
        guard.requests.clear();
    }
}

/// A fetcher that defers all behavior to an external controller.
pub struct DynamicMockFetcher {
    name: &'static str,
    state: Arc<Mutex<InternalState>>,
}

impl DynamicMockFetcher {
    /// Create a new dynamic mock fetcher and its controller.
    #[must_use]
    pub fn new_with_controller(name: &'static str) -> (Arc<dyn RateFetcher>, DynamicMockController) {
        let state = Arc::new(Mutex::new(InternalState::default()));
        let controller = DynamicMockController {
            state: Arc::clone(&state),
        };
        let me = Arc::new(Self { name, state });
        (me as Arc<dyn RateFetcher>, controller)
    }
}

#[async_trait]
impl RateFetcher for DynamicMockFetcher {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch(&self, window: FetchWindow) -> Result<Vec<RateSample>, RateCacheError> {
        // Log and snapshot the behavior without holding the lock across await points
        let behavior = {
            let mut guard = self.state.lock().await;
            guard.requests.push(window);
            guard
                .rules
                .get(&window.start)
                .or(guard.default_rule.as_ref())
                .cloned()
        };

        match behavior {
            Some(MockBehavior::Return(samples)) => Ok(samples),
            Some(MockBehavior::ReturnAfter(delay, samples)) => {
                tokio::time::sleep(delay).await;
                Ok(samples)
            }
            Some(MockBehavior::Fail(e)) => Err(e),
            Some(MockBehavior::Hang) => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            None => Ok(crate::fixtures::rates::batch(window)),
        }
    }
}
