use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use ratecache::{FetchWindow, RateCacheError, RateFetcher, RateSample};

type FetchFn = dyn Fn(FetchWindow) -> Result<Vec<RateSample>, RateCacheError> + Send + Sync;

/// Fetcher that answers from a closure and records every requested window.
pub struct RecordingFetcher {
    name: &'static str,
    delay: Option<Duration>,
    respond: Box<FetchFn>,
    windows: Mutex<Vec<FetchWindow>>,
}

impl RecordingFetcher {
    pub fn builder() -> RecordingFetcherBuilder {
        RecordingFetcherBuilder {
            name: "recording",
            delay: None,
            respond: None,
        }
    }

    /// Windows requested so far, in call order.
    pub fn windows(&self) -> Vec<FetchWindow> {
        self.windows.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.windows.lock().unwrap().len()
    }
}

pub struct RecordingFetcherBuilder {
    name: &'static str,
    delay: Option<Duration>,
    respond: Option<Box<FetchFn>>,
}

impl RecordingFetcherBuilder {
    pub fn name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(FetchWindow) -> Result<Vec<RateSample>, RateCacheError> + Send + Sync + 'static,
    {
        self.respond = Some(Box::new(f));
        self
    }

    /// Answer every window with one sample per bucket, all at `rate`.
    pub fn returns_flat(self, rate: ratecache::Decimal) -> Self {
        self.with_fn(move |w| {
            Ok((0..w.points())
                .map(|i| RateSample::new(w.start + i * w.granularity_secs, rate))
                .collect())
        })
    }

    pub fn fails_with(self, err: RateCacheError) -> Self {
        self.with_fn(move |_| Err(err.clone()))
    }

    pub fn build(self) -> Arc<RecordingFetcher> {
        Arc::new(RecordingFetcher {
            name: self.name,
            delay: self.delay,
            respond: self.respond.unwrap_or_else(|| Box::new(|_| Ok(vec![]))),
            windows: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl RateFetcher for RecordingFetcher {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch(&self, window: FetchWindow) -> Result<Vec<RateSample>, RateCacheError> {
        self.windows.lock().unwrap().push(window);
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        (self.respond)(window)
    }
}
