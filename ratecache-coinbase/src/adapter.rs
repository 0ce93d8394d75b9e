#[cfg(feature = "test-adapters")]
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ratecache_core::{RateCacheError, RawResponse};
use url::Url;

const CONNECTOR: &str = "ratecache-coinbase";

/// HTTP abstraction (so we can inject canned responses in tests).
#[async_trait]
pub trait CbHttp: Send + Sync {
    /// Issue a GET for `url`, refusing any body larger than `max_bytes`.
    ///
    /// # Errors
    /// Returns a `Connector` error on transport failures or when the body
    /// exceeds `max_bytes`.
    async fn get(&self, url: &Url, max_bytes: u64) -> Result<RawResponse, RateCacheError>;
}

/// Real adapter backed by a single `reqwest::Client`.
/// `reqwest::Client` is `Clone + Send + Sync`, so no external locking is needed.
#[derive(Clone)]
pub struct RealAdapter {
    client: reqwest::Client,
}

impl RealAdapter {
    /// Build a client with a request timeout and the crate user agent.
    ///
    /// Falls back to `reqwest::Client::new()` if the tuned client cannot be built.
    #[must_use]
    pub fn new_default() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("ratecache-coinbase/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .no_proxy()
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client }
    }

    /// Wrap an existing `reqwest::Client`.
    #[must_use]
    pub const fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn map_reqwest_err(e: &reqwest::Error, context: &str) -> RateCacheError {
    if e.is_timeout() {
        return RateCacheError::fetch_timeout(CONNECTOR);
    }
    if let Some(status) = e.status() {
        return RateCacheError::connector(CONNECTOR, format!("status {status}: {context}"));
    }
    RateCacheError::connector(CONNECTOR, format!("{context}: {e}"))
}

fn too_large(max_bytes: u64) -> RateCacheError {
    RateCacheError::connector(CONNECTOR, format!("response body exceeds {max_bytes} bytes"))
}

#[async_trait]
impl CbHttp for RealAdapter {
    async fn get(&self, url: &Url, max_bytes: u64) -> Result<RawResponse, RateCacheError> {
        let mut resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| map_reqwest_err(&e, "candles request"))?;

        if resp.content_length().is_some_and(|len| len > max_bytes) {
            return Err(too_large(max_bytes));
        }

        let status = resp.status().as_u16();
        let headers = resp
            .headers()
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_string(),
                    String::from_utf8_lossy(v.as_bytes()).into_owned(),
                )
            })
            .collect();

        // Stream the body so a response without Content-Length is still cut off at the cap.
        let mut body: Vec<u8> = Vec::new();
        while let Some(chunk) = resp
            .chunk()
            .await
            .map_err(|e| map_reqwest_err(&e, "candles body"))?
        {
            let total = u64::try_from(body.len() + chunk.len()).unwrap_or(u64::MAX);
            if total > max_bytes {
                return Err(too_large(max_bytes));
            }
            body.extend_from_slice(&chunk);
        }

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(feature = "test-adapters")]
impl dyn CbHttp {
    /// Test helper that builds a `CbHttp` from a closure taking the request URL
    /// and byte cap and returning a canned response.
    pub fn from_fn<F>(f: F) -> Arc<dyn CbHttp>
    where
        F: Send + Sync + 'static + Fn(Url, u64) -> Result<RawResponse, RateCacheError>,
    {
        struct FnHttp<F>(F);

        #[async_trait]
        impl<F> CbHttp for FnHttp<F>
        where
            F: Send + Sync + 'static + Fn(Url, u64) -> Result<RawResponse, RateCacheError>,
        {
            async fn get(&self, url: &Url, max_bytes: u64) -> Result<RawResponse, RateCacheError> {
                (self.0)(url.clone(), max_bytes)
            }
        }

        Arc::new(FnHttp(f))
    }
}
