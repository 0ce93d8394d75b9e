//! ratecache-coinbase
//!
//! Public fetcher that implements `RateFetcher` on top of the Coinbase Exchange
//! candles endpoint for a single product. Responses are size-capped, sanitized
//! and reduced to close prices before they reach the cache.
#![warn(missing_docs)]

/// Adapter definitions and the production adapter backed by `reqwest`.
pub mod adapter;
/// Builder shortcuts for wrapping the fetcher in middleware.
pub mod builder;

use std::str::FromStr;
use std::sync::Arc;

use adapter::{CbHttp, RealAdapter};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use ratecache_core::{
    Decimal, FetchWindow, FetcherKey, RateCacheError, RateFetcher, RateSample, ResponseSanitizer,
    SecurityHeaders, Timestamp, max_response_bytes,
};
use url::Url;

pub use builder::CoinbaseFetcherBuilder;

/// Public Coinbase Exchange REST root.
pub const DEFAULT_BASE_URL: &str = "https://api.exchange.coinbase.com/";

#[cfg(feature = "test-adapters")]
type HttpAdapter = Arc<dyn CbHttp>;
#[cfg(not(feature = "test-adapters"))]
type HttpAdapter = Arc<RealAdapter>;

/// Public fetcher type. Production users will construct with `CoinbaseFetcher::try_new(product)`.
pub struct CoinbaseFetcher {
    http: HttpAdapter,
    base_url: Url,
    product: String,
    sanitizer: Arc<dyn ResponseSanitizer>,
}

impl CoinbaseFetcher {
    /// Static fetcher key used in logs and middleware introspection.
    pub const KEY: FetcherKey = FetcherKey::new("ratecache-coinbase");

    fn validate_product(product: &str) -> Result<(), RateCacheError> {
        let ok = !product.is_empty()
            && product
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-');
        if ok {
            Ok(())
        } else {
            Err(RateCacheError::invalid_arg(format!(
                "invalid product id '{product}'"
            )))
        }
    }

    fn base_url() -> Result<Url, RateCacheError> {
        Url::parse(DEFAULT_BASE_URL).map_err(|e| RateCacheError::Other(e.to_string()))
    }

    /// Build a fetcher for `product` (for example `ICP-USD`) with a fresh HTTP client.
    ///
    /// # Errors
    /// Returns `InvalidArg` if `product` is empty or contains characters other
    /// than ASCII alphanumerics and `-`.
    pub fn try_new(product: impl Into<String>) -> Result<Self, RateCacheError> {
        let product = product.into();
        Self::validate_product(&product)?;
        Ok(Self {
            http: Self::wrap_real(RealAdapter::new_default()),
            base_url: Self::base_url()?,
            product,
            sanitizer: Arc::new(SecurityHeaders),
        })
    }

    /// Build a fetcher for `product` from a provided `reqwest::Client`.
    ///
    /// # Errors
    /// Returns `InvalidArg` for a malformed product id.
    pub fn try_new_with_reqwest_client(
        product: impl Into<String>,
        client: reqwest::Client,
    ) -> Result<Self, RateCacheError> {
        let mut me = Self::try_new(product)?;
        me.http = Self::wrap_real(RealAdapter::new(client));
        Ok(me)
    }

    fn wrap_real(adapter: RealAdapter) -> HttpAdapter {
        Arc::new(adapter)
    }

    /// For tests/injection (requires the `test-adapters` feature).
    ///
    /// # Errors
    /// Returns `InvalidArg` for a malformed product id.
    #[cfg(feature = "test-adapters")]
    pub fn from_adapter(
        http: Arc<dyn CbHttp>,
        product: impl Into<String>,
    ) -> Result<Self, RateCacheError> {
        let product = product.into();
        Self::validate_product(&product)?;
        Ok(Self {
            http,
            base_url: Self::base_url()?,
            product,
            sanitizer: Arc::new(SecurityHeaders),
        })
    }

    /// Point the fetcher at a different REST root (a proxy or a local replay server).
    ///
    /// # Errors
    /// Returns `InvalidArg` if `base` is not a valid absolute URL.
    pub fn with_base_url(mut self, base: &str) -> Result<Self, RateCacheError> {
        let mut url = Url::parse(base)
            .map_err(|e| RateCacheError::invalid_arg(format!("base url '{base}': {e}")))?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        self.base_url = url;
        Ok(self)
    }

    /// Replace the response sanitizer.
    #[must_use]
    pub fn with_sanitizer(mut self, sanitizer: Arc<dyn ResponseSanitizer>) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    /// Product id this fetcher serves.
    #[must_use]
    pub fn product(&self) -> &str {
        &self.product
    }

    /// Candles URL for `window`.
    ///
    /// Coinbase treats `end` as inclusive, so the last requested candle is
    /// `window.end - granularity`.
    ///
    /// # Errors
    /// Returns `InvalidArg` if a window bound is not representable as a UTC date.
    pub fn candles_url(&self, window: &FetchWindow) -> Result<Url, RateCacheError> {
        let mut url = self
            .base_url
            .join(&format!("products/{}/candles", self.product))
            .map_err(|e| RateCacheError::Other(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("granularity", &window.granularity_secs.to_string())
            .append_pair("start", &rfc3339(window.start)?)
            .append_pair("end", &rfc3339(window.last_point())?);
        Ok(url)
    }

    fn normalize_error(e: RateCacheError) -> RateCacheError {
        match e {
            RateCacheError::Other(msg) => RateCacheError::connector(Self::KEY.as_str(), msg),
            other => other,
        }
    }
}

fn rfc3339(ts: Timestamp) -> Result<String, RateCacheError> {
    let secs = i64::try_from(ts)
        .map_err(|_| RateCacheError::invalid_arg(format!("timestamp {ts} out of range")))?;
    let dt = DateTime::<Utc>::from_timestamp(secs, 0)
        .ok_or_else(|| RateCacheError::invalid_arg(format!("timestamp {ts} out of range")))?;
    Ok(dt.to_rfc3339_opts(SecondsFormat::Secs, true))
}

fn number_to_decimal(n: &serde_json::Number) -> Option<Decimal> {
    let s = n.to_string();
    Decimal::from_str(&s)
        .or_else(|_| Decimal::from_scientific(&s))
        .ok()
}

/// Parse a candles body (`[[time, low, high, open, close, volume], ...]`) into
/// close-price samples inside `window`, ascending by time.
///
/// # Errors
/// Returns `Data` when the body is not a JSON array of numeric rows with at
/// least five fields.
pub fn parse_candles(body: &[u8], window: &FetchWindow) -> Result<Vec<RateSample>, RateCacheError> {
    let rows: Vec<Vec<serde_json::Value>> = serde_json::from_slice(body)
        .map_err(|e| RateCacheError::Data(format!("malformed candles body: {e}")))?;

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        if row.len() < 5 {
            return Err(RateCacheError::Data(format!(
                "candle row has {} fields, expected at least 5",
                row.len()
            )));
        }
        let ts = row[0]
            .as_u64()
            .ok_or_else(|| RateCacheError::Data(format!("bad candle time: {}", row[0])))?;
        let rate = match &row[4] {
            serde_json::Value::Number(n) => number_to_decimal(n),
            _ => None,
        }
        .ok_or_else(|| RateCacheError::Data(format!("bad candle close: {}", row[4])))?;
        if window.contains(ts) {
            out.push(RateSample::new(ts, rate));
        }
    }
    // The exchange answers newest-first.
    out.sort_by_key(|s| s.timestamp);
    Ok(out)
}

#[async_trait]
impl RateFetcher for CoinbaseFetcher {
    fn name(&self) -> &'static str {
        Self::KEY.as_str()
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "ratecache_coinbase::fetch",
            skip(self),
            fields(product = %self.product, start = window.start, end = window.end),
        )
    )]
    async fn fetch(&self, window: FetchWindow) -> Result<Vec<RateSample>, RateCacheError> {
        let url = self.candles_url(&window)?;
        let cap = max_response_bytes(window.points());
        let raw = self
            .http
            .get(&url, cap)
            .await
            .map_err(Self::normalize_error)?;
        let clean = self.sanitizer.sanitize(raw);
        if !clean.is_success() {
            #[cfg(feature = "tracing")]
            tracing::warn!(status = clean.status, "candles request rejected");
            return Err(RateCacheError::connector(
                Self::KEY.as_str(),
                format!("status {} for {}", clean.status, self.product),
            ));
        }
        parse_candles(&clean.body, &window)
    }
}
