use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the ratecache workspace.
///
/// Covers argument validation, provider-tagged fetch failures, outbound quota
/// exhaustion, and the sampling-ladder invariant violation raised by range
/// queries.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RateCacheError {
    /// Invalid input argument or configuration.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// Issues with the returned or expected data (malformed rows, bad status, etc.).
    #[error("data issue: {0}")]
    Data(String),

    /// A fetcher reported a transport or provider failure.
    #[error("{connector} failed: {msg}")]
    Connector {
        /// Fetcher name that failed.
        connector: String,
        /// Human-readable error message.
        msg: String,
    },

    /// A single fetch exceeded the configured timeout.
    #[error("fetch timed out via {connector}")]
    FetchTimeout {
        /// Fetcher name that timed out.
        connector: String,
    },

    /// The outbound budget is exhausted for the current window.
    #[error("quota exceeded: remaining={remaining}, reset_in_ms={reset_in_ms}")]
    QuotaExceeded {
        /// Units remaining in the overall window.
        remaining: u64,
        /// Milliseconds until the window resets.
        reset_in_ms: u64,
    },

    /// No ladder stride brings the result set under the point ceiling.
    ///
    /// This is an invariant violation: the queried span is wider than the
    /// configured ladder was sized for.
    #[error(
        "sampling ladder exhausted: {points} points, coarsest stride {coarsest} still reaches max_points={max_points}"
    )]
    SamplingLadderExhausted {
        /// Size of the candidate result set, or of the whole aligned span when the
        /// span alone exceeds what the ladder can serve.
        points: u64,
        /// Configured exclusive point ceiling.
        max_points: u64,
        /// Largest ladder multiplier that was tried.
        coarsest: u64,
    },

    /// Unknown/opaque error.
    #[error("unknown error: {0}")]
    Other(String),
}

impl RateCacheError {
    /// Helper: build an `InvalidArg` error.
    pub fn invalid_arg(msg: impl Into<String>) -> Self {
        Self::InvalidArg(msg.into())
    }

    /// Helper: build a `Connector` error with the fetcher name and message.
    pub fn connector(connector: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Connector {
            connector: connector.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `FetchTimeout` error.
    pub fn fetch_timeout(connector: impl Into<String>) -> Self {
        Self::FetchTimeout {
            connector: connector.into(),
        }
    }

    /// True for errors produced by the fetch path (provider, timeout, quota).
    #[must_use]
    pub const fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            Self::Connector { .. }
                | Self::FetchTimeout { .. }
                | Self::QuotaExceeded { .. }
                | Self::Data(_)
        )
    }
}
