//! Deterministic response sanitization.
//!
//! Independent evaluators of the same fetch must agree byte-for-byte on the
//! trusted response. Provider metadata (dates, request ids, cookies, cache
//! headers) differs per request, so it is dropped before a response is used.

use serde::{Deserialize, Serialize};

/// Security headers kept on every sanitized response, with their fixed values.
pub const SECURITY_HEADERS: [(&str, &str); 6] = [
    ("Content-Security-Policy", "default-src 'self'"),
    ("Referrer-Policy", "strict-origin"),
    ("Permissions-Policy", "geolocation=(self)"),
    ("Strict-Transport-Security", "max-age=63072000"),
    ("X-Frame-Options", "DENY"),
    ("X-Content-Type-Options", "nosniff"),
];

/// Raw HTTP response as seen by a fetcher before it is trusted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Header name/value pairs in received order.
    pub headers: Vec<(String, String)>,
    /// Response body bytes.
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Whether the status is in the 2xx range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Case-insensitive header lookup.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Pure transformation applied to every raw provider response.
///
/// Implementations must be deterministic functions of their input and must
/// not perform I/O.
pub trait ResponseSanitizer: Send + Sync {
    /// Produce the sanitized form of `raw`.
    fn sanitize(&self, raw: RawResponse) -> RawResponse;
}

/// Replaces all headers with [`SECURITY_HEADERS`], keeping status and body.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecurityHeaders;

impl ResponseSanitizer for SecurityHeaders {
    fn sanitize(&self, raw: RawResponse) -> RawResponse {
        RawResponse {
            status: raw.status,
            headers: SECURITY_HEADERS
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            body: raw.body,
        }
    }
}
