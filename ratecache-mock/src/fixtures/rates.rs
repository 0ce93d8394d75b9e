use chrono::DateTime;
use ratecache_core::{Decimal, FetchWindow, RateSample, Timestamp, align_down};

/// Hand-picked closes that override the synthetic curve.
const ANCHORS: &[(&str, &str)] = &[
    ("2023-11-14T22:13:00Z", "4.1230"),
    ("2023-11-14T22:14:00Z", "4.1315"),
    ("2024-01-01T00:00:00Z", "11.8700"),
];

fn anchor(ts: Timestamp) -> Option<Decimal> {
    ANCHORS.iter().find_map(|(at, px)| {
        let t = DateTime::parse_from_rfc3339(at).ok()?.timestamp();
        if u64::try_from(t).ok()? == ts {
            px.parse::<Decimal>().ok()
        } else {
            None
        }
    })
}

/// Deterministic price for `ts`: an anchored close if one exists, else a
/// saw-tooth between 5.00 and 9.99 keyed by the minute index.
#[must_use]
pub fn rate_at(ts: Timestamp) -> Decimal {
    anchor(ts).unwrap_or_else(|| {
        let minute = i64::try_from((ts / 60) % 500).unwrap_or(0);
        Decimal::new(500 + minute, 2)
    })
}

/// One sample per `granularity_secs` step in `[window.start, window.end)`.
#[must_use]
pub fn batch(window: FetchWindow) -> Vec<RateSample> {
    if window.granularity_secs == 0 {
        return Vec::new();
    }
    let first = align_down(window.start, window.granularity_secs);
    (0..window.points())
        .map(|i| first + i * window.granularity_secs)
        .filter(|ts| window.contains(*ts))
        .map(|ts| RateSample::new(ts, rate_at(ts)))
        .collect()
}
