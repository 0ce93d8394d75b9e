//! Alignment of raw timestamps to cache buckets and fetch batches.

use crate::Timestamp;

/// Round `ts` down to a multiple of `unit`. A zero unit leaves `ts` unchanged.
#[must_use]
pub const fn align_down(ts: Timestamp, unit: u64) -> Timestamp {
    if unit == 0 {
        return ts;
    }
    ts - ts % unit
}

/// Start of the fetch batch that covers `ts`.
///
/// `batch_secs` is `G * PointsPerBatch`. The result is idempotent:
/// `batch_start(batch_start(t, b), b) == batch_start(t, b)`.
#[must_use]
pub const fn batch_start(ts: Timestamp, batch_secs: u64) -> Timestamp {
    align_down(ts, batch_secs)
}

/// Number of aligned buckets in `[align_down(start), align_down(end)]`.
///
/// Returns `Some(0)` when `start > end` or `granularity` is zero, and `None`
/// when the count does not fit in a `u64` (only possible with `granularity == 1`
/// over the full timestamp range).
#[must_use]
pub const fn bucket_count(start: Timestamp, end: Timestamp, granularity: u64) -> Option<u64> {
    if granularity == 0 {
        return Some(0);
    }
    let first = align_down(start, granularity);
    let last = align_down(end, granularity);
    if first > last {
        return Some(0);
    }
    ((last - first) / granularity).checked_add(1)
}

/// Aligned bucket starts in `[align_down(start), align_down(end)]`, stepping by `granularity`.
///
/// Both ends are inclusive after alignment. Yields nothing when `start > end`
/// or `granularity` is zero.
pub fn buckets(
    start: Timestamp,
    end: Timestamp,
    granularity: u64,
) -> impl Iterator<Item = Timestamp> {
    let first = align_down(start, granularity);
    // An unrepresentable count saturates; callers bound the span first.
    let count = bucket_count(start, end, granularity).unwrap_or(u64::MAX);
    (0..count).map(move |i| first + i * granularity)
}
