//! Ladder-based downsampling that bounds the size of range-query responses.

use crate::{RateCacheError, RateSample};

/// Pick the finest ladder stride whose projected point count stays under `max_points`.
///
/// The projection for stride `i` is `len / i` (integer division). The ladder is
/// tried in the given order, which callers keep ascending.
///
/// # Errors
/// Returns `SamplingLadderExhausted` when even the last stride projects
/// `max_points` or more.
pub fn select_stride(len: u64, ladder: &[u64], max_points: u64) -> Result<u64, RateCacheError> {
    ladder
        .iter()
        .copied()
        .find(|&i| i > 0 && len / i < max_points)
        .ok_or_else(|| RateCacheError::SamplingLadderExhausted {
            points: len,
            max_points,
            coarsest: ladder.last().copied().unwrap_or(0),
        })
}

/// Downsample `samples` to the stride chosen by [`select_stride`].
///
/// Returns the interval in seconds (`stride * granularity_secs`) and the
/// samples whose timestamp is divisible by it, in input order. No averaging or
/// interpolation is performed.
///
/// # Errors
/// Propagates `SamplingLadderExhausted` from [`select_stride`]; the input is
/// consumed but nothing else is touched.
pub fn sample_with_ladder(
    samples: Vec<RateSample>,
    granularity_secs: u64,
    ladder: &[u64],
    max_points: u64,
) -> Result<(u64, Vec<RateSample>), RateCacheError> {
    let len = u64::try_from(samples.len()).unwrap_or(u64::MAX);
    let stride = select_stride(len, ladder, max_points)?;
    let interval = stride.saturating_mul(granularity_secs);
    if stride == 1 || interval == 0 {
        return Ok((interval, samples));
    }
    let kept = samples
        .into_iter()
        .filter(|s| s.timestamp % interval == 0)
        .collect();
    Ok((interval, kept))
}
