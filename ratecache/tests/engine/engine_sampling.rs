use std::sync::Arc;

use ratecache::{RateCache, RateCacheError};
use ratecache_mock::MockFetcher;

use crate::helpers::{G, sample};

fn small_cache(max_points: u64, ladder: Vec<u64>) -> RateCache {
    RateCache::builder()
        .with_fetcher(Arc::new(MockFetcher::new()))
        .granularity_secs(G)
        .points_per_batch(10)
        .max_points(max_points)
        .ladder(ladder)
        .build()
        .unwrap()
}

#[test]
fn picks_coarser_stride_and_filters_on_multiples() {
    let cache = small_cache(3, vec![1, 2, 5]);
    cache.insert_samples((0..6).map(|i| sample(i * G, "1")));

    // 6/1 = 6 and 6/2 = 3 are not under 3; 6/5 = 1 is.
    let resp = cache.get_rates(0, 300).unwrap();
    assert_eq!(resp.interval, 300);
    let ts: Vec<u64> = resp.rates.iter().map(|s| s.timestamp).collect();
    assert_eq!(ts, vec![0, 300]);
}

#[test]
fn finest_stride_when_under_ceiling() {
    let cache = small_cache(10, vec![1, 5]);
    cache.insert_samples((0..9).map(|i| sample(i * G, "1")));
    let resp = cache.get_rates(0, 8 * G).unwrap();
    assert_eq!(resp.interval, G);
    assert_eq!(resp.rates.len(), 9);
}

#[test]
fn ladder_exhaustion_is_an_error_and_changes_nothing() {
    let cache = small_cache(2, vec![1, 2]);
    cache.insert_samples((0..4).map(|i| sample(i * G, "1")));

    // Twenty buckets can never fit under 2 * 2, cached or not.
    let err = cache.get_rates(0, 1_199).unwrap_err();
    assert_eq!(
        err,
        RateCacheError::SamplingLadderExhausted {
            points: 20,
            max_points: 2,
            coarsest: 2,
        }
    );
    let stats = cache.stats();
    assert_eq!(stats.pending_jobs, 0);
    assert_eq!(stats.cached_points, 4);
}

#[test]
fn widest_servable_span_is_accepted() {
    let cache = small_cache(2, vec![1, 2]);
    cache.insert_samples((0..4).map(|i| sample(i * G, "1")));

    // Three buckets: 3 / 2 = 1 is under the ceiling.
    let resp = cache.get_rates(0, 2 * G).unwrap();
    assert_eq!(resp.interval, 2 * G);
    let ts: Vec<u64> = resp.rates.iter().map(|s| s.timestamp).collect();
    assert_eq!(ts, vec![0, 120]);

    // Four buckets reach the ceiling at the coarsest stride.
    let err = cache.get_rates(0, 3 * G).unwrap_err();
    assert!(matches!(
        err,
        RateCacheError::SamplingLadderExhausted { points: 4, .. }
    ));
}
