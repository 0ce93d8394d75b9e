use std::sync::Arc;
use std::time::Duration;

use ratecache::{RateCache, RateCacheError, RateSample, TickOutcome};
use ratecache_mock::{DynamicMockFetcher, MockBehavior, fixture_rate};

use crate::helpers::{G, RecordingFetcher, T0, cache_with, rate, sample};

#[tokio::test]
async fn uncached_range_returns_empty_and_schedules_batches() {
    let fetcher = RecordingFetcher::builder().build();
    let cache = cache_with(fetcher.clone(), 10, 5);

    // 40 minutes starting at an unaligned time -> buckets 0..=2340 -> batches 0,600,1200,1800
    let resp = cache.get_rates(30, 2_370).unwrap();
    assert!(resp.rates.is_empty());
    assert_eq!(resp.interval, G);
    assert_eq!(cache.pending_jobs(), vec![0, 600, 1_200, 1_800]);
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn partial_hit_returns_cached_subset_and_schedules_only_gaps() {
    let fetcher = RecordingFetcher::builder().build();
    let cache = cache_with(fetcher, 10, 5);
    // Batch [0, 600) fully cached; batch [600, 1200) only partly.
    cache.insert_samples((0..10).map(|i| sample(i * G, "4.00")));
    cache.insert_samples([sample(600, "4.50")]);

    let resp = cache.get_rates(0, 1_199).unwrap();
    assert_eq!(resp.rates.len(), 11);
    assert!(resp.rates.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    assert_eq!(resp.rates[10], sample(600, "4.50"));
    assert_eq!(cache.pending_jobs(), vec![600]);
}

#[tokio::test]
async fn end_bucket_is_inclusive() {
    let fetcher = RecordingFetcher::builder().build();
    let cache = cache_with(fetcher, 10, 5);
    cache.insert_samples([sample(120, "1"), sample(180, "2")]);

    let resp = cache.get_rates(60, 185).unwrap();
    let ts: Vec<u64> = resp.rates.iter().map(|s| s.timestamp).collect();
    assert_eq!(ts, vec![120, 180]);

    let resp = cache.get_rates(245, 245).unwrap();
    assert!(resp.rates.is_empty());
    let resp = cache.get_rates(180, 180).unwrap();
    assert_eq!(resp.rates, vec![sample(180, "2")]);
}

#[tokio::test]
async fn reversed_range_is_rejected_without_side_effects() {
    let fetcher = RecordingFetcher::builder().build();
    let cache = cache_with(fetcher, 10, 5);
    let err = cache.get_rates(1_000, 999).unwrap_err();
    assert!(matches!(err, RateCacheError::InvalidArg(_)));
    assert_eq!(cache.stats().pending_jobs, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn query_never_waits_on_a_hanging_fetch() {
    let (fetcher, controller) = DynamicMockFetcher::new_with_controller("hang");
    controller.set_default_behavior(MockBehavior::Hang).await;
    let cache = cache_with(fetcher, 10, 1);
    cache.schedule(0);

    let TickOutcome::Dispatch(window) = cache.tick() else {
        panic!("expected a dispatch");
    };
    let inflight = {
        let cache = cache.clone();
        tokio::spawn(async move { cache.fetch_window(window).await })
    };

    // Wait until the fetch is actually in flight.
    while controller.requests().await.is_empty() {
        tokio::task::yield_now().await;
    }

    let resp = tokio::time::timeout(Duration::from_secs(1), async {
        cache.get_rates(0, 1_200)
    })
    .await
    .expect("query must not block")
    .unwrap();
    assert!(resp.rates.is_empty());
    // The in-flight batch was already popped, so the query schedules it again.
    assert_eq!(cache.pending_jobs(), vec![0, 600, 1_200]);

    inflight.abort();
}

#[tokio::test]
async fn repeated_query_sees_backfilled_data() {
    let (fetcher, controller) = DynamicMockFetcher::new_with_controller("dyn");
    let cache = cache_with(fetcher, 10, 1);
    let start = T0 - T0 % 600;

    assert!(cache.get_rates(start, start + 1_199).unwrap().rates.is_empty());
    assert!(cache.run_tick().await.is_some());
    assert!(cache.run_tick().await.is_some());

    let resp = cache.get_rates(start, start + 1_199).unwrap();
    assert_eq!(resp.rates.len(), 20);
    assert_eq!(resp.rates[0], RateSample::new(start, fixture_rate(start)));
    assert_eq!(cache.stats().pending_jobs, 0);

    let requested: Vec<u64> = controller.requests().await.iter().map(|w| w.start).collect();
    assert_eq!(requested, vec![start, start + 600]);
}

#[tokio::test]
async fn scripted_window_values_are_served() {
    let (fetcher, controller) = DynamicMockFetcher::new_with_controller("dyn");
    controller
        .set_behavior(0, MockBehavior::Return(vec![sample(0, "4.123"), sample(60, "4.125")]))
        .await;
    let cache = cache_with(Arc::clone(&fetcher), 10, 1);

    cache.get_rates(0, 60).unwrap();
    cache.run_tick().await;

    let resp = cache.get_rates(0, 60).unwrap();
    assert_eq!(resp.rates, vec![sample(0, "4.123"), sample(60, "4.125")]);
    assert_eq!(cache.cached_rate(59), Some(rate("4.123")));
}

#[tokio::test]
async fn full_timestamp_range_is_refused_up_front() {
    let fetcher = RecordingFetcher::builder().build();
    let cache = RateCache::builder()
        .with_fetcher(fetcher)
        .granularity_secs(1)
        .build()
        .unwrap();
    cache.insert_samples([sample(0, "1")]);

    // The bucket count of [0, u64::MAX] at G = 1 does not fit in a u64.
    let err = cache.get_rates(0, u64::MAX).unwrap_err();
    assert_eq!(
        err,
        RateCacheError::SamplingLadderExhausted {
            points: u64::MAX,
            max_points: 100_000,
            coarsest: 1_440,
        }
    );
    assert_eq!(cache.stats().pending_jobs, 0);
    assert_eq!(cache.stats().cached_points, 1);
}

#[tokio::test]
async fn wide_query_does_not_stall_ticks() {
    let fetcher = RecordingFetcher::builder().build();
    let cache = cache_with(fetcher, 10, 1);
    cache.schedule(T0);

    let err = tokio::time::timeout(Duration::from_secs(1), async {
        cache.get_rates(0, u64::MAX)
    })
    .await
    .expect("wide query must return promptly")
    .unwrap_err();
    assert!(matches!(
        err,
        RateCacheError::SamplingLadderExhausted { points, .. } if points == u64::MAX / G + 1
    ));

    // Only the job scheduled beforehand is pending, and the next tick dispatches it.
    assert_eq!(cache.pending_jobs(), vec![T0 - T0 % 600]);
    assert!(matches!(cache.tick(), TickOutcome::Dispatch(w) if w.start == T0 - T0 % 600));
}
