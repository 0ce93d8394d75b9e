use std::sync::Arc;
use std::time::Duration;

use ratecache::{RateCache, Ticker};

use crate::helpers::{G, RecordingFetcher, rate};

fn cache(fetcher: Arc<RecordingFetcher>, factor: u64) -> RateCache {
    RateCache::builder()
        .with_fetcher(fetcher)
        .granularity_secs(G)
        .points_per_batch(10)
        .rate_limit_factor(factor)
        .tick_period(Duration::from_secs(1))
        .build()
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn ticker_dispatches_one_in_factor_ticks() {
    let fetcher = RecordingFetcher::builder().returns_flat(rate("3")).build();
    let cache = cache(Arc::clone(&fetcher), 2);
    for job in [0, 600, 1_200] {
        cache.schedule(job);
    }

    let handle = cache.spawn_ticker();

    // Ticks at 0s, 1s, 2s, 3s, 4s; dispatches on 0s, 2s, 4s.
    tokio::time::sleep(Duration::from_millis(1_500)).await;
    assert_eq!(fetcher.calls(), 1);
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(fetcher.calls(), 3);

    let starts: Vec<u64> = fetcher.windows().iter().map(|w| w.start).collect();
    assert_eq!(starts, vec![0, 600, 1_200]);
    assert_eq!(cache.stats().cached_points, 30);
    assert_eq!(cache.stats().pending_jobs, 0);

    handle.stop().await;
}

#[tokio::test(start_paused = true)]
async fn stopped_ticker_dispatches_nothing_more() {
    let fetcher = RecordingFetcher::builder().build();
    let cache = cache(Arc::clone(&fetcher), 1);

    let handle = Ticker::spawn(cache.clone(), Duration::from_secs(1));
    tokio::time::sleep(Duration::from_millis(500)).await;
    handle.stop().await;

    cache.schedule(0);
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(fetcher.calls(), 0);
    assert_eq!(cache.pending_jobs(), vec![0]);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_handle_stops_the_driver() {
    let fetcher = RecordingFetcher::builder().build();
    let cache = cache(Arc::clone(&fetcher), 1);

    let handle = cache.spawn_ticker();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(!handle.is_finished());
    drop(handle);
    tokio::task::yield_now().await;

    cache.schedule(600);
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn slow_fetch_does_not_stall_ticks() {
    let fetcher = RecordingFetcher::builder()
        .delay(Duration::from_secs(10))
        .returns_flat(rate("1"))
        .build();
    let cache = cache(Arc::clone(&fetcher), 1);
    for job in [0, 600, 1_200] {
        cache.schedule(job);
    }

    let handle = cache.spawn_ticker();
    tokio::time::sleep(Duration::from_millis(2_500)).await;

    // All three jobs were dispatched while the first fetch is still sleeping.
    assert_eq!(fetcher.calls(), 3);
    assert_eq!(cache.stats().cached_points, 0);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(cache.stats().cached_points, 30);
    handle.stop().await;
}
