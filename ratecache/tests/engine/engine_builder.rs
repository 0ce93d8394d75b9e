use std::sync::Arc;
use std::time::Duration;

use ratecache::{CacheConfig, RateCache, RateCacheError};
use ratecache_mock::MockFetcher;

#[test]
fn build_requires_a_fetcher() {
    let err = RateCache::builder().build().err().unwrap();
    assert!(matches!(err, RateCacheError::InvalidArg(_)));
}

#[test]
fn build_validates_config() {
    let err = RateCache::builder()
        .with_fetcher(Arc::new(MockFetcher::new()))
        .ladder(vec![5, 1])
        .build()
        .err()
        .unwrap();
    assert!(matches!(err, RateCacheError::InvalidArg(_)));

    let err = RateCache::builder()
        .with_fetcher(Arc::new(MockFetcher::new()))
        .rate_limit_factor(0)
        .build()
        .err()
        .unwrap();
    assert!(matches!(err, RateCacheError::InvalidArg(_)));
}

#[test]
fn setters_land_in_config() {
    let cache = RateCache::builder()
        .with_fetcher(Arc::new(MockFetcher::new()))
        .granularity_secs(300)
        .points_per_batch(12)
        .rate_limit_factor(3)
        .max_points(500)
        .ladder(vec![1, 4])
        .fetch_timeout(Duration::from_secs(3))
        .tick_period(Duration::from_millis(500))
        .build()
        .unwrap();

    let cfg = cache.config();
    assert_eq!(cfg.batch_secs(), 3_600);
    assert_eq!(cfg.rate_limit_factor, 3);
    assert_eq!(cfg.max_points, 500);
    assert_eq!(cfg.ladder, vec![1, 4]);
    assert_eq!(cfg.fetch_timeout, Duration::from_secs(3));
    assert_eq!(cfg.tick_period, Duration::from_millis(500));
    assert_eq!(cache.fetcher_name(), "ratecache-mock");
}

#[test]
fn new_engine_starts_empty() {
    let cache = RateCache::builder()
        .with_fetcher(Arc::new(MockFetcher::new()))
        .config(CacheConfig::default())
        .build()
        .unwrap();
    let stats = cache.stats();
    assert_eq!(stats.cached_points, 0);
    assert_eq!(stats.pending_jobs, 0);
    assert_eq!(stats.limiter_counter, 0);
    assert!(cache.pending_jobs().is_empty());
}

#[test]
fn clones_share_state() {
    let cache = RateCache::builder()
        .with_fetcher(Arc::new(MockFetcher::new()))
        .build()
        .unwrap();
    let other = cache.clone();
    assert!(cache.schedule(42));
    assert_eq!(other.pending_jobs(), vec![0]);
}
