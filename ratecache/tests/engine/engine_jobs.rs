use crate::helpers::{RecordingFetcher, cache_with, rate, sample};

#[test]
fn schedule_normalizes_to_batch_start() {
    // G = 60, PointsPerBatch = 200 -> BATCH = 12000
    let fetcher = RecordingFetcher::builder().build();
    let cache = cache_with(fetcher, 200, 5);

    assert!(cache.schedule(150));
    assert_eq!(cache.pending_jobs(), vec![0]);
    assert!(cache.schedule(12_050));
    assert_eq!(cache.pending_jobs(), vec![0, 12_000]);
}

#[test]
fn schedule_dedups_within_a_batch() {
    let fetcher = RecordingFetcher::builder().build();
    let cache = cache_with(fetcher, 200, 5);

    assert!(cache.schedule(12_000));
    assert!(!cache.schedule(23_999));
    assert!(!cache.schedule(12_001));
    assert_eq!(cache.stats().pending_jobs, 1);
}

#[test]
fn insert_samples_aligns_and_keeps_first_value() {
    let fetcher = RecordingFetcher::builder().build();
    let cache = cache_with(fetcher, 200, 5);

    let inserted = cache.insert_samples([sample(61, "4.10"), sample(119, "9.99"), sample(120, "4.20")]);
    assert_eq!(inserted, 2);
    assert_eq!(cache.cached_rate(60), Some(rate("4.10")));
    assert_eq!(cache.cached_rate(150), Some(rate("4.20")));
    assert_eq!(cache.cached_rate(0), None);
    assert_eq!(cache.stats().cached_points, 2);
}
