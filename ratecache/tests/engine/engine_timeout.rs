use std::time::Duration;

use ratecache::{DispatchOutcome, RateCache, RateCacheError};
use ratecache_mock::{DynamicMockFetcher, MockBehavior};

use crate::helpers::{G, sample};

#[tokio::test(start_paused = true)]
async fn hanging_fetch_times_out_and_drops_job() {
    let (fetcher, controller) = DynamicMockFetcher::new_with_controller("hang");
    controller.set_default_behavior(MockBehavior::Hang).await;
    let cache = RateCache::builder()
        .with_fetcher(fetcher)
        .granularity_secs(G)
        .points_per_batch(10)
        .rate_limit_factor(1)
        .fetch_timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    cache.schedule(0);

    let outcome = cache.run_tick().await.unwrap();
    assert_eq!(
        outcome,
        DispatchOutcome::Failed {
            job: 0,
            error: RateCacheError::fetch_timeout("hang"),
        }
    );
    assert_eq!(cache.stats().pending_jobs, 0);
}

#[tokio::test(start_paused = true)]
async fn slow_fetch_within_timeout_succeeds() {
    let (fetcher, controller) = DynamicMockFetcher::new_with_controller("slow");
    controller
        .set_behavior(
            0,
            MockBehavior::ReturnAfter(Duration::from_secs(4), vec![sample(0, "4.1230")]),
        )
        .await;
    let cache = RateCache::builder()
        .with_fetcher(fetcher)
        .granularity_secs(G)
        .points_per_batch(10)
        .rate_limit_factor(1)
        .fetch_timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    cache.schedule(0);

    let outcome = cache.run_tick().await.unwrap();
    assert_eq!(outcome, DispatchOutcome::Fetched { job: 0, inserted: 1 });
}
