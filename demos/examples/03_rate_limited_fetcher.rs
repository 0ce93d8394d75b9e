use std::time::Duration;

use ratecache::{FetcherBuilder, QuotaConsumptionStrategy, RateCache};
use ratecache_demos::common::get_fetcher;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Two 200-point batches per minute, charged per requested point; the third fetch is refused.
    let builder = FetcherBuilder::new(get_fetcher()?)
        .quota_limit(400)
        .quota_window(Duration::from_secs(60))
        .quota_strategy(QuotaConsumptionStrategy::PerPoint);
    println!("stack: {:?}", builder.layer_names());
    println!("config: {}", builder.describe());

    let cache = RateCache::builder()
        .with_fetcher(builder.build())
        .rate_limit_factor(1)
        .build()?;

    for job in 0..3 {
        cache.schedule(1_699_920_000 + job * cache.config().batch_secs());
    }
    while let Some(outcome) = cache.run_tick().await {
        println!("{outcome:?}");
    }
    Ok(())
}
