use std::time::Duration;

use ratecache::RateCache;
use ratecache_demos::common::{get_fetcher, now, using_mock};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let tick = if using_mock() {
        Duration::from_millis(10)
    } else {
        Duration::from_millis(500)
    };
    let cache = RateCache::builder()
        .with_fetcher(get_fetcher()?)
        .rate_limit_factor(2)
        .tick_period(tick)
        .build()?;
    let ticker = cache.spawn_ticker();

    // Six hours of one-minute buckets spans two 200-point batches (sometimes three).
    let end = now();
    let start = end - 6 * 3_600;

    let first = cache.get_rates(start, end)?;
    println!(
        "first query: {} cached samples, {} batches scheduled",
        first.rates.len(),
        cache.stats().pending_jobs
    );

    // Queries never block; poll until the backfill catches up.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(30);
    loop {
        tokio::time::sleep(tick * 4).await;
        let stats = cache.stats();
        if stats.pending_jobs == 0 || tokio::time::Instant::now() >= deadline {
            break;
        }
    }
    // Give the last spawned fetch a moment to land.
    tokio::time::sleep(tick * 4).await;

    let resp = cache.get_rates(start, end)?;
    println!(
        "second query: {} samples every {}s",
        resp.rates.len(),
        resp.interval
    );
    if let (Some(first), Some(last)) = (resp.rates.first(), resp.rates.last()) {
        println!("  {} -> {}", first.timestamp, first.rate);
        println!("  {} -> {}", last.timestamp, last.rate);
    }

    ticker.stop().await;
    Ok(())
}
