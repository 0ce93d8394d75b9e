use ratecache::RateCache;
use ratecache_demos::common::{get_fetcher, now};
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize a human-friendly tracing subscriber with env-based filtering.
    // Suggested: RUST_LOG=info,ratecache=debug,ratecache_coinbase=debug
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
        .try_init();

    let cache = RateCache::builder()
        .with_fetcher(get_fetcher()?)
        .rate_limit_factor(1)
        .build()?;

    // Last hour: nothing cached yet, so this only schedules batches.
    let end = now();
    let start = end - 3_600;
    let _ = cache.get_rates(start, end)?;

    // Drive the dispatcher by hand until the queue drains.
    while cache.stats().pending_jobs > 0 {
        let _ = cache.run_tick().await;
    }

    let _ = cache.get_rates(start, end)?;
    Ok(())
}
