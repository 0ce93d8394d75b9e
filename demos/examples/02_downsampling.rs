use ratecache::{DEFAULT_LADDER, RateCache, RateSample};
use ratecache_demos::common::get_fetcher;
use ratecache_mock::fixture_rate;

const START: u64 = 1_699_920_000;

/// Ten days of one-minute samples.
fn seed(cache: &RateCache) {
    let minutes = 10 * 24 * 60;
    cache.insert_samples((0..minutes).map(|i| {
        let ts = START + i * 60;
        RateSample::new(ts, fixture_rate(ts))
    }));
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A small ceiling makes the ladder visible without seeding millions of points.
    let cache = RateCache::builder()
        .with_fetcher(get_fetcher()?)
        .max_points(100)
        .build()?;
    seed(&cache);
    let start = START;

    println!("ladder: {DEFAULT_LADDER:?}");
    for hours in [1, 6, 24, 72, 240] {
        let end = start + hours * 3_600 - 60;
        let resp = cache.get_rates(start, end)?;
        println!(
            "{hours:>4}h -> interval {:>5}s, {:>3} points",
            resp.interval,
            resp.rates.len()
        );
    }

    // A ladder that stops at 15 minutes cannot shrink ten days under the ceiling.
    let short = RateCache::builder()
        .with_fetcher(get_fetcher()?)
        .max_points(100)
        .ladder(vec![1, 5, 15])
        .build()?;
    seed(&short);
    match short.get_rates(start, start + 240 * 3_600 - 60) {
        Ok(resp) => println!("unexpected success: {} points", resp.rates.len()),
        Err(e) => println!("refused: {e}"),
    }
    Ok(())
}
