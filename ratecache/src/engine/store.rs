use std::collections::HashMap;

use ratecache_core::{Rate, RateSample, Timestamp};

/// Append-only map from aligned bucket start to the first rate seen for it.
#[derive(Debug, Default)]
pub struct RateStore {
    rates: HashMap<Timestamp, Rate>,
}

impl RateStore {
    pub fn get(&self, ts: Timestamp) -> Option<Rate> {
        self.rates.get(&ts).copied()
    }

    pub fn contains(&self, ts: Timestamp) -> bool {
        self.rates.contains_key(&ts)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Insert `sample` unless its bucket is already populated. First write wins.
    pub fn insert(&mut self, sample: RateSample) -> bool {
        if self.rates.contains_key(&sample.timestamp) {
            return false;
        }
        self.rates.insert(sample.timestamp, sample.rate);
        true
    }
}
