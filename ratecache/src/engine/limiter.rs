/// One limiter step: whether to dispatch now, and the next counter value.
///
/// Dispatch happens when the counter is zero before the increment, so exactly
/// one of every `factor` consecutive steps dispatches. A zero factor is
/// treated as one (every step dispatches).
#[must_use]
pub const fn step(counter: u64, factor: u64) -> (bool, u64) {
    let factor = if factor == 0 { 1 } else { factor };
    (counter == 0, (counter + 1) % factor)
}

/// Cyclic 1-in-N tick gate.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    counter: u64,
    factor: u64,
}

impl RateLimiter {
    pub const fn new(factor: u64) -> Self {
        Self { counter: 0, factor }
    }

    /// Count one tick and report whether it may dispatch.
    pub const fn advance(&mut self) -> bool {
        let (dispatch, next) = step(self.counter, self.factor);
        self.counter = next;
        dispatch
    }

    pub const fn counter(&self) -> u64 {
        self.counter
    }
}
