// File: src/scheduler/delay.rs

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Produces the wait before an account's next firing.
pub trait DelaySource: Send {
    fn next_delay(&mut self, min_secs: u64, max_secs: u64) -> Duration;
}

/// Uniform draw, in milliseconds, over `[min_secs, max_secs]` inclusive.
/// Swapped bounds are normalised.
pub fn sample_delay<R: Rng + ?Sized>(rng: &mut R, min_secs: u64, max_secs: u64) -> Duration {
    let (lo, hi) = if min_secs <= max_secs {
        (min_secs, max_secs)
    } else {
        (max_secs, min_secs)
    };
    let ms = rng.random_range(lo.saturating_mul(1000)..=hi.saturating_mul(1000));
    Duration::from_millis(ms)
}

/// Random delays within the configured bounds.
pub struct UniformDelay<R: Rng + Send = StdRng> {
    rng: R,
}

impl UniformDelay<StdRng> {
    pub fn from_os_rng() -> Self {
        Self { rng: StdRng::from_os_rng() }
    }

    pub fn seeded(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }
}

impl<R: Rng + Send> DelaySource for UniformDelay<R> {
    fn next_delay(&mut self, min_secs: u64, max_secs: u64) -> Duration {
        sample_delay(&mut self.rng, min_secs, max_secs)
    }
}

/// Always the same delay, ignoring the bounds.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(pub Duration);

impl DelaySource for FixedDelay {
    fn next_delay(&mut self, _min_secs: u64, _max_secs: u64) -> Duration {
        self.0
    }
}
