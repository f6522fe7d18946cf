// src/simulation/rng.rs

//! Randomness sources for sampled measurements.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// Supplies measurement thresholds uniformly distributed in `[0, 1)`.
///
/// Threaded explicitly through every sampled measurement so that a run can
/// be replayed from its seed.
pub trait RandomSource {
    /// Next threshold in `[0, 1)`.
    fn next_threshold(&mut self) -> f64;
}

/// `StdRng` backed source. Equal seeds produce equal threshold sequences.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    /// Deterministic source for `seed`.
    pub fn new(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    /// Source seeded from operating system entropy.
    pub fn from_entropy() -> Self {
        Self { rng: StdRng::from_os_rng() }
    }
}

impl RandomSource for SeededRandom {
    fn next_threshold(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Replays a fixed list of thresholds, then repeats the last one.
/// An empty list yields 0.0.
#[derive(Debug, Clone, Default)]
pub struct FixedThresholds {
    queue: VecDeque<f64>,
    last: f64,
}

impl FixedThresholds {
    /// Source replaying `thresholds` in order.
    pub fn new(thresholds: impl IntoIterator<Item = f64>) -> Self {
        Self { queue: thresholds.into_iter().collect(), last: 0.0 }
    }
}

impl RandomSource for FixedThresholds {
    fn next_threshold(&mut self) -> f64 {
        if let Some(next) = self.queue.pop_front() {
            self.last = next;
        }
        self.last
    }
}
