//! Injectable randomness for the source simulators.
//!
//! Every random decision a source makes goes through [`Randomness`]: how long
//! to wait, whether the fetch fails, and which wire format is used. The
//! default [`SeededRandomness`] is backed by `StdRng`; tests substitute
//! scripted sequences.

use crate::models::FormatTag;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

pub trait Randomness: Send {
    /// A delay uniformly distributed in `[min, max]`.
    fn delay(&mut self, min: Duration, max: Duration) -> Duration;

    /// `true` with probability `probability`.
    fn fetch_fails(&mut self, probability: f64) -> bool;

    /// A format chosen uniformly among [`FormatTag::ALL`].
    fn format(&mut self) -> FormatTag;
}

/// `StdRng`-backed randomness, seeded from the OS or from a fixed seed.
#[derive(Debug, Clone)]
pub struct SeededRandomness {
    rng: StdRng,
}

impl SeededRandomness {
    pub fn from_os() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeded when `seed` is given, OS entropy otherwise.
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::from_os(),
        }
    }
}

impl Randomness for SeededRandomness {
    fn delay(&mut self, min: Duration, max: Duration) -> Duration {
        if max <= min {
            return min;
        }
        let min_ms = min.as_millis() as u64;
        let max_ms = max.as_millis() as u64;
        Duration::from_millis(self.rng.random_range(min_ms..=max_ms))
    }

    fn fetch_fails(&mut self, probability: f64) -> bool {
        self.rng.random::<f64>() < probability
    }

    fn format(&mut self) -> FormatTag {
        FormatTag::ALL[self.rng.random_range(0..FormatTag::ALL.len())]
    }
}
