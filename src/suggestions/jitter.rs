//! Tie-breaking perturbation for the ensemble merge.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::JitterMode;

pub const JITTER_MIN: f64 = 0.95;
pub const JITTER_MAX: f64 = 1.05;

/// Source of the multiplicative factor applied to each merged candidate.
pub trait JitterSource {
    /// Next factor, always within [`JITTER_MIN`, `JITTER_MAX`].
    fn next_factor(&mut self) -> f64;
}

/// Uniform factors from a seeded generator. Same seed, same sequence.
pub struct SeededJitter {
    rng: StdRng,
}

impl SeededJitter {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl JitterSource for SeededJitter {
    fn next_factor(&mut self) -> f64 {
        self.rng.gen_range(JITTER_MIN..=JITTER_MAX)
    }
}

pub struct NoJitter;

impl JitterSource for NoJitter {
    fn next_factor(&mut self) -> f64 {
        1.0
    }
}

/// Fresh source for one ranking request.
pub fn from_mode(mode: JitterMode) -> Box<dyn JitterSource> {
    match mode {
        JitterMode::Seeded { seed } => Box::new(SeededJitter::new(seed)),
        JitterMode::Disabled => Box::new(NoJitter),
    }
}
