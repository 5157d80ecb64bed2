// src/feeders/synthetic.rs
use super::Feeder;
use crate::error::Result;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// -----------------------------------------------------------------------------
// SIMULATED SIGNALS
// -----------------------------------------------------------------------------

/// Batches of a sinusoid whose rate is redrawn at random for every batch:
/// `amplitude * sin(i * r * max_rate) + offset` with `r` uniform in [0, 1).
pub struct RandomSinusoids {
    len: usize,
    max_rate: f64,
    amplitude: f64,
    offset: f64,
    rng: StdRng,
}

impl RandomSinusoids {
    pub fn new(len: usize, max_rate: f64, amplitude: f64, offset: f64) -> Self {
        Self {
            len,
            max_rate,
            amplitude,
            offset,
            rng: StdRng::from_entropy(),
        }
    }

    /// Sinusoids in [-1, 1], 100 samples per batch.
    pub fn standard() -> Self {
        Self::new(100, 5.0, 1.0, 0.0)
    }

    /// Sinusoids squeezed into [0, 1].
    pub fn positive() -> Self {
        Self::new(100, 5.0, 0.5, 0.5)
    }

    /// Fixes the random sequence, for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn next_batch(&mut self) -> Vec<f64> {
        let rate = self.rng.gen::<f64>() * self.max_rate;
        (0..self.len)
            .map(|i| self.amplitude * (i as f64 * rate).sin() + self.offset)
            .collect()
    }
}

impl Feeder for RandomSinusoids {
    fn feed(&mut self) -> Result<Vec<f64>> {
        Ok(self.next_batch())
    }
}
