// src/feeders/mod.rs

pub mod csv;
pub mod modeeg;
pub mod synthetic;

use crate::config::FeederConfig;
use crate::error::Result;

use std::collections::VecDeque;

pub use self::csv::CsvFeeder;
pub use modeeg::{ModEegDecoder, ModEegFeeder};
pub use synthetic::RandomSinusoids;

// FEEDER COMPONENT ------------------------------------------------------------

/// Source of new samples, polled once per tick.
///
/// A feeder may return any number of samples, including none. Returning an
/// empty batch is a normal idle tick, not an error.
pub trait Feeder: Send {
    fn feed(&mut self) -> Result<Vec<f64>>;
}

impl<F> Feeder for F
where
    F: FnMut() -> Vec<f64> + Send,
{
    fn feed(&mut self) -> Result<Vec<f64>> {
        Ok(self())
    }
}

/// Replays a fixed list of batches, then stays empty.
#[derive(Debug, Default)]
pub struct QueueFeeder {
    queue: VecDeque<Vec<f64>>,
}

impl QueueFeeder {
    pub fn new(batches: impl IntoIterator<Item = Vec<f64>>) -> Self {
        Self {
            queue: batches.into_iter().collect(),
        }
    }

    pub fn push(&mut self, batch: Vec<f64>) {
        self.queue.push_back(batch);
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl Feeder for QueueFeeder {
    fn feed(&mut self) -> Result<Vec<f64>> {
        Ok(self.queue.pop_front().unwrap_or_default())
    }
}

/// Builds the feeder described by `config`. ModEEG input is read from stdin
/// and handed out at most `max_batch` samples at a time.
pub fn build_feeder(config: &FeederConfig, max_batch: usize) -> Result<Box<dyn Feeder>> {
    config.validate()?;
    let feeder: Box<dyn Feeder> = match config {
        FeederConfig::RandomSinusoids {
            len,
            max_rate,
            amplitude,
        } => Box::new(RandomSinusoids::new(*len, *max_rate, *amplitude, 0.0)),
        FeederConfig::PositiveSinusoids { len, max_rate } => {
            Box::new(RandomSinusoids::new(*len, *max_rate, 0.5, 0.5))
        }
        FeederConfig::Modeeg { channel } => {
            Box::new(ModEegFeeder::spawn(std::io::stdin(), *channel, max_batch))
        }
        FeederConfig::Csv {
            path,
            column,
            chunk_size,
            looping,
        } => Box::new(CsvFeeder::from_path(path, *column, *chunk_size, *looping)?),
    };
    Ok(feeder)
}
