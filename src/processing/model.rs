// src/processing/model.rs
use super::buffer::SlidingBuffer;
use super::grid::Grid;
use super::scaleogram::ScaleogramEngine;
use super::spectrogram::SpectrogramEngine;
use crate::config::ModelConfig;
use crate::error::Result;
use crate::feeders::Feeder;

use std::sync::Arc;
use std::time::{Duration, Instant};

// -----------------------------------------------------------------------------
// TIME SERIES MODEL
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    /// Constructed, buffer still zero-filled.
    Idle,
    /// At least one tick has been eaten.
    Running,
}

/// Single authoritative state of the pipeline: sample history plus the two
/// time-frequency images derived from it.
///
/// `eat` is the only mutator. Readers on other threads should work from
/// `snapshot()` copies rather than borrowing the model.
pub struct TimeSeriesModel {
    buffer: SlidingBuffer,
    spectrogram: SpectrogramEngine,
    scaleogram: ScaleogramEngine,
    taper: Vec<f64>,
    zoom: usize,
    freqs: Arc<[f64]>,
    feeder: Box<dyn Feeder>,
    state: ModelState,
    tick: u64,
    last_update: Instant,
}

impl TimeSeriesModel {
    pub fn new(config: &ModelConfig, feeder: Box<dyn Feeder>) -> Result<Self> {
        config.validate()?;

        let spectrogram = SpectrogramEngine::new(
            config.window_size,
            config.buffer_len,
            config.margins,
            config.clip_spectrogram.then_some(config.spectrogram_clip),
        )?;
        let scaleogram = ScaleogramEngine::new(
            config.wavelet,
            config.wavelet_level,
            config.buffer_len,
            config.scaleogram_size,
            config.scaleogram_clip,
        )?;

        // Only the non-negative half of the spectrum gets an axis
        let effective_rate = config.sample_rate / config.zoom as f64;
        let freqs: Arc<[f64]> = (0..config.window_size / 2)
            .map(|k| k as f64 * effective_rate / config.window_size as f64)
            .collect();

        Ok(Self {
            buffer: SlidingBuffer::new(config.buffer_len),
            spectrogram,
            scaleogram,
            taper: config.taper.coefficients(config.window_size),
            zoom: config.zoom,
            freqs,
            feeder,
            state: ModelState::Idle,
            tick: 0,
            last_update: Instant::now(),
        })
    }

    /// Pulls one batch from the feeder and ingests it.
    pub fn eat(&mut self) -> Result<usize> {
        let batch = self.feeder.feed()?;
        self.eat_batch(&batch)
    }

    /// Ingests an externally supplied batch. Returns the number of samples
    /// appended after decimation.
    ///
    /// On error the model is left exactly as it was, timestamp included.
    pub fn eat_batch(&mut self, batch: &[f64]) -> Result<usize> {
        let decimated: Vec<f64> = batch.iter().step_by(self.zoom).copied().collect();
        let n = decimated.len();

        self.buffer.append(&decimated)?;

        self.last_update = Instant::now();
        self.tick += 1;
        self.state = ModelState::Running;

        if n == 0 {
            return Ok(0);
        }

        self.scaleogram.update(self.buffer.samples());
        self.spectrogram
            .update(&self.taper, self.buffer.samples(), n);

        Ok(n)
    }

    /// Time since the last successful tick.
    pub fn staleness(&self) -> Duration {
        self.last_update.elapsed()
    }

    pub fn series(&self) -> &[f64] {
        self.buffer.samples()
    }

    pub fn spectrogram(&self) -> &Grid {
        self.spectrogram.grid()
    }

    pub fn scaleogram(&self) -> &Grid {
        self.scaleogram.grid()
    }

    pub fn freqs(&self) -> &[f64] {
        &self.freqs
    }

    pub fn state(&self) -> ModelState {
        self.state
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    pub fn window_size(&self) -> usize {
        self.spectrogram.window_size()
    }

    pub fn snapshot(&self) -> ModelSnapshot {
        ModelSnapshot {
            series: self.buffer.samples().to_vec(),
            dat_s: self.spectrogram.grid().clone(),
            dat_w: self.scaleogram.grid().clone(),
            freqs: Arc::clone(&self.freqs),
            tick: self.tick,
            last_update: self.last_update,
        }
    }
}

// SNAPSHOT COMPONENT ----------------------------------------------------------

/// Immutable copy of the model handed to renderers.
#[derive(Debug, Clone)]
pub struct ModelSnapshot {
    pub series: Vec<f64>,
    /// Spectrogram, window_size x buffer_len.
    pub dat_s: Grid,
    /// Scaleogram, scaleogram_size x scaleogram_size.
    pub dat_w: Grid,
    pub freqs: Arc<[f64]>,
    pub tick: u64,
    pub last_update: Instant,
}

impl ModelSnapshot {
    pub fn staleness(&self) -> Duration {
        self.last_update.elapsed()
    }

    /// Newest spectrogram column, non-negative frequencies only.
    pub fn fft_slice(&self) -> Vec<f64> {
        let newest = self.dat_s.cols().saturating_sub(1);
        let mut column = self.dat_s.column(newest);
        column.truncate(self.freqs.len());
        column
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DantienError;
    use crate::feeders::QueueFeeder;

    fn small_config() -> ModelConfig {
        ModelConfig {
            buffer_len: 256,
            window_size: 64,
            sample_rate: 256.0,
            ..ModelConfig::default()
        }
    }

    fn model_with(batches: Vec<Vec<f64>>) -> TimeSeriesModel {
        TimeSeriesModel::new(&small_config(), Box::new(QueueFeeder::new(batches))).unwrap()
    }

    #[test]
    fn starts_idle_and_runs_after_first_eat() {
        let mut model = model_with(vec![vec![0.5; 4]]);
        assert_eq!(model.state(), ModelState::Idle);
        assert_eq!(model.eat().unwrap(), 4);
        assert_eq!(model.state(), ModelState::Running);
        assert_eq!(model.tick(), 1);
    }

    #[test]
    fn freqs_cover_half_the_window() {
        let model = model_with(vec![]);
        assert_eq!(model.freqs().len(), 32);
        assert_eq!(model.freqs()[0], 0.0);
        assert!((model.freqs()[1] - 4.0).abs() < 1e-12);
    }

    #[test]
    fn zoom_decimates_batches() {
        let config = ModelConfig {
            zoom: 3,
            ..small_config()
        };
        let mut model = TimeSeriesModel::new(&config, Box::new(QueueFeeder::new(vec![]))).unwrap();
        let batch: Vec<f64> = (0..10).map(|i| i as f64).collect();
        assert_eq!(model.eat_batch(&batch).unwrap(), 4);
        assert_eq!(&model.series()[252..], &[0.0, 3.0, 6.0, 9.0]);
        // Axis follows the decimated rate
        assert!((model.freqs()[1] - 256.0 / 3.0 / 64.0).abs() < 1e-12);
    }

    #[test]
    fn empty_batch_only_touches_the_timestamp() {
        let batch: Vec<f64> = (0..40).map(|i| (i as f64 * 0.4).sin() * 0.2).collect();
        let mut model = model_with(vec![batch, vec![]]);
        model.eat().unwrap();
        let before = model.snapshot();

        std::thread::sleep(Duration::from_millis(2));
        assert_eq!(model.eat().unwrap(), 0);
        let after = model.snapshot();

        assert_eq!(before.series, after.series);
        assert_eq!(before.dat_s, after.dat_s);
        assert_eq!(before.dat_w, after.dat_w);
        assert!(after.last_update > before.last_update);
    }

    #[test]
    fn invalid_batch_leaves_model_untouched() {
        let mut model = model_with(vec![vec![0.1; 10], vec![1.0; 257]]);
        model.eat().unwrap();
        let before = model.snapshot();

        let err = model.eat().unwrap_err();
        assert!(matches!(err, DantienError::InvalidBatch { len: 257, capacity: 256 }));

        let after = model.snapshot();
        assert_eq!(before.series, after.series);
        assert_eq!(before.dat_s, after.dat_s);
        assert_eq!(before.last_update, after.last_update);
        assert_eq!(model.tick(), 1);
    }

    #[test]
    fn shapes_hold_across_ticks() {
        let batches: Vec<Vec<f64>> = (0..20)
            .map(|t| (0..(t * 13) % 256).map(|i| (i as f64 * 0.1).cos()).collect())
            .collect();
        let mut model = model_with(batches);
        let scaleogram_shape = model.scaleogram().shape();
        for _ in 0..20 {
            model.eat().unwrap();
            assert_eq!(model.series().len(), 256);
            assert_eq!(model.spectrogram().shape(), (64, 256));
            assert_eq!(model.scaleogram().shape(), scaleogram_shape);
        }
    }

    #[test]
    fn snapshot_fft_slice_is_newest_column() {
        let mut model = model_with(vec![vec![0.3; 100]]);
        model.eat().unwrap();
        let snapshot = model.snapshot();
        let slice = snapshot.fft_slice();
        assert_eq!(slice.len(), 32);
        assert_eq!(slice[0], snapshot.dat_s.get(0, 255));
    }
}
