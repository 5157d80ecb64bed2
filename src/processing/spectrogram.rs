// src/processing/spectrogram.rs
use super::grid::Grid;
use crate::error::{DantienError, Result};

use rayon::prelude::*;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Upper display bound for spectrogram magnitudes.
///
/// Magnitudes are `|X_k| / W`, so a unit-amplitude sinusoid centred in a
/// bin reads 0.5 and a constant offset of 1 reads 1.0 in bin 0. Unnormalised
/// `|X_k|` values would be `W` times larger.
pub const SPECTROGRAM_CLIP: f64 = 2.0;

// -----------------------------------------------------------------------------
// TAPER
// -----------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Taper {
    /// All ones, i.e. no tapering at all.
    #[default]
    Rectangular,
    Hann,
    Hamming,
}

impl Taper {
    pub fn coefficients(self, len: usize) -> Vec<f64> {
        if len <= 1 {
            return vec![1.0; len];
        }
        let denom = (len - 1) as f64;
        (0..len)
            .map(|i| {
                let phase = 2.0 * std::f64::consts::PI * i as f64 / denom;
                match self {
                    Taper::Rectangular => 1.0,
                    Taper::Hann => 0.5 - 0.5 * phase.cos(),
                    Taper::Hamming => 0.54 - 0.46 * phase.cos(),
                }
            })
            .collect()
    }
}

// -----------------------------------------------------------------------------
// MARGINS
// -----------------------------------------------------------------------------

/// How much of the buffer tail is re-analysed per tick, in multiples of the
/// window length on top of the new samples.
///
/// `lookback` sizes the analysed chunk (`n + lookback * W` samples) and
/// `recompute` the number of overwritten columns (`n + recompute * W`).
/// Frames are centred, so each side needs at least half a window of real
/// data: `recompute >= 1` and `lookback > recompute`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct StftMargins {
    pub lookback: usize,
    pub recompute: usize,
}

impl Default for StftMargins {
    fn default() -> Self {
        Self {
            lookback: 3,
            recompute: 2,
        }
    }
}

impl StftMargins {
    pub fn validate(&self) -> Result<()> {
        if self.recompute < 1 {
            return Err(DantienError::ModelConfig(
                "recompute margin must be at least one window".to_string(),
            ));
        }
        if self.lookback <= self.recompute {
            return Err(DantienError::ModelConfig(format!(
                "lookback margin ({}) must exceed recompute margin ({})",
                self.lookback, self.recompute
            )));
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// SPECTROGRAM ENGINE
// -----------------------------------------------------------------------------

/// Incremental hop-1 short-time Fourier transform over a sliding buffer.
///
/// The grid is `window_size` rows (FFT bins) by `capacity` columns, column
/// `i` being the frame centred on buffer sample `i`. Each update shifts the
/// history by the number of new samples and recomputes only the newest
/// columns.
pub struct SpectrogramEngine {
    window_size: usize,
    capacity: usize,
    margins: StftMargins,
    clip: Option<f64>,
    fft: Arc<dyn Fft<f64>>,
    grid: Grid,
}

impl SpectrogramEngine {
    pub fn new(
        window_size: usize,
        capacity: usize,
        margins: StftMargins,
        clip: Option<f64>,
    ) -> Result<Self> {
        if window_size < 2 {
            return Err(DantienError::ModelConfig(format!(
                "window size must be at least 2, got {}",
                window_size
            )));
        }
        if window_size > capacity {
            return Err(DantienError::ModelConfig(format!(
                "window size {} exceeds buffer length {}",
                window_size, capacity
            )));
        }
        margins.validate()?;

        let fft = FftPlanner::<f64>::new().plan_fft_forward(window_size);

        Ok(Self {
            window_size,
            capacity,
            margins,
            clip,
            fft,
            grid: Grid::zeros(window_size, capacity),
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Advances the spectrogram by `n` newly appended samples.
    ///
    /// # Arguments
    ///
    /// * `taper` - Window applied to each frame, `window_size` long
    /// * `samples` - The full sliding buffer, oldest first
    /// * `n` - Number of samples appended since the previous update
    pub fn update(&mut self, taper: &[f64], samples: &[f64], n: usize) {
        debug_assert_eq!(taper.len(), self.window_size);
        debug_assert_eq!(samples.len(), self.capacity);

        self.grid.shift_left(n);

        let chunk_len = (n + self.margins.lookback * self.window_size).min(self.capacity);
        let recompute = (n + self.margins.recompute * self.window_size).min(chunk_len);

        let chunk = &samples[self.capacity - chunk_len..];
        let columns = self.frames(chunk, taper, chunk_len - recompute);

        let first_col = self.capacity - recompute;
        for (offset, magnitudes) in columns.into_iter().enumerate() {
            for (bin, magnitude) in magnitudes.into_iter().enumerate() {
                self.grid.set(bin, first_col + offset, magnitude);
            }
        }
    }

    /// Computes the whole spectrogram of `samples` from scratch.
    pub fn compute_full(&self, taper: &[f64], samples: &[f64]) -> Grid {
        let mut grid = Grid::zeros(self.window_size, samples.len());
        for (col, magnitudes) in self.frames(samples, taper, 0).into_iter().enumerate() {
            for (bin, magnitude) in magnitudes.into_iter().enumerate() {
                grid.set(bin, col, magnitude);
            }
        }
        grid
    }

    // Magnitude columns for every frame centred at chunk positions `first..chunk.len()`.
    // Samples outside the chunk read as zero.
    fn frames(&self, chunk: &[f64], taper: &[f64], first: usize) -> Vec<Vec<f64>> {
        let w = self.window_size;
        let half = (w / 2) as isize;
        let scale = 1.0 / w as f64;
        let clip = self.clip;
        let fft = &self.fft;
        let scratch_len = fft.get_inplace_scratch_len();

        (first..chunk.len())
            .into_par_iter()
            .map_init(
                || {
                    (
                        vec![Complex::new(0.0, 0.0); w],
                        vec![Complex::new(0.0, 0.0); scratch_len],
                    )
                },
                |(frame, scratch), centre| {
                    let start = centre as isize - half;
                    for (j, slot) in frame.iter_mut().enumerate() {
                        let idx = start + j as isize;
                        let sample = if idx >= 0 && (idx as usize) < chunk.len() {
                            chunk[idx as usize] * taper[j]
                        } else {
                            0.0
                        };
                        *slot = Complex::new(sample, 0.0);
                    }
                    fft.process_with_scratch(frame, scratch);

                    frame
                        .iter()
                        .map(|bin| {
                            let magnitude = bin.norm() * scale;
                            match clip {
                                Some(max) => magnitude.clamp(0.0, max),
                                None => magnitude,
                            }
                        })
                        .collect()
                },
            )
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::buffer::SlidingBuffer;

    fn engine(window: usize, capacity: usize) -> SpectrogramEngine {
        SpectrogramEngine::new(window, capacity, StftMargins::default(), None).unwrap()
    }

    #[test]
    fn rectangular_taper_is_all_ones() {
        assert_eq!(Taper::Rectangular.coefficients(4), vec![1.0; 4]);
        let hann = Taper::Hann.coefficients(5);
        assert!(hann[0].abs() < 1e-12);
        assert!((hann[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_bad_margins() {
        let margins = StftMargins {
            lookback: 2,
            recompute: 2,
        };
        assert!(SpectrogramEngine::new(8, 64, margins, None).is_err());
        let margins = StftMargins {
            lookback: 2,
            recompute: 0,
        };
        assert!(SpectrogramEngine::new(8, 64, margins, None).is_err());
    }

    #[test]
    fn rejects_window_larger_than_buffer() {
        assert!(SpectrogramEngine::new(128, 64, StftMargins::default(), None).is_err());
    }

    #[test]
    fn shape_is_stable_across_updates() {
        let mut engine = engine(16, 128);
        let taper = Taper::Rectangular.coefficients(16);
        let mut buffer = SlidingBuffer::new(128);
        for n in [0usize, 3, 17, 128, 1] {
            let batch: Vec<f64> = (0..n).map(|i| (i as f64 * 0.3).sin()).collect();
            buffer.append(&batch).unwrap();
            engine.update(&taper, buffer.samples(), n);
            assert_eq!(engine.grid().shape(), (16, 128));
        }
    }

    #[test]
    fn pure_tone_peaks_at_its_bin() {
        let w = 32;
        let capacity = 256;
        let mut engine = engine(w, capacity);
        let taper = Taper::Rectangular.coefficients(w);
        let bin = 4;
        let tone: Vec<f64> = (0..capacity)
            .map(|i| (2.0 * std::f64::consts::PI * bin as f64 * i as f64 / w as f64).cos())
            .collect();
        engine.update(&taper, &tone, capacity);

        // A frame well inside the buffer sees the full tone: |X_k| / W = 0.5
        let column = engine.grid().column(capacity / 2);
        assert!((column[bin] - 0.5).abs() < 1e-9);
        assert!((column[w - bin] - 0.5).abs() < 1e-9);
        assert!(column[bin + 3] < 1e-9);
    }

    #[test]
    fn incremental_update_matches_full_recompute() {
        let w = 16;
        let capacity = 200;
        let mut engine = engine(w, capacity);
        let taper = Taper::Hann.coefficients(w);
        let mut buffer = SlidingBuffer::new(capacity);

        let mut t = 0usize;
        for n in [7usize, 30, 0, 1, 64, 13, 90, 5] {
            let batch: Vec<f64> = (t..t + n)
                .map(|i| (i as f64 * 0.21).sin() + 0.3 * (i as f64 * 1.7).cos())
                .collect();
            t += n;
            buffer.append(&batch).unwrap();
            engine.update(&taper, buffer.samples(), n);
        }

        let full = engine.compute_full(&taper, buffer.samples());
        for col in w / 2..capacity {
            for bin in 0..w {
                let a = engine.grid().get(bin, col);
                let b = full.get(bin, col);
                assert!((a - b).abs() < 1e-9, "bin {} col {}: {} vs {}", bin, col, a, b);
            }
        }
    }

    #[test]
    fn clip_bounds_the_output() {
        let w = 8;
        let mut engine = SpectrogramEngine::new(w, 64, StftMargins::default(), Some(0.1)).unwrap();
        let taper = Taper::Rectangular.coefficients(w);
        let loud = vec![10.0; 64];
        engine.update(&taper, &loud, 64);
        assert!(engine.grid().as_slice().iter().all(|&v| (0.0..=0.1).contains(&v)));
    }
}
