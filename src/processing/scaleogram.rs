// src/processing/scaleogram.rs
use super::grid::Grid;
use super::wavelets::{frequency_order, packet_level, Wavelet};
use crate::error::{DantienError, Result};

/// Upper display bound for scaleogram magnitudes.
pub const SCALEOGRAM_CLIP: f64 = 0.3;

/// Side length of the square scaleogram image.
pub const SCALEOGRAM_SIZE: usize = 32;

/// Wavelet-packet scaleogram of the whole buffer as a fixed `size x size`
/// image.
///
/// The `2^level` terminal nodes are taken in frequency order and their
/// absolute coefficients are resampled onto the image: spans are averaged
/// when there are more nodes or coefficients than pixels, and repeated when
/// there are fewer. There is no incremental path: every update decomposes
/// the full buffer again.
pub struct ScaleogramEngine {
    wavelet: Wavelet,
    level: u32,
    capacity: usize,
    clip: f64,
    grid: Grid,
}

impl ScaleogramEngine {
    /// # Errors
    ///
    /// * `DantienError::WaveletConfig` if the buffer cannot be split `level`
    ///   times, if the deepest nodes are shorter than the filter support, or
    ///   if `size` is zero.
    pub fn new(
        wavelet: Wavelet,
        level: u32,
        capacity: usize,
        size: usize,
        clip: f64,
    ) -> Result<Self> {
        if level == 0 || level >= usize::BITS {
            return Err(DantienError::WaveletConfig(format!(
                "decomposition level must be between 1 and {}, got {}",
                usize::BITS - 1,
                level
            )));
        }
        if size == 0 {
            return Err(DantienError::WaveletConfig(
                "scaleogram size must be positive".to_string(),
            ));
        }
        let nodes = 1usize << level;
        if capacity % nodes != 0 {
            return Err(DantienError::WaveletConfig(format!(
                "buffer length {} is not divisible by 2^{}",
                capacity, level
            )));
        }
        let node_len = capacity / nodes;
        if node_len == 0 || node_len < wavelet.filter_len() - 1 {
            return Err(DantienError::WaveletConfig(format!(
                "buffer length {} too short for {:?} at level {}: nodes of {} coefficients, filter needs {}",
                capacity,
                wavelet,
                level,
                node_len,
                wavelet.filter_len() - 1
            )));
        }

        Ok(Self {
            wavelet,
            level,
            capacity,
            clip,
            grid: Grid::zeros(size, size),
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn shape(&self) -> (usize, usize) {
        self.grid.shape()
    }

    pub fn update(&mut self, samples: &[f64]) -> &Grid {
        debug_assert_eq!(samples.len(), self.capacity);

        let size = self.grid.cols();
        let nodes = packet_level(samples, self.wavelet, self.level);
        let bands: Vec<Vec<f64>> = (0..nodes.len())
            .map(|band| {
                let magnitudes: Vec<f64> =
                    nodes[frequency_order(band)].iter().map(|c| c.abs()).collect();
                resample(&magnitudes, size)
            })
            .collect();

        let clip = self.clip;
        for row in 0..self.grid.rows() {
            let (first, last) = span(row, bands.len(), size);
            let slot = self.grid.row_mut(row);
            for (col, value) in slot.iter_mut().enumerate() {
                let sum: f64 = bands[first..last].iter().map(|band| band[col]).sum();
                *value = (sum / (last - first) as f64).min(clip);
            }
        }

        &self.grid
    }
}

// Source range feeding output cell `index` when `len` inputs map onto `out`
// cells. Never empty.
fn span(index: usize, len: usize, out: usize) -> (usize, usize) {
    let first = index * len / out;
    let last = ((index + 1) * len / out).max(first + 1);
    (first, last)
}

fn resample(values: &[f64], out: usize) -> Vec<f64> {
    (0..out)
        .map(|index| {
            let (first, last) = span(index, values.len(), out);
            values[first..last].iter().sum::<f64>() / (last - first) as f64
        })
        .collect()
}
