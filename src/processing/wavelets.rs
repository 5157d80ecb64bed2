// src/processing/wavelets.rs
use serde::{Deserialize, Serialize};

// -----------------------------------------------------------------------------
// FILTER TABLES
// -----------------------------------------------------------------------------

// Scaling (reconstruction low-pass) coefficients. Decomposition filters are
// derived from these in `Wavelet::decomposition_filters`.

const HAAR: [f64; 2] = [0.7071067811865476, 0.7071067811865476];

const DB2: [f64; 4] = [
    0.48296291314469025,
    0.836516303737469,
    0.22414386804185735,
    -0.12940952255092145,
];

const DB3: [f64; 6] = [
    0.3326705529509569,
    0.8068915093133388,
    0.4598775021193313,
    -0.13501102001039084,
    -0.08544127388224149,
    0.035226291882100656,
];

const DB4: [f64; 8] = [
    0.23037781330885523,
    0.7148465705525415,
    0.6308807679295904,
    -0.02798376941698385,
    -0.18703481171888114,
    0.030841381835986965,
    0.032883011666982945,
    -0.010597401784997278,
];

const SYM4: [f64; 8] = [
    0.032223100604071306,
    -0.012603967262037833,
    -0.09921954357684722,
    0.29785779560527736,
    0.8037387518059161,
    0.49761866763201545,
    -0.02963552764599851,
    -0.07576571478927333,
];

/// Orthogonal wavelet bases available to the scaleogram.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Wavelet {
    Haar,
    Db2,
    Db3,
    #[default]
    Db4,
    Sym4,
}

impl Wavelet {
    fn scaling(self) -> &'static [f64] {
        match self {
            Wavelet::Haar => &HAAR,
            Wavelet::Db2 => &DB2,
            Wavelet::Db3 => &DB3,
            Wavelet::Db4 => &DB4,
            Wavelet::Sym4 => &SYM4,
        }
    }

    pub fn filter_len(self) -> usize {
        self.scaling().len()
    }

    /// Low-pass and high-pass decomposition filters.
    ///
    /// The low-pass filter is the time-reversed scaling filter, the
    /// high-pass filter its quadrature mirror.
    pub fn decomposition_filters(self) -> (Vec<f64>, Vec<f64>) {
        let rec_lo = self.scaling();
        let len = rec_lo.len();
        let dec_lo: Vec<f64> = rec_lo.iter().rev().copied().collect();
        let dec_hi: Vec<f64> = (0..len)
            .map(|k| {
                let sign = if k % 2 == 0 { -1.0 } else { 1.0 };
                sign * dec_lo[len - 1 - k]
            })
            .collect();
        (dec_lo, dec_hi)
    }
}

// -----------------------------------------------------------------------------
// SINGLE LEVEL DECOMPOSITION
// -----------------------------------------------------------------------------

/// Half-sample symmetric extension: `x[-1] = x[0]`, `x[n] = x[n - 1]`.
fn symmetric_index(idx: isize, len: usize) -> usize {
    let len = len as isize;
    let period = 2 * len;
    let mut i = idx.rem_euclid(period);
    if i >= len {
        i = period - 1 - i;
    }
    i as usize
}

/// Decimated convolution of `signal` with `filter` under symmetric
/// extension, keeping the `signal.len() / 2` central coefficients.
fn downsample_convolve(signal: &[f64], filter: &[f64]) -> Vec<f64> {
    let n = signal.len();
    let taps = filter.len();
    let full_len = (n + taps - 1) / 2;
    let keep = n / 2;
    let offset = (full_len - keep) / 2;

    (offset..offset + keep)
        .map(|i| {
            filter
                .iter()
                .enumerate()
                .map(|(j, &h)| {
                    let idx = 2 * i as isize + 1 - j as isize;
                    h * signal[symmetric_index(idx, n)]
                })
                .sum()
        })
        .collect()
}

/// One analysis step: (approximation, detail).
pub fn split(signal: &[f64], dec_lo: &[f64], dec_hi: &[f64]) -> (Vec<f64>, Vec<f64>) {
    (
        downsample_convolve(signal, dec_lo),
        downsample_convolve(signal, dec_hi),
    )
}

/// Full wavelet-packet tree down to `level`, returned in natural order
/// (node `k` follows the approximation/detail path given by the bits of `k`,
/// most significant bit first, detail = 1).
pub fn packet_level(signal: &[f64], wavelet: Wavelet, level: u32) -> Vec<Vec<f64>> {
    let (dec_lo, dec_hi) = wavelet.decomposition_filters();
    let mut nodes = vec![signal.to_vec()];
    for _ in 0..level {
        nodes = nodes
            .iter()
            .flat_map(|node| {
                let (approx, detail) = split(node, &dec_lo, &dec_hi);
                [approx, detail]
            })
            .collect();
    }
    nodes
}

/// Natural-order index of the node holding the `band`-th frequency band.
///
/// High-pass splits mirror the spectrum, so frequency order is the Gray code
/// of the natural order.
pub fn frequency_order(band: usize) -> usize {
    band ^ (band >> 1)
}
