// src/visualization/views.rs

use crate::processing::model::ModelSnapshot;
use crate::processing::spectrogram::SPECTROGRAM_CLIP;

/// Default time resolution of the 3-D spectrogram surface.
pub const SURFACE_COLUMNS: usize = 128;

/// The linked views of the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    /// Raw time-domain trace.
    Series,
    /// Newest spectrogram column over the frequency axis.
    FftSlice,
    Spectrogram,
    Scaleogram,
    /// Height field of the lower half of the spectrogram, thinned in time.
    Spectrogram3d { columns: usize },
}

/// Draw-ready data for one view.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewData {
    Trace {
        x: Vec<f64>,
        values: Vec<f64>,
        min: f64,
        max: f64,
    },
    Heatmap {
        rows: usize,
        cols: usize,
        values: Vec<f64>,
        max: f64,
    },
    Surface {
        rows: usize,
        cols: usize,
        heights: Vec<f64>,
        freqs: Vec<f64>,
    },
}

impl ViewKind {
    pub fn all() -> [ViewKind; 5] {
        [
            ViewKind::Series,
            ViewKind::FftSlice,
            ViewKind::Spectrogram,
            ViewKind::Scaleogram,
            ViewKind::Spectrogram3d {
                columns: SURFACE_COLUMNS,
            },
        ]
    }

    pub fn title(&self) -> &'static str {
        match self {
            ViewKind::Series => "series",
            ViewKind::FftSlice => "fft",
            ViewKind::Spectrogram => "spectrogram",
            ViewKind::Scaleogram => "scaleogram",
            ViewKind::Spectrogram3d { .. } => "spectrogram-3d",
        }
    }

    pub fn prepare(&self, snapshot: &ModelSnapshot) -> ViewData {
        match *self {
            ViewKind::Series => ViewData::Trace {
                x: (0..snapshot.series.len()).map(|i| i as f64).collect(),
                values: snapshot.series.clone(),
                min: -1.0,
                max: 1.0,
            },
            ViewKind::FftSlice => ViewData::Trace {
                x: snapshot.freqs.to_vec(),
                values: snapshot.fft_slice(),
                min: 0.0,
                max: SPECTROGRAM_CLIP,
            },
            ViewKind::Spectrogram => ViewData::Heatmap {
                rows: snapshot.dat_s.rows(),
                cols: snapshot.dat_s.cols(),
                values: snapshot.dat_s.as_slice().to_vec(),
                max: snapshot.dat_s.max(),
            },
            ViewKind::Scaleogram => ViewData::Heatmap {
                rows: snapshot.dat_w.rows(),
                cols: snapshot.dat_w.cols(),
                values: snapshot.dat_w.as_slice().to_vec(),
                max: snapshot.dat_w.max(),
            },
            ViewKind::Spectrogram3d { columns } => surface(snapshot, columns),
        }
    }
}

fn surface(snapshot: &ModelSnapshot, columns: usize) -> ViewData {
    let grid = &snapshot.dat_s;
    let rows = snapshot.freqs.len().min(grid.rows());
    let columns = columns.max(1);
    let stride = (grid.cols() + columns - 1) / columns;
    let picked: Vec<usize> = (0..grid.cols()).step_by(stride.max(1)).collect();

    let mut heights = Vec::with_capacity(rows * picked.len());
    for row in 0..rows {
        heights.extend(picked.iter().map(|&col| grid.get(row, col)));
    }

    ViewData::Surface {
        rows,
        cols: picked.len(),
        heights,
        freqs: snapshot.freqs[..rows].to_vec(),
    }
}
