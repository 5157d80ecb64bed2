// src/processing/mod.rs

pub mod buffer;
pub mod grid;
pub mod model;
pub mod scaleogram;
pub mod spectrogram;
pub mod wavelets;

pub use buffer::SlidingBuffer;
pub use grid::Grid;
pub use model::{ModelSnapshot, ModelState, TimeSeriesModel};
pub use scaleogram::{ScaleogramEngine, SCALEOGRAM_CLIP, SCALEOGRAM_SIZE};
pub use spectrogram::{SpectrogramEngine, StftMargins, Taper, SPECTROGRAM_CLIP};
pub use wavelets::Wavelet;
