// src/error.rs
use thiserror::Error;

/// Errors raised by the signal-to-image pipeline and its feeders.
#[derive(Error, Debug)]
pub enum DantienError {
    /// A batch longer than the buffer capacity. The tick is dropped and the
    /// model is left exactly as it was.
    #[error("invalid batch: {len} samples exceeds buffer capacity {capacity}")]
    InvalidBatch { len: usize, capacity: usize },
    #[error("wavelet configuration error: {0}")]
    WaveletConfig(String),
    #[error("model configuration error: {0}")]
    ModelConfig(String),
    #[error("config file error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, DantienError>;
