// src/lib.rs
//! Real-time signal-to-image core: a sliding sample buffer feeding an
//! incremental spectrogram and a wavelet packet scaleogram.

#[cfg(feature = "python")]
pub mod bindings;
pub mod config;
pub mod error;
pub mod feeders;
pub mod local;
pub mod processing;
pub mod utils;
pub mod visualization;

pub use config::{Config, FeederConfig, ModelConfig, SchedulerConfig};
pub use error::{DantienError, Result};
pub use feeders::Feeder;
pub use local::Scheduler;
pub use processing::model::{ModelSnapshot, ModelState, TimeSeriesModel};
pub use visualization::{Renderer, SharedSnapshot};
