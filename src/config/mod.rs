// src/config/mod.rs
use crate::error::{DantienError, Result};
use crate::processing::scaleogram::{SCALEOGRAM_CLIP, SCALEOGRAM_SIZE};
use crate::processing::spectrogram::{StftMargins, Taper, SPECTROGRAM_CLIP};
use crate::processing::wavelets::Wavelet;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub model: ModelConfig,
    pub feeder: FeederConfig,
    pub scheduler: SchedulerConfig,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        self.model.validate()?;
        self.feeder.validate()?;
        self.scheduler.validate()?;

        // A fixed-size batch that outgrows the buffer after decimation would
        // fail every single tick
        if let Some(len) = self.feeder.batch_len() {
            let kept = (len + self.model.zoom - 1) / self.model.zoom;
            if kept > self.model.buffer_len {
                return Err(DantienError::Config(format!(
                    "feeder batches of {} samples keep {} after zoom {}, more than buffer_len {}",
                    len, kept, self.model.zoom, self.model.buffer_len
                )));
            }
        }
        Ok(())
    }
}

// MODEL CONFIG ----------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ModelConfig {
    pub buffer_len: usize,
    pub window_size: usize,
    pub sample_rate: f64,
    /// Keep every `zoom`-th incoming sample.
    pub zoom: usize,
    pub taper: Taper,
    pub clip_spectrogram: bool,
    pub spectrogram_clip: f64,
    pub scaleogram_clip: f64,
    /// Side of the square scaleogram image.
    pub scaleogram_size: usize,
    pub wavelet: Wavelet,
    pub wavelet_level: u32,
    pub margins: StftMargins,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            buffer_len: 1024,
            window_size: 128,
            sample_rate: 256.0, // ModEEG P2 rate
            zoom: 1,
            taper: Taper::Rectangular,
            clip_spectrogram: true,
            spectrogram_clip: SPECTROGRAM_CLIP,
            scaleogram_clip: SCALEOGRAM_CLIP,
            scaleogram_size: SCALEOGRAM_SIZE,
            wavelet: Wavelet::Db4,
            wavelet_level: 5,
            margins: StftMargins::default(),
        }
    }
}

impl ModelConfig {
    /// Checks the scalar parameters. Engine-specific constraints (window vs
    /// buffer, wavelet depth) are checked when the engines are built.
    pub fn validate(&self) -> Result<()> {
        if self.buffer_len == 0 {
            return Err(DantienError::ModelConfig(
                "buffer_len must be positive".to_string(),
            ));
        }
        if self.zoom == 0 {
            return Err(DantienError::ModelConfig("zoom must be at least 1".to_string()));
        }
        if !(self.sample_rate > 0.0) {
            return Err(DantienError::ModelConfig(format!(
                "sample_rate must be positive, got {}",
                self.sample_rate
            )));
        }
        if self.spectrogram_clip < 0.0 || self.scaleogram_clip < 0.0 {
            return Err(DantienError::ModelConfig(
                "clip bounds must be non-negative".to_string(),
            ));
        }
        self.margins.validate()
    }
}

// FEEDER CONFIG ---------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeederConfig {
    RandomSinusoids {
        len: usize,
        max_rate: f64,
        amplitude: f64,
    },
    PositiveSinusoids {
        len: usize,
        max_rate: f64,
    },
    /// ModEEG P2 frames read from stdin.
    Modeeg { channel: usize },
    Csv {
        path: PathBuf,
        column: usize,
        chunk_size: usize,
        looping: bool,
    },
}

impl Default for FeederConfig {
    fn default() -> Self {
        FeederConfig::RandomSinusoids {
            len: 100,
            max_rate: 5.0,
            amplitude: 1.0,
        }
    }
}

impl FeederConfig {
    /// Samples per `feed` for feeders with a fixed batch size.
    pub fn batch_len(&self) -> Option<usize> {
        match self {
            FeederConfig::RandomSinusoids { len, .. }
            | FeederConfig::PositiveSinusoids { len, .. } => Some(*len),
            FeederConfig::Csv { chunk_size, .. } => Some(*chunk_size),
            FeederConfig::Modeeg { .. } => None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            FeederConfig::Modeeg { channel } if *channel >= crate::feeders::modeeg::CHANNELS => {
                Err(DantienError::Config(format!(
                    "ModEEG channel {} out of range (0..{})",
                    channel,
                    crate::feeders::modeeg::CHANNELS
                )))
            }
            FeederConfig::Csv { chunk_size: 0, .. } => Err(DantienError::Config(
                "CSV chunk_size must be positive".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

// SCHEDULER CONFIG ------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct SchedulerConfig {
    pub update_rate_hz: f64,
    pub render_rate_hz: f64,
    pub enable_debug_logging: bool,
    pub log_file: String,
    pub timing_file: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            update_rate_hz: 20.0,
            render_rate_hz: 10.0,
            enable_debug_logging: false,
            log_file: "dantien.log".to_string(),
            timing_file: "ticks.csv".to_string(),
        }
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.update_rate_hz > 0.0) || !(self.render_rate_hz > 0.0) {
            return Err(DantienError::Config(
                "update and render rates must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let config_str = fs::read_to_string(path)
        .map_err(|e| DantienError::Config(format!("Failed to read config file: {}", e)))?;

    let config: Config = serde_yaml::from_str(&config_str)
        .map_err(|e| DantienError::Config(format!("Failed to parse config file: {}", e)))?;
    config.validate()?;
    Ok(config)
}

pub fn save_config<P: AsRef<Path>>(config: &Config, path: P) -> Result<()> {
    let yaml = serde_yaml::to_string(config)
        .map_err(|e| DantienError::Config(format!("Failed to serialize config: {}", e)))?;

    fs::write(path, yaml)
        .map_err(|e| DantienError::Config(format!("Failed to write config file: {}", e)))
}
