// src/bindings/python.rs
use crate::config::ModelConfig;
use crate::feeders::QueueFeeder;
use crate::processing::grid::Grid;
use crate::processing::model::TimeSeriesModel;
use crate::processing::wavelets::Wavelet;

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

fn rows(grid: &Grid) -> Vec<Vec<f64>> {
    (0..grid.rows()).map(|r| grid.row(r).to_vec()).collect()
}

fn to_py_err(e: crate::error::DantienError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

/// Python handle on a model that is fed by hand through `eat_batch`.
#[pyclass]
pub struct PyTimeSeries {
    model: TimeSeriesModel,
}

#[pymethods]
impl PyTimeSeries {
    #[new]
    #[pyo3(signature = (buffer_len=1024, window_size=128, sample_rate=256.0, zoom=1, wavelet="db4"))]
    pub fn new(
        buffer_len: usize,
        window_size: usize,
        sample_rate: f64,
        zoom: usize,
        wavelet: &str,
    ) -> PyResult<Self> {
        let wavelet = match wavelet {
            "haar" => Wavelet::Haar,
            "db2" => Wavelet::Db2,
            "db3" => Wavelet::Db3,
            "db4" => Wavelet::Db4,
            "sym4" => Wavelet::Sym4,
            other => {
                return Err(PyValueError::new_err(format!(
                    "unknown wavelet '{}'",
                    other
                )))
            }
        };
        let config = ModelConfig {
            buffer_len,
            window_size,
            sample_rate,
            zoom,
            wavelet,
            ..ModelConfig::default()
        };
        let model =
            TimeSeriesModel::new(&config, Box::new(QueueFeeder::default())).map_err(to_py_err)?;
        Ok(PyTimeSeries { model })
    }

    /// Ingests one batch, returning the number of samples kept after zoom.
    pub fn eat_batch(&mut self, data: Vec<f64>) -> PyResult<usize> {
        self.model.eat_batch(&data).map_err(to_py_err)
    }

    pub fn series(&self) -> Vec<f64> {
        self.model.series().to_vec()
    }

    pub fn spectrogram(&self) -> Vec<Vec<f64>> {
        rows(self.model.spectrogram())
    }

    pub fn scaleogram(&self) -> Vec<Vec<f64>> {
        rows(self.model.scaleogram())
    }

    pub fn freqs(&self) -> Vec<f64> {
        self.model.freqs().to_vec()
    }

    pub fn tick(&self) -> u64 {
        self.model.tick()
    }
}

/// A Python module implemented in Rust.
#[pymodule]
pub fn dantien(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyTimeSeries>()?;
    Ok(())
}
