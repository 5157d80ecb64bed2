// src/feeders/csv.rs
use super::Feeder;
use crate::error::{DantienError, Result};

use std::io::Read;
use std::path::Path;

// -----------------------------------------------------------------------------
// CSV PLAYBACK
// -----------------------------------------------------------------------------

/// Plays back one column of a recorded CSV file, `chunk_size` samples per
/// tick. Non-numeric rows (such as a header line) are skipped.
pub struct CsvFeeder {
    samples: Vec<f64>,
    chunk_size: usize,
    position: usize,
    looping: bool,
}

impl CsvFeeder {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        column: usize,
        chunk_size: usize,
        looping: bool,
    ) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, column, chunk_size, looping)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        column: usize,
        chunk_size: usize,
        looping: bool,
    ) -> Result<Self> {
        if chunk_size == 0 {
            return Err(DantienError::Config(
                "CSV chunk_size must be positive".to_string(),
            ));
        }
        let samples = read_signal_column(reader, column)?;
        Ok(Self::from_samples(samples, chunk_size, looping))
    }

    pub fn from_samples(samples: Vec<f64>, chunk_size: usize, looping: bool) -> Self {
        Self {
            samples,
            chunk_size,
            position: 0,
            looping,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn next_chunk(&mut self) -> Vec<f64> {
        if self.samples.is_empty() {
            return Vec::new();
        }
        if self.position >= self.samples.len() {
            if !self.looping {
                return Vec::new();
            }
            self.position = 0;
        }
        let end = (self.position + self.chunk_size).min(self.samples.len());
        let chunk = self.samples[self.position..end].to_vec();
        self.position = end;
        chunk
    }
}

impl Feeder for CsvFeeder {
    fn feed(&mut self) -> Result<Vec<f64>> {
        Ok(self.next_chunk())
    }
}

fn read_signal_column<R: Read>(reader: R, column: usize) -> Result<Vec<f64>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut data = Vec::new();
    for result in rdr.records() {
        let record = result?;
        match record.get(column).map(str::parse::<f64>) {
            Some(Ok(value)) => data.push(value),
            Some(Err(_)) => continue,
            None => {
                return Err(DantienError::Config(format!(
                    "CSV column {} missing on line {}",
                    column,
                    record.position().map_or(0, |p| p.line())
                )))
            }
        }
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORDING: &str = "time,fp1\n0,0.5\n1,0.25\n2,-0.25\n3,1.0\n4,0.0\n";

    #[test]
    fn reads_the_selected_column_and_skips_the_header() {
        let feeder = CsvFeeder::from_reader(RECORDING.as_bytes(), 1, 2, false).unwrap();
        assert_eq!(feeder.len(), 5);
    }

    #[test]
    fn plays_back_in_chunks_then_goes_quiet() {
        let mut feeder = CsvFeeder::from_reader(RECORDING.as_bytes(), 1, 2, false).unwrap();
        assert_eq!(feeder.feed().unwrap(), vec![0.5, 0.25]);
        assert_eq!(feeder.feed().unwrap(), vec![-0.25, 1.0]);
        assert_eq!(feeder.feed().unwrap(), vec![0.0]);
        assert!(feeder.feed().unwrap().is_empty());
    }

    #[test]
    fn looping_restarts_from_the_top() {
        let mut feeder = CsvFeeder::from_samples(vec![1.0, 2.0, 3.0], 2, true);
        assert_eq!(feeder.next_chunk(), vec![1.0, 2.0]);
        assert_eq!(feeder.next_chunk(), vec![3.0]);
        assert_eq!(feeder.next_chunk(), vec![1.0, 2.0]);
    }

    #[test]
    fn missing_column_is_reported() {
        assert!(CsvFeeder::from_reader(RECORDING.as_bytes(), 4, 2, false).is_err());
    }
}
