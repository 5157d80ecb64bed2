// src/visualization/console.rs
use super::views::{ViewData, ViewKind};
use super::Renderer;
use crate::processing::model::ModelSnapshot;

use colored::Colorize;
use std::io::{self, Write};

/// Text rendition of the newest FFT slice: one bar per frequency band, the
/// strongest band in red.
pub struct ConsoleRenderer<W: Write + Send> {
    out: W,
    bands: usize,
    bar_width: usize,
    scale: f64,
}

impl ConsoleRenderer<io::Stdout> {
    pub fn stdout(bands: usize) -> Self {
        Self::new(io::stdout(), bands)
    }
}

impl<W: Write + Send> ConsoleRenderer<W> {
    pub fn new(out: W, bands: usize) -> Self {
        Self {
            out,
            bands: bands.max(1),
            bar_width: 60,
            scale: 0.5, // full sinusoid magnitude
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Mean magnitude per band and the frequency each band starts at.
    fn band_levels(&self, snapshot: &ModelSnapshot) -> Vec<(f64, f64)> {
        let (freqs, slice) = match ViewKind::FftSlice.prepare(snapshot) {
            ViewData::Trace { x, values, .. } => (x, values),
            _ => return Vec::new(),
        };
        if slice.is_empty() {
            return Vec::new();
        }
        let per_band = (slice.len() + self.bands - 1) / self.bands;
        slice
            .chunks(per_band)
            .enumerate()
            .map(|(band, bins)| {
                let level = bins.iter().sum::<f64>() / bins.len() as f64;
                (freqs[band * per_band], level)
            })
            .collect()
    }

    fn render(&mut self, snapshot: &ModelSnapshot) -> io::Result<()> {
        let levels = self.band_levels(snapshot);
        let peak = levels
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(idx, _)| idx);

        let last = snapshot.series.last().copied().unwrap_or(0.0);
        writeln!(
            self.out,
            "{} tick {:>6}  last sample {:>8.4}  stale {:>5} ms",
            "dantien".bold(),
            snapshot.tick,
            last,
            snapshot.staleness().as_millis()
        )?;

        for (band, (freq, level)) in levels.iter().enumerate() {
            // To ensure |repeat| stays on one line
            let len = ((level / self.scale) * self.bar_width as f64)
                .clamp(0.0, self.bar_width as f64) as usize;
            let bar = "|".repeat(len);
            let bar = if Some(band) == peak {
                bar.red()
            } else {
                bar.white()
            };
            writeln!(self.out, "{:>7.1} Hz {}", freq, bar)?;
        }
        self.out.flush()
    }
}

impl<W: Write + Send> Renderer for ConsoleRenderer<W> {
    fn name(&self) -> &str {
        "console"
    }

    fn draw(&mut self, snapshot: &ModelSnapshot) {
        if let Err(e) = self.render(snapshot) {
            eprintln!("Console renderer error: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use crate::feeders::QueueFeeder;
    use crate::processing::model::TimeSeriesModel;

    #[test]
    fn draws_one_line_per_band_plus_header() {
        colored::control::set_override(false);
        let config = ModelConfig {
            buffer_len: 256,
            window_size: 32,
            ..ModelConfig::default()
        };
        let tone: Vec<f64> = (0..256)
            .map(|i| (2.0 * std::f64::consts::PI * 4.0 * i as f64 / 32.0).cos())
            .collect();
        let mut model =
            TimeSeriesModel::new(&config, Box::new(QueueFeeder::new(vec![tone]))).unwrap();
        model.eat().unwrap();

        let mut renderer = ConsoleRenderer::new(Vec::new(), 4);
        renderer.draw(&model.snapshot());
        let text = String::from_utf8(renderer.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0].split_whitespace().nth(2), Some("1"));
        assert!(lines[2].contains('|'));
    }
}
