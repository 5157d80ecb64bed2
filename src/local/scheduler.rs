// src/local/scheduler.rs
use crate::config::SchedulerConfig;
use crate::error::{DantienError, Result};
use crate::processing::model::TimeSeriesModel;
use crate::utils::log::{log_csv, log_to_file, log_with_header};
use crate::visualization::{Renderer, SharedSnapshot};

use colored::Colorize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const TIMING_HEADERS: [&str; 4] = ["tick", "samples", "duration_us", "staleness_ms"];

/// Outcome of one scheduler tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Ate { samples: usize, duration: Duration },
    Skipped,
}

// -----------------------------------------------------------------------------
// SCHEDULER
// -----------------------------------------------------------------------------

/// Fixed-rate driver that owns the model, ticks it and publishes a fresh
/// snapshot after every successful tick.
pub struct Scheduler {
    model: TimeSeriesModel,
    shared: SharedSnapshot,
    config: SchedulerConfig,
    interval: Duration,
    skipped: usize,
}

impl Scheduler {
    pub fn new(model: TimeSeriesModel, config: SchedulerConfig) -> Result<Self> {
        config.validate()?;
        let interval = Duration::from_secs_f64(1.0 / config.update_rate_hz);
        let shared = SharedSnapshot::new();
        shared.publish(model.snapshot());

        if config.enable_debug_logging {
            let summary = format!(
                "buffer_len: {}\nwindow_size: {}\nupdate_rate_hz: {}\nrender_rate_hz: {}",
                model.capacity(),
                model.window_size(),
                config.update_rate_hz,
                config.render_rate_hz
            );
            if let Err(e) = log_with_header(&config.log_file, "session start", &summary) {
                eprintln!("Failed to write to log file: {}", e);
            }
        }

        Ok(Self {
            model,
            shared,
            config,
            interval,
            skipped: 0,
        })
    }

    /// Handle for readers. Cloning is cheap.
    pub fn shared(&self) -> SharedSnapshot {
        self.shared.clone()
    }

    pub fn model(&self) -> &TimeSeriesModel {
        &self.model
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Runs one tick. A failed tick is logged and skipped; the next tick
    /// proceeds as normal.
    pub fn tick(&mut self) -> TickOutcome {
        let start = Instant::now();
        match self.model.eat() {
            Ok(samples) => {
                let duration = start.elapsed();
                self.shared.publish(self.model.snapshot());
                if self.config.enable_debug_logging {
                    self.log_timing(samples, duration);
                }
                TickOutcome::Ate { samples, duration }
            }
            Err(e) => {
                self.skipped += 1;
                self.report(&e);
                TickOutcome::Skipped
            }
        }
    }

    /// Runs `ticks` ticks at the configured rate.
    pub fn run_for(&mut self, ticks: usize) {
        for _ in 0..ticks {
            let start = Instant::now();
            self.tick();
            self.sleep_rest(start);
        }
    }

    /// Ticks until `stop` is raised.
    pub fn run(&mut self, stop: &AtomicBool) {
        while !stop.load(Ordering::Relaxed) {
            let start = Instant::now();
            self.tick();
            self.sleep_rest(start);
        }
    }

    fn sleep_rest(&self, start: Instant) {
        if let Some(rest) = self.interval.checked_sub(start.elapsed()) {
            thread::sleep(rest);
        }
    }

    fn report(&self, error: &DantienError) {
        let message = format!("tick {} skipped: {}", self.model.tick() + 1, error);
        eprintln!("{} {}", "warning:".yellow().bold(), message);
        if self.config.enable_debug_logging {
            if let Err(e) = log_to_file(&self.config.log_file, &message) {
                eprintln!("Failed to write to log file: {}", e);
            }
        }
    }

    fn log_timing(&self, samples: usize, duration: Duration) {
        let row = [
            self.model.tick().to_string(),
            samples.to_string(),
            duration.as_micros().to_string(),
            self.model.staleness().as_millis().to_string(),
        ];
        if let Err(e) = log_csv(&self.config.timing_file, &TIMING_HEADERS, &row) {
            eprintln!("Failed to write timing row: {}", e);
        }
    }
}

// -----------------------------------------------------------------------------
// RENDER LOOP
// -----------------------------------------------------------------------------

/// Spawns a thread that draws the latest snapshot with every renderer at
/// `rate_hz`, independently of the tick rate, until `stop` is raised.
pub fn spawn_render_loop(
    shared: SharedSnapshot,
    mut renderers: Vec<Box<dyn Renderer>>,
    rate_hz: f64,
    stop: Arc<AtomicBool>,
) -> thread::JoinHandle<()> {
    let interval = Duration::from_secs_f64(1.0 / rate_hz.max(f64::EPSILON));
    thread::spawn(move || {
        let mut last_drawn = None;
        while !stop.load(Ordering::Relaxed) {
            if let Some(snapshot) = shared.latest() {
                // Staleness still changes between ticks, so redraw regardless
                for renderer in renderers.iter_mut() {
                    renderer.draw(&snapshot);
                }
                last_drawn = Some(snapshot.tick);
            }
            thread::sleep(interval);
        }
        if let Some(tick) = last_drawn {
            println!("Render loop stopped after tick {}", tick);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use crate::feeders::QueueFeeder;
    use crate::processing::model::ModelSnapshot;
    use std::sync::Mutex;

    fn scheduler(batches: Vec<Vec<f64>>) -> Scheduler {
        let config = ModelConfig {
            buffer_len: 256,
            window_size: 64,
            ..ModelConfig::default()
        };
        let model = TimeSeriesModel::new(&config, Box::new(QueueFeeder::new(batches))).unwrap();
        let scheduler_config = SchedulerConfig {
            update_rate_hz: 1000.0,
            ..SchedulerConfig::default()
        };
        Scheduler::new(model, scheduler_config).unwrap()
    }

    #[test]
    fn publishes_a_snapshot_per_tick() {
        let mut scheduler = scheduler(vec![vec![0.1; 10], vec![0.2; 10]]);
        let shared = scheduler.shared();
        assert_eq!(shared.latest().unwrap().tick, 0);

        scheduler.run_for(2);
        let latest = shared.latest().unwrap();
        assert_eq!(latest.tick, 2);
        assert_eq!(latest.series[255], 0.2);
    }

    #[test]
    fn bad_tick_is_skipped_and_the_next_one_runs() {
        let mut scheduler = scheduler(vec![vec![0.0; 300], vec![0.5; 4]]);
        assert_eq!(scheduler.tick(), TickOutcome::Skipped);
        assert_eq!(scheduler.skipped(), 1);
        assert_eq!(scheduler.shared().latest().unwrap().tick, 0);

        assert!(matches!(scheduler.tick(), TickOutcome::Ate { samples: 4, .. }));
        assert_eq!(scheduler.model().tick(), 1);
    }

    struct Recorder(Arc<Mutex<Vec<u64>>>);

    impl Renderer for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        fn draw(&mut self, snapshot: &ModelSnapshot) {
            self.0.lock().unwrap().push(snapshot.tick);
        }
    }

    #[test]
    fn render_loop_reads_published_snapshots() {
        let mut scheduler = scheduler(vec![vec![0.3; 8]]);
        scheduler.run_for(1);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let stop = Arc::new(AtomicBool::new(false));
        let renderers: Vec<Box<dyn Renderer>> = vec![Box::new(Recorder(Arc::clone(&seen)))];
        let handle = spawn_render_loop(
            scheduler.shared(),
            renderers,
            500.0,
            Arc::clone(&stop),
        );
        let deadline = Instant::now() + Duration::from_secs(5);
        while seen.lock().unwrap().is_empty() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        stop.store(true, Ordering::Relaxed);
        handle.join().unwrap();

        assert_eq!(seen.lock().unwrap().first(), Some(&1));
    }
}
