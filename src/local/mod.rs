// src/local/mod.rs

pub mod scheduler;

pub use scheduler::{spawn_render_loop, Scheduler, TickOutcome};
