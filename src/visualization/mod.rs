// src/visualization/mod.rs

pub mod console;
pub mod views;

use crate::processing::model::ModelSnapshot;

use std::sync::{Arc, PoisonError, RwLock};

pub use console::ConsoleRenderer;
pub use views::{ViewData, ViewKind};

/// Anything that draws itself from a model snapshot. Renderers never see the
/// model itself and cannot mutate it.
pub trait Renderer: Send {
    fn name(&self) -> &str;
    fn draw(&mut self, snapshot: &ModelSnapshot);
}

// SHARED SNAPSHOT -------------------------------------------------------------

/// Latest published snapshot, swapped whole by the writer after every tick.
///
/// Readers hold the lock only long enough to clone the `Arc`, so a reader
/// always sees one complete tick.
#[derive(Clone)]
pub struct SharedSnapshot {
    inner: Arc<RwLock<Option<Arc<ModelSnapshot>>>>,
}

impl SharedSnapshot {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(None)),
        }
    }

    pub fn publish(&self, snapshot: ModelSnapshot) {
        let mut slot = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(Arc::new(snapshot));
    }

    /// The newest snapshot, or `None` before the first tick.
    pub fn latest(&self) -> Option<Arc<ModelSnapshot>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for SharedSnapshot {
    fn default() -> Self {
        Self::new()
    }
}
