//! Status surface
//!
//! The pipeline reports coarse availability once per transition; a
//! degraded capability idles the affected path instead of crashing it.

use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Pipeline availability state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Capabilities still coming up
    Loading,
    /// Detecting normally
    Ready,
    /// A capability is unavailable; the affected path is idle
    Degraded(String),
    /// Nothing can run
    Failed(String),
}

/// Host-owned status display (a status line, an LED, a log)
pub trait StatusSink: Send + Sync {
    fn status_changed(&self, status: &Status);
}

/// No-op sink for hosts that only want logs
pub struct NullStatus;

impl StatusSink for NullStatus {
    fn status_changed(&self, _status: &Status) {}
}

/// Deduplicating status holder: each distinct state is surfaced once,
/// repeats are dropped.
pub struct StatusBoard {
    sink: Arc<dyn StatusSink>,
    last: Mutex<Option<Status>>,
}

impl StatusBoard {
    pub fn new(sink: Arc<dyn StatusSink>) -> Self {
        Self {
            sink,
            last: Mutex::new(None),
        }
    }

    pub fn set(&self, status: Status) {
        let mut last = match self.last.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if last.as_ref() == Some(&status) {
            return;
        }

        match &status {
            Status::Degraded(reason) => warn!("Pipeline degraded: {}", reason),
            Status::Failed(reason) => warn!("Pipeline failed: {}", reason),
            other => info!("Pipeline status: {:?}", other),
        }
        self.sink.status_changed(&status);
        *last = Some(status);
    }

    pub fn current(&self) -> Option<Status> {
        match self.last.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
