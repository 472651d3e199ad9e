//! Snapshot Cycle Recording
//!
//! Accumulates the detection cycles produced by snapshot actions and
//! serializes them into one saved-cycle text artifact on flush. The
//! destination (filename, directory) belongs to the `ArtifactSink`
//! implementation, not the core.

pub mod cycle;
pub mod recorder;

pub use cycle::{ordinal, render_cycles, DetectionCycle, RecordedDetection};
pub use recorder::{ArtifactSink, CycleRecorder, SaveOutcome};

use thiserror::Error;

/// Recorder error types
#[derive(Error, Debug)]
pub enum RecorderError {
    #[error("Artifact persistence failed: {0}")]
    Persist(String),
}
