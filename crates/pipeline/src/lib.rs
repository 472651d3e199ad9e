//! Visual Perception Pipeline
//!
//! Wires the perception, alerting, narration, and recording crates into
//! one session: a continuous overlay loop, a fixed-interval threat poll
//! loop, and on-demand snapshot/save operations, all sharing one
//! session-scoped state store.

pub mod config;
pub mod loops;
pub mod session;
pub mod status;
pub mod stubs;

pub use config::PipelineConfig;
pub use loops::{spawn_overlay_loop, spawn_threat_poll, LoopHandle};
pub use session::{Pipeline, SnapshotReport};
pub use status::{NullStatus, Status, StatusBoard, StatusSink};

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Pipeline error types
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error(transparent)]
    Capture(#[from] frame_capture::CaptureError),

    #[error(transparent)]
    Perception(#[from] perception::PerceptionError),

    #[error(transparent)]
    Recorder(#[from] cycle_recorder::RecorderError),
}

/// Initialize global tracing output
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}
