//! Perception Core
//!
//! Converts external model output into pipeline-owned values:
//! - A strict `Detection` boundary type with sanitization
//! - Egocentric spatial estimation (pinhole distance heuristic)
//! - Overlay plans for an external renderer

pub mod detection;
pub mod overlay;
pub mod spatial;

pub use detection::{sanitize, BoundingBox, Detection, Detector};
pub use overlay::{color_for_label, OverlayBox, OverlayPlan, OverlaySink, OverlayStyle};
pub use spatial::{format_distance, Calibration, SpatialEstimate, SpatialEstimator};

use thiserror::Error;

/// Perception error types
#[derive(Error, Debug)]
pub enum PerceptionError {
    #[error("Detector unavailable: {0}")]
    Unavailable(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Invalid frame format")]
    InvalidFrame,
}
