//! Detection boundary types and the detector capability

use crate::PerceptionError;
use frame_capture::Frame;
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::debug;

/// Axis-aligned bounding box in frame pixel space
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Box center
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Finite coordinates and non-negative size
    pub fn is_valid(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.width >= 0.0
            && self.height >= 0.0
    }
}

/// One model output for one frame. Ephemeral: produced per inference
/// call and never retained across passes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    /// Class label as reported by the model
    pub class_label: String,

    /// Detection confidence in [0, 1]
    pub confidence: f32,

    /// Bounding box in frame pixels
    pub bbox: BoundingBox,
}

impl Detection {
    pub fn new(class_label: impl Into<String>, confidence: f32, bbox: BoundingBox) -> Self {
        Self {
            class_label: class_label.into(),
            confidence,
            bbox,
        }
    }

    /// Confidence as a whole percentage
    pub fn confidence_percent(&self) -> u8 {
        (self.confidence * 100.0).round().clamp(0.0, 100.0) as u8
    }
}

/// Drop detections the external model should never have produced.
///
/// The raw external shape stops here; everything downstream can assume
/// finite geometry and in-range confidence.
pub fn sanitize(detections: Vec<Detection>) -> Vec<Detection> {
    detections
        .into_iter()
        .filter(|d| {
            let ok = d.bbox.is_valid()
                && d.confidence.is_finite()
                && (0.0..=1.0).contains(&d.confidence)
                && !d.class_label.is_empty();
            if !ok {
                debug!(class = %d.class_label, "Dropping malformed detection at boundary");
            }
            ok
        })
        .collect()
}

/// External detection capability. Inference internals are opaque; the
/// pipeline only sees labeled boxes.
pub trait Detector: Send + Sync {
    fn detect(
        &self,
        frame: &Frame,
    ) -> impl Future<Output = Result<Vec<Detection>, PerceptionError>> + Send;
}
