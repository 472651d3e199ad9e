//! Overlay planning
//!
//! The pipeline never touches canvas/DOM primitives; each pass plans a
//! clear-then-draw list and hands it to an `OverlaySink` implementation
//! owned by the host renderer.

use crate::detection::Detection;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Stable accent palette; a label always maps to the same color
const PALETTE: [&str; 7] = [
    "#00c4cc", "#4fb0ff", "#f6b352", "#9b8cff", "#ff6b6b", "#45c272", "#ff9ee3",
];

/// Height of the label chip above a box (px)
const LABEL_CHIP_HEIGHT: f32 = 18.0;

/// Max height of the filled header band on threat boxes (px)
const THREAT_HEADER_MAX: f32 = 28.0;

/// Accent color for a label, stable per label string
pub fn color_for_label(label: &str) -> &'static str {
    let mut hash: i32 = 0;
    for byte in label.bytes() {
        hash = hash.wrapping_shl(5).wrapping_sub(hash).wrapping_add(byte as i32);
    }
    PALETTE[hash.unsigned_abs() as usize % PALETTE.len()]
}

/// Overlay rendering style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverlayStyle {
    /// Continuous live annotation
    Live,
    /// Hazard annotation (red boxes, filled header band)
    Threat,
}

/// One annotated box
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayBox {
    /// Box geometry, frame pixels
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,

    /// Chip text, `"{class} {confidence}%"`
    pub label_text: String,

    /// Accent color (CSS hex)
    pub accent: String,

    /// Y of the label chip; above the box, clamped to the box top when the
    /// box touches the frame edge
    pub label_y: f32,

    /// Filled header band height for threat boxes
    pub header_height: Option<f32>,
}

/// One pass's clear-then-draw list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayPlan {
    pub style: OverlayStyle,
    pub boxes: Vec<OverlayBox>,

    /// The renderer clears the plan after this long; `None` means the plan
    /// stands until the next one replaces it
    pub expires_after: Option<Duration>,
}

impl OverlayPlan {
    /// Empty plan that clears the surface
    pub fn clear(style: OverlayStyle) -> Self {
        Self {
            style,
            boxes: Vec::new(),
            expires_after: None,
        }
    }

    /// Plan the continuous live annotation for one detection pass.
    pub fn live(detections: &[Detection]) -> Self {
        let boxes = detections
            .iter()
            .map(|d| {
                let label_text = format!("{} {}%", d.class_label, d.confidence_percent());
                OverlayBox {
                    x: d.bbox.x,
                    y: d.bbox.y,
                    width: d.bbox.width,
                    height: d.bbox.height,
                    accent: color_for_label(&d.class_label).to_string(),
                    label_y: chip_y(d.bbox.y),
                    label_text,
                    header_height: None,
                }
            })
            .collect();

        Self {
            style: OverlayStyle::Live,
            boxes,
            expires_after: None,
        }
    }

    /// Plan the hazard annotation for one threat pass; auto-expires so
    /// boxes never go stale between polls.
    pub fn threat(detections: &[Detection], lifetime: Duration) -> Self {
        let boxes = detections
            .iter()
            .map(|d| {
                let label_text = format!("{} {}%", d.class_label, d.confidence_percent());
                OverlayBox {
                    x: d.bbox.x,
                    y: d.bbox.y,
                    width: d.bbox.width,
                    height: d.bbox.height,
                    accent: "#ff3c3c".to_string(),
                    label_y: chip_y(d.bbox.y),
                    label_text,
                    header_height: Some(d.bbox.height.min(THREAT_HEADER_MAX)),
                }
            })
            .collect();

        Self {
            style: OverlayStyle::Threat,
            boxes,
            expires_after: Some(lifetime),
        }
    }
}

fn chip_y(box_y: f32) -> f32 {
    if box_y - LABEL_CHIP_HEIGHT >= 0.0 {
        box_y - LABEL_CHIP_HEIGHT
    } else {
        box_y
    }
}

/// Render capability owned by the host; fire-and-forget, never fails the
/// calling loop.
pub trait OverlaySink: Send + Sync {
    fn render(&self, plan: OverlayPlan);
}
