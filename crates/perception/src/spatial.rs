//! Egocentric spatial estimation
//!
//! Maps a detection's bounding box to coordinates relative to the frame
//! center (centimetres, up is positive) and a heuristic distance using the
//! pinhole model: distance = reference_height * focal_length / bbox_height.

use crate::detection::Detection;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Camera calibration constants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Calibration {
    /// Frame pixels per egocentric centimetre
    pub pixels_per_cm: f64,

    /// Focal length in pixels
    pub focal_length_px: f64,

    /// Minimum bbox height (px) for a distance estimate; boxes below this
    /// are treated as noise and get no distance
    pub min_bbox_height_px: f32,

    /// Known real-world heights (metres) per class, lowercase keys
    pub reference_heights_m: HashMap<String, f64>,
}

impl Default for Calibration {
    fn default() -> Self {
        let reference_heights_m = [
            ("person", 1.7),
            ("bottle", 0.25),
            ("chair", 1.0),
            ("book", 0.3),
            ("tv", 0.6),
            ("laptop", 0.4),
            ("cellphone", 0.15),
            ("keyboard", 0.45),
            ("mouse", 0.12),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Self {
            pixels_per_cm: 5.0,
            focal_length_px: 700.0,
            min_bbox_height_px: 5.0,
            reference_heights_m,
        }
    }
}

impl Calibration {
    /// Reference height for a class, case-insensitive
    pub fn reference_height(&self, class_label: &str) -> Option<f64> {
        self.reference_heights_m
            .get(&class_label.to_lowercase())
            .copied()
    }
}

/// Egocentric position estimate for one detection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpatialEstimate {
    /// Centimetres right of frame center (negative = left)
    pub coord_x: i32,

    /// Centimetres above frame center (negative = below)
    pub coord_y: i32,

    /// Heuristic distance in metres; `None` for unknown classes or boxes
    /// below the noise floor
    pub distance_m: Option<f64>,
}

/// Deterministic bbox-to-position estimator
#[derive(Debug, Clone, Default)]
pub struct SpatialEstimator {
    calibration: Calibration,
}

impl SpatialEstimator {
    pub fn new(calibration: Calibration) -> Self {
        Self { calibration }
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Estimate egocentric position for a detection in a frame of the
    /// given pixel dimensions.
    pub fn estimate(
        &self,
        detection: &Detection,
        frame_width: u32,
        frame_height: u32,
    ) -> SpatialEstimate {
        let (cx, cy) = detection.bbox.center();

        let coord_x =
            ((cx as f64 - frame_width as f64 / 2.0) / self.calibration.pixels_per_cm).round();
        // Y inverted: up is positive
        let coord_y =
            ((frame_height as f64 / 2.0 - cy as f64) / self.calibration.pixels_per_cm).round();

        let bbox_height = detection.bbox.height;
        let distance_m = self
            .calibration
            .reference_height(&detection.class_label)
            .filter(|_| bbox_height >= self.calibration.min_bbox_height_px && bbox_height > 0.0)
            .map(|reference_m| reference_m * self.calibration.focal_length_px / bbox_height as f64);

        SpatialEstimate {
            coord_x: coord_x as i32,
            coord_y: coord_y as i32,
            distance_m,
        }
    }
}

/// Human-readable distance: whole metres plus whole centimetres, each
/// omitted when zero. `"unknown"` for missing, non-finite, or
/// sub-half-centimetre estimates.
pub fn format_distance(distance_m: Option<f64>) -> String {
    let Some(est) = distance_m else {
        return "unknown".to_string();
    };
    if !est.is_finite() || est <= 0.0 {
        return "unknown".to_string();
    }

    let metres = est.floor() as i64;
    let centimetres = ((est - metres as f64) * 100.0).round() as i64;

    let mut parts = Vec::new();
    if metres > 0 {
        parts.push(format!("{} metres", metres));
    }
    if centimetres > 0 {
        parts.push(format!("{} centimetres", centimetres));
    }

    if parts.is_empty() {
        "unknown".to_string()
    } else {
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::BoundingBox;
    use proptest::prelude::*;

    fn det(label: &str, bbox: BoundingBox) -> Detection {
        Detection::new(label, 0.9, bbox)
    }

    #[test]
    fn test_coordinate_sign_convention() {
        // Box centered left of and above frame center
        let estimator = SpatialEstimator::default();
        let d = det("person", BoundingBox::new(100.0, 50.0, 40.0, 80.0));
        let est = estimator.estimate(&d, 640, 480);
        assert!(est.coord_x < 0);
        assert!(est.coord_y > 0);
    }

    #[test]
    fn test_centered_box_is_origin() {
        let estimator = SpatialEstimator::default();
        let d = det("person", BoundingBox::new(300.0, 220.0, 40.0, 40.0));
        let est = estimator.estimate(&d, 640, 480);
        assert_eq!(est.coord_x, 0);
        assert_eq!(est.coord_y, 0);
    }

    #[test]
    fn test_pinhole_distance() {
        let estimator = SpatialEstimator::default();
        // person: 1.7m reference, focal 700px, bbox height 350px
        let d = det("person", BoundingBox::new(0.0, 0.0, 100.0, 350.0));
        let est = estimator.estimate(&d, 640, 480);
        let distance = est.distance_m.unwrap();
        assert!((distance - 1.7 * 700.0 / 350.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_class_has_no_distance() {
        let estimator = SpatialEstimator::default();
        let d = det("giraffe", BoundingBox::new(0.0, 0.0, 100.0, 350.0));
        assert_eq!(estimator.estimate(&d, 640, 480).distance_m, None);
    }

    #[test]
    fn test_noise_floor_suppresses_distance() {
        let estimator = SpatialEstimator::default();
        let d = det("person", BoundingBox::new(0.0, 0.0, 100.0, 4.0));
        assert_eq!(estimator.estimate(&d, 640, 480).distance_m, None);

        let d = det("person", BoundingBox::new(0.0, 0.0, 100.0, 0.0));
        assert_eq!(estimator.estimate(&d, 640, 480).distance_m, None);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let estimator = SpatialEstimator::default();
        let d = det("Person", BoundingBox::new(0.0, 0.0, 100.0, 200.0));
        assert!(estimator.estimate(&d, 640, 480).distance_m.is_some());
    }

    #[test]
    fn test_format_distance_metres_and_centimetres() {
        assert_eq!(format_distance(Some(1.2)), "1 metres 20 centimetres");
        assert_eq!(format_distance(Some(0.45)), "45 centimetres");
        assert_eq!(format_distance(Some(2.0)), "2 metres");
    }

    #[test]
    fn test_format_distance_unknown() {
        assert_eq!(format_distance(None), "unknown");
        assert_eq!(format_distance(Some(0.0)), "unknown");
        assert_eq!(format_distance(Some(-1.0)), "unknown");
        assert_eq!(format_distance(Some(f64::INFINITY)), "unknown");
        assert_eq!(format_distance(Some(0.001)), "unknown");
    }

    proptest! {
        /// distance(h) = H * f / h is strictly decreasing in bbox height
        #[test]
        fn distance_strictly_decreases_with_height(
            height in 5.0f32..400.0,
            grow in 1.0f32..200.0,
        ) {
            let estimator = SpatialEstimator::default();
            let shorter = det("person", BoundingBox::new(0.0, 0.0, 50.0, height));
            let taller = det("person", BoundingBox::new(0.0, 0.0, 50.0, height + grow));

            let d_shorter = estimator.estimate(&shorter, 640, 480).distance_m.unwrap();
            let d_taller = estimator.estimate(&taller, 640, 480).distance_m.unwrap();
            prop_assert!(d_shorter > d_taller);
        }
    }
}
