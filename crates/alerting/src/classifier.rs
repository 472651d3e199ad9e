//! Threat classification
//!
//! Static many-to-one mapping from model class labels to normalized
//! hazard alert labels. Non-hazard classes never yield a label.

use serde::Serialize;
use std::fmt;

/// Normalized hazard grouping; the cooldown key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AlertLabel(&'static str);

impl AlertLabel {
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for AlertLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Hazard table: model class -> alert label
const HAZARD_TABLE: &[(&str, &str)] = &[
    ("car", "vehicle"),
    ("truck", "vehicle"),
    ("bus", "vehicle"),
    ("motorcycle", "vehicle"),
    ("bicycle", "vehicle"),
];

/// Map a model class label to its hazard alert label, case-insensitive.
pub fn classify(class_label: &str) -> Option<AlertLabel> {
    let lowered = class_label.to_lowercase();
    HAZARD_TABLE
        .iter()
        .find(|(class, _)| *class == lowered)
        .map(|(_, label)| AlertLabel(label))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_classes_normalize() {
        for class in ["car", "truck", "bus", "motorcycle", "bicycle"] {
            let label = classify(class).unwrap();
            assert_eq!(label.as_str(), "vehicle");
        }
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(classify("Car"), classify("car"));
        assert!(classify("TRUCK").is_some());
    }

    #[test]
    fn test_non_hazard_classes_have_no_label() {
        assert!(classify("person").is_none());
        assert!(classify("book").is_none());
        assert!(classify("").is_none());
    }
}
