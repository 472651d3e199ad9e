//! Detection cycle records and saved-cycle text rendering

use serde::{Deserialize, Serialize};

/// One detection inside a recorded cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedDetection {
    pub class_label: String,
    pub confidence_percent: u8,
    pub coord_x: i32,
    pub coord_y: i32,
    /// Display-formatted distance, `"unknown"` when undefined
    pub distance: String,
}

/// The full detection result set captured by one snapshot action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionCycle {
    /// Wall-clock capture time, `HH:MM:SS`
    pub time: String,
    /// 1-based cycle number within the session; resets after a save
    pub ordinal: u32,
    /// Detections in detection order
    pub detections: Vec<RecordedDetection>,
}

/// English ordinal: 1st, 2nd, 3rd, 4th, ... with 11th/12th/13th exceptions
pub fn ordinal(n: u32) -> String {
    let suffix = match n % 100 {
        11..=13 => "th",
        _ => match n % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        },
    };
    format!("{}{}", n, suffix)
}

/// Render cycles into the saved-cycle text format.
///
/// One block per cycle: a `detection` header line, one `object` line per
/// detection (or the literal `no_objects_detected`), then a blank line.
/// Every line ends with a newline, including the blank terminator.
pub fn render_cycles(cycles: &[DetectionCycle]) -> String {
    let mut out = String::new();
    for cycle in cycles {
        out.push_str(&format!("detection {} {}\n", cycle.time, ordinal(cycle.ordinal)));
        if cycle.detections.is_empty() {
            out.push_str("no_objects_detected\n");
        } else {
            for (i, d) in cycle.detections.iter().enumerate() {
                out.push_str(&format!(
                    "object {} {{{}}}{{{},{}}}{{{}%}}\n",
                    i + 1,
                    d.distance,
                    d.coord_x,
                    d.coord_y,
                    d.confidence_percent
                ));
            }
        }
        out.push('\n');
    }
    out
}
