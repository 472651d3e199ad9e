//! Pipeline configuration
//!
//! Defaults cover the whole surface; an optional file plus `VEYES_`
//! environment variables override individual fields.

use crate::PipelineError;
use alerting::{DispatchConfig, ThrottleConfig};
use ::config::{Config, Environment, File};
use perception::Calibration;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Minimum confidence for a detection to enter the hazard path
    pub score_threshold: f32,

    /// Threat poll loop interval (ms)
    pub poll_interval_ms: u64,

    /// Overlay loop frame pacing (ms)
    pub render_interval_ms: u64,

    /// How long threat overlay boxes stay before auto-clear (ms)
    pub threat_overlay_lifetime_ms: u64,

    /// Pause between narrated objects (ms)
    pub narration_pause_ms: u64,

    /// Snapshot surface cap
    pub snapshot_max_width: u32,
    pub snapshot_max_height: u32,

    /// Per-label alert cooldown
    pub throttle: ThrottleConfig,

    /// Alert channel parameters
    pub dispatch: DispatchConfig,

    /// Spatial estimation constants
    pub calibration: Calibration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            score_threshold: 0.5,
            poll_interval_ms: 700,
            render_interval_ms: 33,
            threat_overlay_lifetime_ms: 900,
            narration_pause_ms: 100,
            snapshot_max_width: 920,
            snapshot_max_height: 620,
            throttle: ThrottleConfig::default(),
            dispatch: DispatchConfig::default(),
            calibration: Calibration::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration: defaults, then an optional file, then
    /// `VEYES_`-prefixed environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, PipelineError> {
        let mut builder =
            Config::builder().add_source(Config::try_from(&PipelineConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let merged = builder
            .add_source(Environment::with_prefix("VEYES").separator("__"))
            .build()?;

        Ok(merged.try_deserialize()?)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn render_interval(&self) -> Duration {
        Duration::from_millis(self.render_interval_ms)
    }

    pub fn threat_overlay_lifetime(&self) -> Duration {
        Duration::from_millis(self.threat_overlay_lifetime_ms)
    }

    pub fn narration_pause(&self) -> Duration {
        Duration::from_millis(self.narration_pause_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_constants() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.score_threshold, 0.5);
        assert_eq!(cfg.poll_interval(), Duration::from_millis(700));
        assert_eq!(cfg.throttle.cooldown_ms, 5_000);
        assert_eq!(cfg.dispatch.beep_count, 3);
        assert_eq!(cfg.calibration.focal_length_px, 700.0);
        assert_eq!(cfg.snapshot_max_width, 920);
        assert_eq!(cfg.snapshot_max_height, 620);
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let cfg = PipelineConfig::load(None).unwrap();
        assert_eq!(cfg.threat_overlay_lifetime(), Duration::from_millis(900));
        assert_eq!(cfg.narration_pause(), Duration::from_millis(100));
    }
}
