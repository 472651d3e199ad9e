//! Alert Throttle Implementation
//!
//! Per-label cooldown state machine. A label is either Idle (no entry, or
//! its window has elapsed) or Cooling; one detection pass is evaluated as
//! a unit so same-label duplicates within the pass collapse to at most
//! one fire before the cooldown check runs.

use crate::classifier::AlertLabel;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Throttle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrottleConfig {
    /// Minimum elapsed time between two accepted alerts for one label (ms)
    pub cooldown_ms: u64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self { cooldown_ms: 5_000 }
    }
}

impl ThrottleConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

/// Cooldown state for one label; created on first fire, never deleted
/// while the session runs
#[derive(Debug, Clone)]
pub struct CooldownEntry {
    /// Last time this label's alert was accepted
    pub last_fired: Instant,
    /// Number of accepted fires
    pub fire_count: usize,
}

/// Session-scoped alert throttle
pub struct AlertThrottle {
    config: ThrottleConfig,
    entries: HashMap<AlertLabel, CooldownEntry>,
}

impl AlertThrottle {
    pub fn new(config: ThrottleConfig) -> Self {
        info!("Creating alert throttle with config: {:?}", config);
        Self {
            config,
            entries: HashMap::new(),
        }
    }

    /// Evaluate one detection pass's hazard labels at time `now`.
    ///
    /// Duplicates within the pass are collapsed first; each surviving
    /// label fires iff it has no entry or its window has elapsed. Fired
    /// labels get their entry stamped with `now` before this returns, so
    /// the whole pass is one atomic decision.
    pub fn evaluate_pass(
        &mut self,
        labels: impl IntoIterator<Item = AlertLabel>,
        now: Instant,
    ) -> Vec<AlertLabel> {
        let mut seen: Vec<AlertLabel> = Vec::new();
        for label in labels {
            if !seen.contains(&label) {
                seen.push(label);
            }
        }

        let mut fired = Vec::new();
        for label in seen {
            if let Some(entry) = self.entries.get(&label) {
                if now.duration_since(entry.last_fired) < self.config.window() {
                    debug!(%label, "Alert suppressed: in cooldown period");
                    continue;
                }
            }

            let entry = self.entries.entry(label).or_insert(CooldownEntry {
                last_fired: now,
                fire_count: 0,
            });
            entry.last_fired = now;
            entry.fire_count += 1;
            info!(%label, count = entry.fire_count, "Alert accepted");
            fired.push(label);
        }

        fired
    }

    /// Cooldown entry for a label, if it has ever fired
    pub fn entry(&self, label: &AlertLabel) -> Option<&CooldownEntry> {
        self.entries.get(label)
    }
}

impl Default for AlertThrottle {
    fn default() -> Self {
        Self::new(ThrottleConfig::default())
    }
}
