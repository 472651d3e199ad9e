//! Alert Dispatcher Implementation
//!
//! Fans a fired label out to three channels at once: a finite beep
//! sequence, a spoken announcement, and a transient visual flash. Each
//! channel fails independently and silently; none blocks the detection
//! loop that triggered the alert.

use crate::classifier::AlertLabel;
use crate::AlertError;
use narration::SpeechSink;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Dispatch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Beeps per alert
    pub beep_count: u32,
    /// Length of one beep (ms)
    pub beep_duration_ms: u64,
    /// Silence between beeps (ms)
    pub beep_gap_ms: u64,
    /// Visual flash decay (ms)
    pub flash_decay_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            beep_count: 3,
            beep_duration_ms: 80,
            beep_gap_ms: 120,
            flash_decay_ms: 220,
        }
    }
}

/// External tone/beep capability
pub trait ToneSink: Send + Sync + 'static {
    fn play_beeps(
        &self,
        count: u32,
        duration: Duration,
        gap: Duration,
    ) -> impl Future<Output = Result<(), AlertError>> + Send;
}

/// External visual-flash capability; the flash decays after `decay`
pub trait FlashSink: Send + Sync + 'static {
    fn flash(&self, decay: Duration) -> impl Future<Output = Result<(), AlertError>> + Send;
}

/// Fans one fired label out to tone + speech + flash
pub struct AlertDispatcher<T, S, F> {
    tone: Arc<T>,
    speech: Arc<S>,
    flash: Arc<F>,
    config: DispatchConfig,
}

impl<T, S, F> AlertDispatcher<T, S, F>
where
    T: ToneSink,
    S: SpeechSink,
    F: FlashSink,
{
    pub fn new(tone: Arc<T>, speech: Arc<S>, flash: Arc<F>, config: DispatchConfig) -> Self {
        Self {
            tone,
            speech,
            flash,
            config,
        }
    }

    /// Fire all three channels for `label`.
    ///
    /// Returns the supervising task handle so callers that care (tests,
    /// shutdown) can await channel completion; the detection loop just
    /// drops it.
    pub fn dispatch(&self, label: AlertLabel) -> JoinHandle<()> {
        debug!(%label, "Dispatching alert");

        let tone = Arc::clone(&self.tone);
        let speech = Arc::clone(&self.speech);
        let flash = Arc::clone(&self.flash);
        let beep_count = self.config.beep_count;
        let beep_duration = Duration::from_millis(self.config.beep_duration_ms);
        let beep_gap = Duration::from_millis(self.config.beep_gap_ms);
        let decay = Duration::from_millis(self.config.flash_decay_ms);

        tokio::spawn(async move {
            let tone_task = tokio::spawn(async move {
                if let Err(e) = tone.play_beeps(beep_count, beep_duration, beep_gap).await {
                    warn!("Alert tone failed: {}", e);
                }
            });

            let announcement = format!("Alert! {} detected in the live frame", label);
            let speech_task = tokio::spawn(async move {
                if let Err(e) = speech.speak(announcement).await {
                    warn!("Alert speech failed: {}", e);
                }
            });

            let flash_task = tokio::spawn(async move {
                if let Err(e) = flash.flash(decay).await {
                    warn!("Alert flash failed: {}", e);
                }
            });

            // Each channel already swallowed its own failure; a JoinError
            // here would only mean the runtime is tearing down
            let _ = tone_task.await;
            let _ = speech_task.await;
            let _ = flash_task.await;
        })
    }
}
