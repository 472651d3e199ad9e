//! Sequential narration queue

use crate::speech::SpeechSink;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// One spoken line, composed from a snapshot detection
#[derive(Debug, Clone, PartialEq)]
pub struct NarrationLine {
    pub class_label: String,
    pub coord_x: i32,
    pub coord_y: i32,
    pub distance: String,
}

impl NarrationLine {
    pub fn new(class_label: impl Into<String>, coord_x: i32, coord_y: i32, distance: impl Into<String>) -> Self {
        Self {
            class_label: class_label.into(),
            coord_x,
            coord_y,
            distance: distance.into(),
        }
    }

    /// Spoken text for this line
    pub fn text(&self) -> String {
        format!(
            "{} detected at {}, {} at {}",
            self.class_label, self.coord_x, self.coord_y, self.distance
        )
    }
}

/// Speaks snapshot detections sequentially, one session at a time.
///
/// A new session replaces the previous one outright: the in-flight task is
/// aborted, the engine's current utterance is cancelled, and stale lines
/// are discarded rather than interleaved.
pub struct Narrator<S> {
    speech: Arc<S>,
    pause: Duration,
    current: Mutex<Option<JoinHandle<()>>>,
}

impl<S: SpeechSink> Narrator<S> {
    pub fn new(speech: Arc<S>, pause: Duration) -> Self {
        Self {
            speech,
            pause,
            current: Mutex::new(None),
        }
    }

    /// Start narrating `lines` in order, replacing any session in flight.
    pub fn begin_session(&self, lines: Vec<NarrationLine>) {
        let mut slot = match self.current.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(previous) = slot.take() {
            debug!("Replacing in-flight narration session");
            previous.abort();
        }
        self.speech.cancel();

        if lines.is_empty() {
            return;
        }

        let speech = Arc::clone(&self.speech);
        let pause = self.pause;
        *slot = Some(tokio::spawn(async move {
            for line in lines {
                if let Err(e) = speech.speak(line.text()).await {
                    warn!(class = %line.class_label, "Narration line failed: {}", e);
                }
                tokio::time::sleep(pause).await;
            }
        }));
    }

    /// Wait for the current session to finish. Returns immediately when
    /// nothing is in flight; a session aborted mid-wait also resolves.
    pub async fn wait_until_idle(&self) {
        let handle = match self.current.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            // JoinError here only means the session was aborted
            let _ = handle.await;
        }
    }
}
