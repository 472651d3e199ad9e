//! Stub capabilities
//!
//! Stand-ins for the external collaborators: a fixed frame source, a
//! scripted detector, logging alert channels, and artifact sinks. The
//! demo binary runs against these; tests drive the pipeline with them.

use alerting::{AlertError, FlashSink, ToneSink};
use cycle_recorder::{ArtifactSink, RecorderError};
use frame_capture::{CaptureError, Frame, FrameSource};
use narration::{NarrationError, SpeechSink};
use perception::{Detection, Detector, OverlayPlan, OverlaySink, PerceptionError};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info};

/// Frame source that always returns the same blank frame
pub struct StaticFrames {
    frame: Frame,
    served: AtomicUsize,
}

impl StaticFrames {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            frame: Frame::blank(width, height),
            served: AtomicUsize::new(0),
        }
    }
}

impl FrameSource for StaticFrames {
    async fn current_frame(&self) -> Result<Frame, CaptureError> {
        let sequence = self.served.fetch_add(1, Ordering::SeqCst) as u32;
        let mut frame = self.frame.clone();
        frame.sequence = sequence;
        Ok(frame)
    }
}

/// One scripted detector pass
pub enum ScriptedPass {
    Detect(Vec<Detection>),
    Fail(String),
}

/// Detector that plays back a script, then falls back to a fixed result
pub struct ScriptedDetector {
    script: Mutex<VecDeque<ScriptedPass>>,
    fallback: Vec<Detection>,
    calls: AtomicUsize,
}

impl ScriptedDetector {
    pub fn new(script: Vec<ScriptedPass>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: Vec::new(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Empty script; every pass returns `fallback`
    pub fn with_fallback(fallback: Vec<Detection>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback,
            calls: AtomicUsize::new(0),
        }
    }

    /// Total `detect` invocations
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Detector for ScriptedDetector {
    async fn detect(&self, _frame: &Frame) -> Result<Vec<Detection>, PerceptionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = {
            let mut script = match self.script.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            script.pop_front()
        };
        match next {
            Some(ScriptedPass::Detect(detections)) => Ok(detections),
            Some(ScriptedPass::Fail(reason)) => Err(PerceptionError::Inference(reason)),
            None => Ok(self.fallback.clone()),
        }
    }
}

/// Overlay sink that only logs plan sizes
pub struct LoggingOverlay;

impl OverlaySink for LoggingOverlay {
    fn render(&self, plan: OverlayPlan) {
        debug!(style = ?plan.style, boxes = plan.boxes.len(), "Overlay plan");
    }
}

/// Tone channel that logs and takes as long as the real beep sequence
pub struct LoggingTone;

impl ToneSink for LoggingTone {
    async fn play_beeps(
        &self,
        count: u32,
        duration: Duration,
        gap: Duration,
    ) -> Result<(), AlertError> {
        info!(count, "Playing beep sequence");
        tokio::time::sleep((duration + gap) * count).await;
        Ok(())
    }
}

/// Speech channel that logs utterances
pub struct LoggingSpeech;

impl SpeechSink for LoggingSpeech {
    async fn speak(&self, text: String) -> Result<(), NarrationError> {
        info!("Speaking: {}", text);
        Ok(())
    }

    fn cancel(&self) {
        debug!("Speech cancelled");
    }
}

/// Flash channel that logs and waits out the decay
pub struct LoggingFlash;

impl FlashSink for LoggingFlash {
    async fn flash(&self, decay: Duration) -> Result<(), AlertError> {
        info!("Visual flash");
        tokio::time::sleep(decay).await;
        Ok(())
    }
}

/// Artifact sink that collects saved content in memory
#[derive(Default)]
pub struct MemoryArtifacts {
    saved: Mutex<Vec<String>>,
}

impl MemoryArtifacts {
    pub fn saved(&self) -> Vec<String> {
        match self.saved.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl ArtifactSink for MemoryArtifacts {
    async fn persist(&self, content: String) -> Result<(), RecorderError> {
        match self.saved.lock() {
            Ok(mut guard) => guard.push(content),
            Err(poisoned) => poisoned.into_inner().push(content),
        }
        Ok(())
    }
}

/// Artifact sink that writes timestamp-qualified files into a directory
pub struct DirArtifactSink {
    dir: PathBuf,
}

impl DirArtifactSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ArtifactSink for DirArtifactSink {
    async fn persist(&self, content: String) -> Result<(), RecorderError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| RecorderError::Persist(e.to_string()))?;

        let stamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S");
        let path = self.dir.join(format!("detection_{}.txt", stamp));
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| RecorderError::Persist(e.to_string()))?;

        info!(path = %path.display(), "Saved detection cycles");
        Ok(())
    }
}
