//! Pipeline session and operations
//!
//! One `Pipeline` owns a session's shared mutable state (cooldown
//! entries, pending cycle log) behind a single lock, plus handles to the
//! external capabilities. The two loops and the snapshot/save actions all
//! go through it; a pass's dedup-then-fire decision happens under one
//! lock hold.

use crate::config::PipelineConfig;
use crate::status::{Status, StatusBoard, StatusSink};
use crate::PipelineError;
use alerting::{classify, AlertDispatcher, AlertThrottle, FlashSink, ToneSink};
use chrono::Local;
use cycle_recorder::{ArtifactSink, CycleRecorder, RecordedDetection, SaveOutcome};
use frame_capture::{CaptureError, Frame, FrameSource};
use narration::{NarrationLine, Narrator, SpeechSink};
use perception::{
    format_distance, sanitize, Detection, Detector, OverlayPlan, OverlaySink, OverlayStyle,
    PerceptionError, SpatialEstimator,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Session-scoped mutable state, single-writer via the pipeline lock
struct SessionState {
    throttle: AlertThrottle,
    recorder: CycleRecorder,
}

/// What a snapshot action produced
#[derive(Debug, Clone, Copy)]
pub struct SnapshotReport {
    /// Cycle ordinal assigned to this snapshot
    pub ordinal: u32,
    /// Objects detected in the frozen frame
    pub object_count: usize,
}

/// The detection-to-alert pipeline for one session
pub struct Pipeline<FS, D, O, T, S, F, A> {
    frames: Arc<FS>,
    detector: Arc<D>,
    overlay: Arc<O>,
    dispatcher: AlertDispatcher<T, S, F>,
    narrator: Narrator<S>,
    artifacts: Arc<A>,
    estimator: SpatialEstimator,
    state: Mutex<SessionState>,
    status: StatusBoard,
    config: PipelineConfig,
}

impl<FS, D, O, T, S, F, A> Pipeline<FS, D, O, T, S, F, A>
where
    FS: FrameSource,
    D: Detector,
    O: OverlaySink,
    T: ToneSink,
    S: SpeechSink,
    F: FlashSink,
    A: ArtifactSink,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        frames: Arc<FS>,
        detector: Arc<D>,
        overlay: Arc<O>,
        tone: Arc<T>,
        speech: Arc<S>,
        flash: Arc<F>,
        artifacts: Arc<A>,
        status_sink: Arc<dyn StatusSink>,
        config: PipelineConfig,
    ) -> Self {
        let status = StatusBoard::new(status_sink);
        status.set(Status::Loading);

        Self {
            dispatcher: AlertDispatcher::new(
                tone,
                Arc::clone(&speech),
                flash,
                config.dispatch.clone(),
            ),
            narrator: Narrator::new(speech, config.narration_pause()),
            estimator: SpatialEstimator::new(config.calibration.clone()),
            state: Mutex::new(SessionState {
                throttle: AlertThrottle::new(config.throttle.clone()),
                recorder: CycleRecorder::new(),
            }),
            frames,
            detector,
            overlay,
            artifacts,
            status,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn status(&self) -> &StatusBoard {
        &self.status
    }

    /// One iteration of the continuous overlay loop: detect on the
    /// current frame and plan the live annotation. Failures degrade this
    /// pass to an empty plan.
    pub async fn overlay_pass(&self) {
        let Some(frame) = self.frame_for_pass().await else {
            return;
        };
        let detections = self.detect_or_empty(&frame).await;
        self.overlay.render(OverlayPlan::live(&detections));
    }

    /// One iteration of the threat poll loop: detect, filter to hazard
    /// classes above the score threshold, annotate, and run the
    /// dedup-then-cooldown decision. Fired labels dispatch fire-and-forget.
    pub async fn threat_pass(&self) {
        let Some(frame) = self.frame_for_pass().await else {
            return;
        };
        let detections = self.detect_or_empty(&frame).await;

        let hazards: Vec<Detection> = detections
            .into_iter()
            .filter(|d| {
                d.confidence >= self.config.score_threshold && classify(&d.class_label).is_some()
            })
            .collect();

        if hazards.is_empty() {
            self.overlay.render(OverlayPlan::clear(OverlayStyle::Threat));
            return;
        }

        self.overlay.render(OverlayPlan::threat(
            &hazards,
            self.config.threat_overlay_lifetime(),
        ));

        let labels = hazards.iter().filter_map(|d| classify(&d.class_label));
        let fired = {
            let mut state = self.state.lock().await;
            state.throttle.evaluate_pass(labels, Instant::now())
        };

        for label in fired {
            let _ = self.dispatcher.dispatch(label);
        }
    }

    /// Snapshot action: freeze the current frame, detect, record a cycle,
    /// and narrate the detections sequentially.
    pub async fn take_snapshot(&self) -> Result<SnapshotReport, PipelineError> {
        let frame = self.frames.current_frame().await?;
        let still = frame.fit_within(self.config.snapshot_max_width, self.config.snapshot_max_height);
        let detections = self.detect_or_empty(&still).await;

        let mut recorded = Vec::with_capacity(detections.len());
        let mut lines = Vec::with_capacity(detections.len());
        for detection in &detections {
            let estimate = self.estimator.estimate(detection, still.width, still.height);
            let distance = format_distance(estimate.distance_m);
            recorded.push(RecordedDetection {
                class_label: detection.class_label.clone(),
                confidence_percent: detection.confidence_percent(),
                coord_x: estimate.coord_x,
                coord_y: estimate.coord_y,
                distance: distance.clone(),
            });
            lines.push(NarrationLine::new(
                detection.class_label.clone(),
                estimate.coord_x,
                estimate.coord_y,
                distance,
            ));
        }

        let object_count = recorded.len();
        let ordinal = {
            let mut state = self.state.lock().await;
            state.recorder.record(Local::now().time(), recorded)
        };

        if object_count == 0 {
            info!(ordinal, "No objects detected in snapshot");
        } else {
            info!(ordinal, objects = object_count, "Snapshot recorded");
            self.narrator.begin_session(lines);
        }

        Ok(SnapshotReport {
            ordinal,
            object_count,
        })
    }

    /// Save action: flush pending cycles to the artifact sink. An empty
    /// log is a reported no-op.
    pub async fn save(&self) -> Result<SaveOutcome, PipelineError> {
        let mut state = self.state.lock().await;
        Ok(state.recorder.flush(self.artifacts.as_ref()).await?)
    }

    /// Cycles recorded and not yet saved
    pub async fn pending_cycles(&self) -> usize {
        self.state.lock().await.recorder.pending().len()
    }

    /// Wait for any in-flight narration session to finish
    pub async fn narration_idle(&self) {
        self.narrator.wait_until_idle().await;
    }

    async fn frame_for_pass(&self) -> Option<Frame> {
        match self.frames.current_frame().await {
            Ok(frame) => Some(frame),
            Err(CaptureError::NotReady) => {
                debug!("Frame source not ready; skipping pass");
                None
            }
            Err(e) => {
                self.status.set(Status::Degraded(e.to_string()));
                None
            }
        }
    }

    async fn detect_or_empty(&self, frame: &Frame) -> Vec<Detection> {
        match self.detector.detect(frame).await {
            Ok(raw) => {
                self.status.set(Status::Ready);
                sanitize(raw)
            }
            Err(PerceptionError::Unavailable(reason)) => {
                self.status.set(Status::Degraded(reason));
                Vec::new()
            }
            Err(e) => {
                warn!("Inference failed, treating pass as empty: {}", e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::NullStatus;
    use crate::stubs::{ScriptedDetector, ScriptedPass, StaticFrames};
    use alerting::AlertError;
    use narration::NarrationError;
    use perception::BoundingBox;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingChannels {
        beep_sequences: AtomicUsize,
        flashes: AtomicUsize,
        spoken: StdMutex<Vec<String>>,
    }

    struct Tone(Arc<RecordingChannels>);
    struct Speech(Arc<RecordingChannels>);
    struct Flash(Arc<RecordingChannels>);

    impl ToneSink for Tone {
        async fn play_beeps(
            &self,
            _count: u32,
            _duration: Duration,
            _gap: Duration,
        ) -> Result<(), AlertError> {
            self.0.beep_sequences.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    impl SpeechSink for Speech {
        async fn speak(&self, text: String) -> Result<(), NarrationError> {
            self.0.spoken.lock().unwrap().push(text);
            Ok(())
        }

        fn cancel(&self) {}
    }

    impl FlashSink for Flash {
        async fn flash(&self, _decay: Duration) -> Result<(), AlertError> {
            self.0.flashes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingOverlay {
        plans: StdMutex<Vec<OverlayPlan>>,
    }

    impl OverlaySink for RecordingOverlay {
        fn render(&self, plan: OverlayPlan) {
            self.plans.lock().unwrap().push(plan);
        }
    }

    #[derive(Default)]
    struct MemoryArtifacts {
        saved: StdMutex<Vec<String>>,
    }

    impl ArtifactSink for MemoryArtifacts {
        async fn persist(&self, content: String) -> Result<(), cycle_recorder::RecorderError> {
            self.saved.lock().unwrap().push(content);
            Ok(())
        }
    }

    struct Harness {
        pipeline: Pipeline<
            StaticFrames,
            ScriptedDetector,
            RecordingOverlay,
            Tone,
            Speech,
            Flash,
            MemoryArtifacts,
        >,
        channels: Arc<RecordingChannels>,
        overlay: Arc<RecordingOverlay>,
        artifacts: Arc<MemoryArtifacts>,
    }

    fn harness(script: Vec<ScriptedPass>) -> Harness {
        let channels = Arc::new(RecordingChannels::default());
        let overlay = Arc::new(RecordingOverlay::default());
        let artifacts = Arc::new(MemoryArtifacts::default());

        let pipeline = Pipeline::new(
            Arc::new(StaticFrames::new(640, 480)),
            Arc::new(ScriptedDetector::new(script)),
            Arc::clone(&overlay),
            Arc::new(Tone(Arc::clone(&channels))),
            Arc::new(Speech(Arc::clone(&channels))),
            Arc::new(Flash(Arc::clone(&channels))),
            Arc::clone(&artifacts),
            Arc::new(NullStatus),
            PipelineConfig::default(),
        );

        Harness {
            pipeline,
            channels,
            overlay,
            artifacts,
        }
    }

    fn car(x: f32) -> Detection {
        Detection::new("car", 0.8, BoundingBox::new(x, 100.0, 120.0, 90.0))
    }

    fn book_centered_left_up() -> Detection {
        // Center (305, 160) in a 640x480 frame: left of and above center
        Detection::new("book", 0.92, BoundingBox::new(290.0, 140.0, 30.0, 40.0))
    }

    #[tokio::test]
    async fn test_threat_pass_dedups_same_label() {
        let h = harness(vec![ScriptedPass::Detect(vec![
            car(10.0),
            car(200.0),
            Detection::new("truck", 0.9, BoundingBox::new(400.0, 90.0, 130.0, 100.0)),
        ])]);

        h.pipeline.threat_pass().await;
        // Let the dispatched channel tasks run
        tokio::task::yield_now().await;
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(h.channels.beep_sequences.load(Ordering::SeqCst), 1);
        assert_eq!(h.channels.flashes.load(Ordering::SeqCst), 1);
        assert_eq!(
            h.channels.spoken.lock().unwrap().as_slice(),
            ["Alert! vehicle detected in the live frame"]
        );
    }

    #[tokio::test]
    async fn test_threat_pass_respects_score_threshold() {
        let h = harness(vec![ScriptedPass::Detect(vec![Detection::new(
            "car",
            0.4,
            BoundingBox::new(10.0, 10.0, 100.0, 80.0),
        )])]);

        h.pipeline.threat_pass().await;
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(h.channels.beep_sequences.load(Ordering::SeqCst), 0);
        // The threat surface is cleared, not left stale
        let plans = h.overlay.plans.lock().unwrap();
        assert!(plans.last().unwrap().boxes.is_empty());
    }

    #[tokio::test]
    async fn test_inference_failure_degrades_pass_to_empty() {
        let h = harness(vec![
            ScriptedPass::Fail("backend timeout".into()),
            ScriptedPass::Detect(vec![car(10.0)]),
        ]);

        h.pipeline.threat_pass().await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(h.channels.beep_sequences.load(Ordering::SeqCst), 0);

        // Next scheduled pass proceeds unaffected
        h.pipeline.threat_pass().await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(h.channels.beep_sequences.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_snapshot_records_cycle_and_narrates() {
        let h = harness(vec![ScriptedPass::Detect(vec![book_centered_left_up()])]);

        let report = h.pipeline.take_snapshot().await.unwrap();
        assert_eq!(report.ordinal, 1);
        assert_eq!(report.object_count, 1);
        assert_eq!(h.pipeline.pending_cycles().await, 1);

        h.pipeline.narration_idle().await;
        let spoken = h.channels.spoken.lock().unwrap().clone();
        assert_eq!(spoken.len(), 1);
        // Left of center, above center: negative x, positive y
        assert_eq!(
            spoken[0],
            "book detected at -3, 16 at 5 metres 25 centimetres"
        );
    }

    #[tokio::test]
    async fn test_empty_snapshot_still_records_a_cycle() {
        let h = harness(vec![ScriptedPass::Detect(Vec::new())]);

        let report = h.pipeline.take_snapshot().await.unwrap();
        assert_eq!(report.object_count, 0);
        assert_eq!(h.pipeline.pending_cycles().await, 1);
        assert!(h.channels.spoken.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_flushes_and_resets_ordinals() {
        let h = harness(vec![
            ScriptedPass::Detect(vec![book_centered_left_up()]),
            ScriptedPass::Detect(Vec::new()),
            ScriptedPass::Detect(vec![book_centered_left_up()]),
        ]);

        h.pipeline.take_snapshot().await.unwrap();
        h.pipeline.take_snapshot().await.unwrap();

        let outcome = h.pipeline.save().await.unwrap();
        assert_eq!(outcome, SaveOutcome::Saved { cycles: 2 });
        assert_eq!(h.pipeline.pending_cycles().await, 0);

        let saved = h.artifacts.saved.lock().unwrap().clone();
        assert_eq!(saved.len(), 1);
        assert!(saved[0].contains("no_objects_detected\n"));

        // Ordinals restart at 1 after a save
        let report = h.pipeline.take_snapshot().await.unwrap();
        assert_eq!(report.ordinal, 1);
    }

    #[tokio::test]
    async fn test_save_with_empty_log_is_noop() {
        let h = harness(Vec::new());
        let outcome = h.pipeline.save().await.unwrap();
        assert_eq!(outcome, SaveOutcome::NothingToSave);
        assert!(h.artifacts.saved.lock().unwrap().is_empty());
    }
}
