//! Cooperative loop scheduling
//!
//! Two independently clocked tasks share the frame source: the overlay
//! loop runs continuously, the threat poll runs on a fixed interval.
//! Each carries its own shutdown signal; stopping prevents the next
//! iteration and drops any in-flight pass without applying its result.

use crate::session::Pipeline;
use alerting::{FlashSink, ToneSink};
use cycle_recorder::ArtifactSink;
use frame_capture::FrameSource;
use narration::SpeechSink;
use perception::{Detector, OverlaySink};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Handle to one running loop
pub struct LoopHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl LoopHandle {
    /// Request shutdown and wait for the loop to wind down. An inference
    /// request already in flight resolves on its own; its result is
    /// dropped, never applied.
    pub async fn stop(self) {
        let _ = self.stop.send(true);
        let _ = self.task.await;
    }
}

/// Spawn the continuous live-annotation loop.
pub fn spawn_overlay_loop<FS, D, O, T, S, F, A>(
    pipeline: Arc<Pipeline<FS, D, O, T, S, F, A>>,
) -> LoopHandle
where
    FS: FrameSource + 'static,
    D: Detector + 'static,
    O: OverlaySink + 'static,
    T: ToneSink,
    S: SpeechSink,
    F: FlashSink,
    A: ArtifactSink + 'static,
{
    let (stop, mut rx) = watch::channel(false);
    let task = tokio::spawn(async move {
        info!("Starting overlay loop");
        loop {
            if *rx.borrow() {
                break;
            }
            tokio::select! {
                biased;
                changed = rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    debug!("Overlay loop stopping; discarding in-flight pass");
                    continue;
                }
                _ = pipeline.overlay_pass() => {}
            }
            tokio::select! {
                biased;
                changed = rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
                _ = tokio::time::sleep(pipeline.config().render_interval()) => {}
            }
        }
        info!("Overlay loop stopped");
    });

    LoopHandle { stop, task }
}

/// Spawn the fixed-interval threat poll loop.
pub fn spawn_threat_poll<FS, D, O, T, S, F, A>(
    pipeline: Arc<Pipeline<FS, D, O, T, S, F, A>>,
) -> LoopHandle
where
    FS: FrameSource + 'static,
    D: Detector + 'static,
    O: OverlaySink + 'static,
    T: ToneSink,
    S: SpeechSink,
    F: FlashSink,
    A: ArtifactSink + 'static,
{
    let (stop, mut rx) = watch::channel(false);
    let task = tokio::spawn(async move {
        let interval = pipeline.config().poll_interval();
        info!(interval_ms = interval.as_millis() as u64, "Starting threat poll loop");

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            if *rx.borrow() {
                break;
            }
            tokio::select! {
                biased;
                changed = rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
                _ = ticker.tick() => {}
            }
            tokio::select! {
                biased;
                changed = rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    debug!("Threat poll stopping; discarding in-flight pass");
                    continue;
                }
                _ = pipeline.threat_pass() => {}
            }
        }
        info!("Threat poll loop stopped");
    });

    LoopHandle { stop, task }
}
