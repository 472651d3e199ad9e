//! Pending cycle log and flush

use crate::cycle::{render_cycles, DetectionCycle, RecordedDetection};
use crate::RecorderError;
use chrono::NaiveTime;
use std::future::Future;
use tracing::{debug, info};

/// External persistence capability. Filename and destination are the
/// sink's concern; the recorder only hands over rendered content.
pub trait ArtifactSink: Send + Sync {
    fn persist(&self, content: String) -> impl Future<Output = Result<(), RecorderError>> + Send;
}

/// Result of a save request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// All pending cycles were serialized and persisted
    Saved { cycles: usize },
    /// The pending log was empty; nothing was written
    NothingToSave,
}

/// Session-scoped recorder of snapshot detection cycles
#[derive(Debug, Default)]
pub struct CycleRecorder {
    pending: Vec<DetectionCycle>,
    next_ordinal: u32,
}

impl CycleRecorder {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            next_ordinal: 1,
        }
    }

    /// Record one snapshot's detections as the next cycle.
    pub fn record(&mut self, time: NaiveTime, detections: Vec<RecordedDetection>) -> u32 {
        let ordinal = self.next_ordinal;
        self.pending.push(DetectionCycle {
            time: time.format("%H:%M:%S").to_string(),
            ordinal,
            detections,
        });
        self.next_ordinal += 1;
        debug!(ordinal, pending = self.pending.len(), "Recorded detection cycle");
        ordinal
    }

    /// Cycles awaiting flush, in record order
    pub fn pending(&self) -> &[DetectionCycle] {
        &self.pending
    }

    /// Serialize and persist every pending cycle, then clear the log and
    /// reset the ordinal counter. A persist failure leaves both intact so
    /// nothing is lost on retry; an empty log is a reported no-op.
    pub async fn flush<S: ArtifactSink>(&mut self, sink: &S) -> Result<SaveOutcome, RecorderError> {
        if self.pending.is_empty() {
            info!("Save requested with empty cycle log; nothing to do");
            return Ok(SaveOutcome::NothingToSave);
        }

        let content = render_cycles(&self.pending);
        sink.persist(content).await?;

        let cycles = self.pending.len();
        self.pending.clear();
        self.next_ordinal = 1;
        info!(cycles, "Saved detection cycles and reset the log");
        Ok(SaveOutcome::Saved { cycles })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemorySink {
        saved: Mutex<Vec<String>>,
        persist_calls: AtomicUsize,
        fail: AtomicBool,
    }

    impl ArtifactSink for MemorySink {
        async fn persist(&self, content: String) -> Result<(), RecorderError> {
            self.persist_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(RecorderError::Persist("disk full".into()));
            }
            self.saved.lock().unwrap().push(content);
            Ok(())
        }
    }

    fn time(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    fn book() -> RecordedDetection {
        RecordedDetection {
            class_label: "book".to_string(),
            confidence_percent: 92,
            coord_x: 3,
            coord_y: -2,
            distance: "1 metres 20 centimetres".to_string(),
        }
    }

    #[test]
    fn test_ordinals_increase_from_one() {
        let mut recorder = CycleRecorder::new();
        assert_eq!(recorder.record(time(10, 0, 0), vec![book()]), 1);
        assert_eq!(recorder.record(time(10, 0, 5), Vec::new()), 2);
        assert_eq!(recorder.record(time(10, 0, 9), vec![book()]), 3);
        assert_eq!(recorder.pending().len(), 3);
    }

    #[tokio::test]
    async fn test_flush_persists_and_resets() {
        let mut recorder = CycleRecorder::new();
        recorder.record(time(10, 0, 0), vec![book()]);
        recorder.record(time(10, 0, 5), Vec::new());

        let sink = MemorySink::default();
        let outcome = recorder.flush(&sink).await.unwrap();

        assert_eq!(outcome, SaveOutcome::Saved { cycles: 2 });
        assert!(recorder.pending().is_empty());
        assert_eq!(recorder.record(time(10, 1, 0), vec![book()]), 1);

        let saved = sink.saved.lock().unwrap();
        assert_eq!(saved.len(), 1);
        assert!(saved[0].starts_with("detection 10:00:00 1st\n"));
        assert!(saved[0].contains("detection 10:00:05 2nd\nno_objects_detected\n"));
    }

    #[tokio::test]
    async fn test_empty_flush_is_reported_noop() {
        let mut recorder = CycleRecorder::new();
        let sink = MemorySink::default();

        let outcome = recorder.flush(&sink).await.unwrap();

        assert_eq!(outcome, SaveOutcome::NothingToSave);
        assert_eq!(sink.persist_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_persist_failure_keeps_pending_log() {
        let mut recorder = CycleRecorder::new();
        recorder.record(time(10, 0, 0), vec![book()]);

        let sink = MemorySink::default();
        sink.fail.store(true, Ordering::SeqCst);
        assert!(recorder.flush(&sink).await.is_err());

        assert_eq!(recorder.pending().len(), 1);
        // Ordinal counter untouched by the failed save
        assert_eq!(recorder.record(time(10, 0, 5), Vec::new()), 2);
    }
}
