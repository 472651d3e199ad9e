//! Narration
//!
//! Speaks a snapshot's detections one line at a time. The speech engine is
//! an external capability behind `SpeechSink`; starting a new narration
//! session cancels whatever the previous one still had queued.

pub mod queue;
pub mod speech;

pub use queue::{NarrationLine, Narrator};
pub use speech::SpeechSink;

use thiserror::Error;

/// Narration error types
#[derive(Error, Debug)]
pub enum NarrationError {
    #[error("Speech engine failed: {0}")]
    Speech(String),

    #[error("Speech engine unavailable: {0}")]
    Unavailable(String),
}
