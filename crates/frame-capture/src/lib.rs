//! Frame Capture Boundary
//!
//! Value types for decoded video frames and the capability trait the
//! pipeline uses to pull frames. Actual camera acquisition and device
//! enumeration live behind `FrameSource` implementations and are not
//! part of the core.

pub mod frame;

pub use frame::Frame;

use std::future::Future;
use thiserror::Error;

/// Frame source error types
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Frame source unavailable: {0}")]
    Unavailable(String),

    #[error("No decodable frame yet")]
    NotReady,

    #[error("Streaming error: {0}")]
    Stream(String),
}

/// Capability that supplies frames on demand.
///
/// A source may be asked for frames by more than one loop at a time;
/// implementations return the most recent decoded frame rather than
/// blocking for the next one.
pub trait FrameSource: Send + Sync {
    fn current_frame(&self) -> impl Future<Output = Result<Frame, CaptureError>> + Send;
}
