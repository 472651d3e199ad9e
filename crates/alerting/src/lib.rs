//! Alerting System
//!
//! Turns hazard-class detections into throttled, multi-channel alerts:
//! a static threat table normalizes model classes to alert labels, a
//! per-label cooldown state machine decides fire/suppress, and a
//! dispatcher fans one fired label out to tone, speech, and flash.

pub mod classifier;
pub mod dispatch;
pub mod throttle;

pub use classifier::{classify, AlertLabel};
pub use dispatch::{AlertDispatcher, DispatchConfig, FlashSink, ToneSink};
pub use throttle::{AlertThrottle, CooldownEntry, ThrottleConfig};

use thiserror::Error;

/// Alerting error types
#[derive(Error, Debug)]
pub enum AlertError {
    #[error("Alert channel failed: {0}")]
    Channel(String),
}
