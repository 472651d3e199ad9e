//! Virtual Eyes - Main Entry Point
//!
//! Runs the pipeline against stub capabilities: a fixed frame source and
//! a scripted detector that keeps spotting a vehicle, so live annotation,
//! alert throttling, and dispatch can be observed from the logs.

use anyhow::Result;
use perception::{BoundingBox, Detection};
use pipeline::stubs::{
    DirArtifactSink, LoggingFlash, LoggingOverlay, LoggingSpeech, LoggingTone, ScriptedDetector,
    StaticFrames,
};
use pipeline::{
    init_logging, spawn_overlay_loop, spawn_threat_poll, NullStatus, Pipeline, PipelineConfig,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    info!("=== Virtual Eyes v{} ===", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = PipelineConfig::load(config_path.as_deref())?;

    let detector = ScriptedDetector::with_fallback(vec![
        Detection::new("car", 0.82, BoundingBox::new(180.0, 120.0, 160.0, 110.0)),
        Detection::new("person", 0.91, BoundingBox::new(420.0, 80.0, 90.0, 240.0)),
    ]);

    let pipeline = Arc::new(Pipeline::new(
        Arc::new(StaticFrames::new(640, 480)),
        Arc::new(detector),
        Arc::new(LoggingOverlay),
        Arc::new(LoggingTone),
        Arc::new(LoggingSpeech),
        Arc::new(LoggingFlash),
        Arc::new(DirArtifactSink::new("saves")),
        Arc::new(NullStatus),
        config,
    ));

    let overlay_loop = spawn_overlay_loop(Arc::clone(&pipeline));
    let threat_poll = spawn_threat_poll(Arc::clone(&pipeline));

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");

    threat_poll.stop().await;
    overlay_loop.stop().await;

    // Flush anything a snapshot session left pending
    pipeline.save().await?;

    Ok(())
}
