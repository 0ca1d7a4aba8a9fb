//! edge_agent - camera loop with local person detection and Rekognition fallback
//!
//! This daemon:
//! 1. Opens the configured camera (fatal if unavailable)
//! 2. Loads the local detector once
//! 3. Classifies every frame, escalating low-confidence frames to Rekognition
//! 4. Prints one line per frame with a person present

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use edge_agent::config::AgentConfig;
use edge_agent::detect::{DetectorBackend, StubBackend};
use edge_agent::ingest::open_camera;
use edge_agent::policy::DecisionPolicy;
use edge_agent::remote::RekognitionLabeler;
use edge_agent::EdgeAgent;

/// Settings come from EDGE_AGENT_CONFIG and EDGE_AGENT_* environment variables.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {}

fn main() -> Result<()> {
    let _args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = AgentConfig::load()?;

    let camera = open_camera(&cfg.camera).context("Camera not available")?;
    log::info!("camera: {}", camera.describe());

    let mut detector = build_detector(&cfg)?;
    detector.warm_up().context("detector warm-up failed")?;
    log::info!(
        "detector: {} (threshold {:.2})",
        detector.name(),
        cfg.detector.threshold
    );

    let labeler = RekognitionLabeler::new(cfg.remote.region.clone())?;
    let policy = DecisionPolicy::new(cfg.detector.threshold)?
        .with_confidence_mode(cfg.remote.confidence_mode);

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))
            .context("install Ctrl-C handler")?;
    }

    println!("Edge agent running. Press Ctrl+C to stop.");
    let mut agent = EdgeAgent::new(camera, detector, labeler, policy);
    agent.run(&running)
}

fn build_detector(cfg: &AgentConfig) -> Result<Box<dyn DetectorBackend>> {
    if cfg.detector.is_stub() {
        log::warn!("stub detector selected; every frame will be escalated");
        return Ok(Box::new(StubBackend::new()));
    }
    load_model(cfg)
}

#[cfg(feature = "backend-tract")]
fn load_model(cfg: &AgentConfig) -> Result<Box<dyn DetectorBackend>> {
    use edge_agent::detect::{TractBackend, YoloParams};

    let params = YoloParams {
        input_size: cfg.detector.input_size,
        ..YoloParams::default()
    };
    Ok(Box::new(TractBackend::new(&cfg.detector.model, params)?))
}

#[cfg(not(feature = "backend-tract"))]
fn load_model(cfg: &AgentConfig) -> Result<Box<dyn DetectorBackend>> {
    anyhow::bail!(
        "model {} requires the backend-tract feature (or set EDGE_AGENT_MODEL=stub)",
        cfg.detector.model.display()
    )
}
