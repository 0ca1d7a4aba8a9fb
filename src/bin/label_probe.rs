//! label_probe - send one image to Rekognition DetectLabels and print the raw response
//!
//! Diagnostic for credentials and connectivity. Uses the same label cap and
//! confidence floor as the edge agent's fallback.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use edge_agent::remote::RekognitionLabeler;

const USAGE: &str = "Usage: label_probe <image_path>";

#[derive(Parser, Debug)]
#[command(author, version, about, override_usage = "label_probe <image_path>")]
struct Args {
    /// Image file (JPEG or PNG) to label.
    image_path: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let Some(image_path) = args.image_path else {
        eprintln!("{}", USAGE);
        std::process::exit(1);
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let data = std::fs::read(&image_path)
        .with_context(|| format!("failed to read image {}", image_path.display()))?;
    let labeler = RekognitionLabeler::from_env()?;
    let response = labeler.detect_labels_raw(&data)?;
    println!("{:#?}", response);
    Ok(())
}
