use anyhow::{Context, Result};
use aws_config::BehaviorVersion;
use aws_sdk_rekognition::config::Region;
use aws_sdk_rekognition::operation::detect_labels::DetectLabelsOutput;
use aws_sdk_rekognition::primitives::Blob;
use aws_sdk_rekognition::types::Image;
use aws_sdk_rekognition::Client;
use tokio::runtime::Runtime;

use super::{Label, LabelResponse, Labeler, MAX_LABELS, MIN_CONFIDENCE};

/// Region used when `AWS_REGION` is unset.
pub const DEFAULT_REGION: &str = "us-west-2";

/// Amazon Rekognition `DetectLabels` client.
///
/// The SDK is async; this wrapper owns a current-thread runtime and blocks on
/// each request so callers stay synchronous. Credentials come from the
/// standard AWS provider chain.
pub struct RekognitionLabeler {
    runtime: Runtime,
    client: Client,
    region: String,
}

impl RekognitionLabeler {
    /// Build a client for an explicit region.
    pub fn new(region: impl Into<String>) -> Result<Self> {
        let region = region.into();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("build rekognition runtime")?;
        let sdk_config = runtime.block_on(
            aws_config::defaults(BehaviorVersion::latest())
                .region(Region::new(region.clone()))
                .load(),
        );
        let client = Client::new(&sdk_config);
        log::info!("RekognitionLabeler: region {}", region);
        Ok(Self {
            runtime,
            client,
            region,
        })
    }

    /// Build a client for `AWS_REGION`, falling back to `DEFAULT_REGION`.
    pub fn from_env() -> Result<Self> {
        Self::new(region_from_env())
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Send one image and return the service response untouched.
    pub fn detect_labels_raw(&self, image: &[u8]) -> Result<DetectLabelsOutput> {
        let request = self
            .client
            .detect_labels()
            .image(Image::builder().bytes(Blob::new(image)).build())
            .max_labels(MAX_LABELS)
            .min_confidence(MIN_CONFIDENCE);
        self.runtime
            .block_on(request.send())
            .context("rekognition DetectLabels request failed")
    }
}

impl Labeler for RekognitionLabeler {
    fn detect_labels(&mut self, image: &[u8]) -> Result<LabelResponse> {
        let output = self.detect_labels_raw(image)?;
        Ok(label_response(&output))
    }
}

/// Keep named labels in service order. A missing confidence reads as 0.
fn label_response(output: &DetectLabelsOutput) -> LabelResponse {
    LabelResponse::new(
        output
            .labels()
            .iter()
            .filter_map(|label| {
                label
                    .name()
                    .map(|name| Label::new(name, label.confidence().unwrap_or(0.0)))
            })
            .collect(),
    )
}

/// Region from `AWS_REGION`, or `DEFAULT_REGION` when unset or blank.
pub fn region_from_env() -> String {
    std::env::var("AWS_REGION")
        .ok()
        .filter(|region| !region.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_REGION.to_string())
}
