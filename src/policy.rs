//! Edge-first person decision with remote escalation.

use anyhow::{anyhow, Result};

use crate::detect::{Detection, DetectionResult};
use crate::frame::{encode_jpeg, Frame};
use crate::remote::{interpret_labels, ConfidenceMode, Labeler};

/// Default minimum local confidence for a terminal edge verdict.
pub const DEFAULT_THRESHOLD: f32 = 0.7;

/// Decides whether a frame contains a person.
///
/// A local person detection at or above `threshold` is final. Everything
/// else (no person, or a person below threshold) is escalated to the remote
/// labeler, and the escalated verdict does not carry the local score.
#[derive(Clone, Debug)]
pub struct DecisionPolicy {
    threshold: f32,
    confidence_mode: ConfidenceMode,
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            confidence_mode: ConfidenceMode::Fixed,
        }
    }
}

impl DecisionPolicy {
    pub fn new(threshold: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(anyhow!(
                "threshold must be within 0..=1, got {}",
                threshold
            ));
        }
        Ok(Self {
            threshold,
            ..Self::default()
        })
    }

    pub fn with_confidence_mode(mut self, mode: ConfidenceMode) -> Self {
        self.confidence_mode = mode;
        self
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Local verdict, or `None` when the frame must be escalated.
    pub fn local_verdict(&self, detections: &[Detection]) -> Option<DetectionResult> {
        summarize_person(detections)
            .filter(|best| *best >= self.threshold)
            .map(DetectionResult::edge)
    }

    /// Run the full decision for one frame.
    pub fn decide<L: Labeler + ?Sized>(
        &self,
        detections: &[Detection],
        frame: &Frame,
        labeler: &mut L,
    ) -> Result<DetectionResult> {
        if let Some(result) = self.local_verdict(detections) {
            return Ok(result);
        }

        match summarize_person(detections) {
            Some(best) => log::debug!(
                "local person conf {:.2} below threshold {:.2}",
                best,
                self.threshold
            ),
            None => log::debug!("no local person detection"),
        }
        log::info!("Falling back to Amazon Rekognition");

        let jpeg = encode_jpeg(frame)?;
        let response = labeler.detect_labels(&jpeg)?;
        Ok(interpret_labels(&response, self.confidence_mode))
    }
}

/// Highest person-class confidence, or `None` when no person was detected.
pub fn summarize_person(detections: &[Detection]) -> Option<f32> {
    detections
        .iter()
        .filter(|d| d.is_person())
        .map(|d| d.confidence)
        .fold(None, |best, conf| {
            Some(best.map_or(conf, |b: f32| b.max(conf)))
        })
}
