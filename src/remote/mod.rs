//! Remote labeling fallback.
//!
//! The decision layer escalates here when the local detector is not
//! confident enough. A labeler receives one encoded image and returns the
//! service's label set. Interpretation into a `DetectionResult` happens in
//! `interpret_labels`, independent of the transport.
//!
//! - Rekognition `DetectLabels` (`RekognitionLabeler`)
//! - Any test double implementing `Labeler`

mod labels;
mod rekognition;

pub use labels::{
    interpret_labels, ConfidenceMode, Label, LabelResponse, FIXED_PERSON_CONFIDENCE,
    PERSON_LABEL,
};
pub use rekognition::{region_from_env, RekognitionLabeler, DEFAULT_REGION};

use anyhow::Result;

/// Maximum labels requested per image.
pub const MAX_LABELS: i32 = 10;

/// Minimum label confidence requested from the service, in percent.
pub const MIN_CONFIDENCE: f32 = 70.0;

/// Remote image labeler.
///
/// Calls block until the service answers. There is no timeout and no retry.
pub trait Labeler {
    /// Label one encoded image (JPEG or PNG bytes).
    fn detect_labels(&mut self, image: &[u8]) -> Result<LabelResponse>;
}

impl<L: Labeler + ?Sized> Labeler for &mut L {
    fn detect_labels(&mut self, image: &[u8]) -> Result<LabelResponse> {
        (**self).detect_labels(image)
    }
}

impl<L: Labeler + ?Sized> Labeler for Box<L> {
    fn detect_labels(&mut self, image: &[u8]) -> Result<LabelResponse> {
        (**self).detect_labels(image)
    }
}
