use std::collections::VecDeque;

use anyhow::Result;

use crate::detect::backend::DetectorBackend;
use crate::detect::result::Detection;

/// Stub backend for tests and offline runs.
///
/// Replays scripted detection sets in order, then keeps returning the
/// fallback set (empty unless configured).
#[derive(Default)]
pub struct StubBackend {
    script: VecDeque<Vec<Detection>>,
    fallback: Vec<Detection>,
    calls: u64,
}

impl StubBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one frame's worth of detections.
    pub fn with_frame(mut self, detections: Vec<Detection>) -> Self {
        self.script.push_back(detections);
        self
    }

    /// Detections returned once the script is exhausted.
    pub fn with_fallback(mut self, detections: Vec<Detection>) -> Self {
        self.fallback = detections;
        self
    }

    /// Number of frames this backend has been asked to classify.
    pub fn calls(&self) -> u64 {
        self.calls
    }
}

impl DetectorBackend for StubBackend {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn detect(&mut self, _pixels: &[u8], _width: u32, _height: u32) -> Result<Vec<Detection>> {
        self.calls += 1;
        Ok(self
            .script
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone()))
    }
}
