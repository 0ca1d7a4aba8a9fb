use std::fmt;

/// Detector class id reserved for people (COCO ordering).
pub const PERSON_CLASS_ID: u32 = 0;

/// One box reported by the local detector.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub class_id: u32,
    /// Score in 0..1.
    pub confidence: f32,
}

impl Detection {
    pub fn new(class_id: u32, confidence: f32) -> Self {
        Self {
            class_id,
            confidence,
        }
    }

    pub fn is_person(&self) -> bool {
        self.class_id == PERSON_CLASS_ID
    }
}

/// Which subsystem produced a verdict.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Source {
    /// On-device detector.
    Edge,
    /// Remote labeling service.
    Rekognition,
}

impl Source {
    pub fn as_str(self) -> &'static str {
        match self {
            Source::Edge => "edge",
            Source::Rekognition => "rekognition",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-frame verdict. Built once, logged, then dropped.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectionResult {
    pub person_present: bool,
    pub source: Source,
    pub confidence: f32,
    /// Label names in service order. Only set on the remote path.
    pub labels: Option<Vec<String>>,
}

impl DetectionResult {
    pub fn edge(confidence: f32) -> Self {
        Self {
            person_present: true,
            source: Source::Edge,
            confidence,
            labels: None,
        }
    }

    /// Console line for a detected person.
    pub fn person_line(&self) -> String {
        format!(
            "[PERSON DETECTED] source={} conf={:.2}",
            self.source, self.confidence
        )
    }
}
