use crate::detect::{DetectionResult, Source};

/// Exact label name that counts as a person.
pub const PERSON_LABEL: &str = "Person";

/// Confidence substituted when the remote path finds a person.
pub const FIXED_PERSON_CONFIDENCE: f32 = 0.7;

/// One named label with the service's confidence in percent (0..100).
#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    pub name: String,
    pub confidence: f32,
}

impl Label {
    pub fn new(name: impl Into<String>, confidence: f32) -> Self {
        Self {
            name: name.into(),
            confidence,
        }
    }
}

/// Labels in the order the service returned them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LabelResponse {
    pub labels: Vec<Label>,
}

impl LabelResponse {
    pub fn new(labels: Vec<Label>) -> Self {
        Self { labels }
    }

    pub fn names(&self) -> Vec<String> {
        self.labels.iter().map(|label| label.name.clone()).collect()
    }

    fn person(&self) -> Option<&Label> {
        self.labels.iter().find(|label| label.name == PERSON_LABEL)
    }
}

/// How the remote path reports confidence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConfidenceMode {
    /// `0.7` when a person label is present, `0.0` otherwise. The service's
    /// score is discarded.
    #[default]
    Fixed,
    /// The service's score for the person label, scaled to 0..1.
    Reported,
}

/// Turn a label set into a verdict.
pub fn interpret_labels(response: &LabelResponse, mode: ConfidenceMode) -> DetectionResult {
    let person = response.person();
    let confidence = match (person, mode) {
        (None, _) => 0.0,
        (Some(_), ConfidenceMode::Fixed) => FIXED_PERSON_CONFIDENCE,
        (Some(label), ConfidenceMode::Reported) => (label.confidence / 100.0).clamp(0.0, 1.0),
    };

    DetectionResult {
        person_present: person.is_some(),
        source: Source::Rekognition,
        confidence,
        labels: Some(response.names()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn person_label_yields_fixed_confidence() {
        let response = LabelResponse::new(vec![
            Label::new("Human", 99.1),
            Label::new("Person", 99.1),
        ]);

        let result = interpret_labels(&response, ConfidenceMode::Fixed);

        assert!(result.person_present);
        assert_eq!(result.source, Source::Rekognition);
        assert_eq!(result.confidence, 0.7);
        assert_eq!(
            result.labels,
            Some(vec!["Human".to_string(), "Person".to_string()])
        );
    }

    #[test]
    fn missing_person_label_yields_zero() {
        let response = LabelResponse::new(vec![Label::new("Car", 91.0), Label::new("Tree", 80.0)]);

        let result = interpret_labels(&response, ConfidenceMode::Fixed);

        assert!(!result.person_present);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(
            result.labels,
            Some(vec!["Car".to_string(), "Tree".to_string()])
        );
    }

    #[test]
    fn label_match_is_exact() {
        let response = LabelResponse::new(vec![
            Label::new("person", 95.0),
            Label::new("Person Walking", 95.0),
        ]);

        let result = interpret_labels(&response, ConfidenceMode::Fixed);

        assert!(!result.person_present);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn reported_mode_uses_service_score() {
        let response = LabelResponse::new(vec![Label::new("Person", 88.5)]);

        let result = interpret_labels(&response, ConfidenceMode::Reported);

        assert!(result.person_present);
        assert!((result.confidence - 0.885).abs() < 1e-6);
    }

    #[test]
    fn empty_response_has_empty_label_list() {
        let result = interpret_labels(&LabelResponse::default(), ConfidenceMode::Reported);

        assert!(!result.person_present);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.labels, Some(vec![]));
    }
}
