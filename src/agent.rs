//! Detection loop driver.
//!
//! One state, "running". Each iteration reads a frame, classifies it and
//! prints a line when a person is present. Read failures are retried forever
//! at a fixed interval; detector and remote errors end the loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Result;

use crate::detect::{DetectionResult, DetectorBackend};
use crate::ingest::FrameSource;
use crate::policy::DecisionPolicy;
use crate::remote::Labeler;

/// Pause after every iteration, including failed reads.
pub const LOOP_INTERVAL: Duration = Duration::from_millis(100);

/// What one iteration did.
#[derive(Clone, Debug, PartialEq)]
pub enum StepOutcome {
    /// The camera returned no frame; nothing else ran.
    ReadFailed,
    /// The frame was classified.
    Classified(DetectionResult),
}

pub struct EdgeAgent<S, D, L> {
    source: S,
    detector: D,
    labeler: L,
    policy: DecisionPolicy,
    interval: Duration,
    frames: u64,
}

impl<S, D, L> EdgeAgent<S, D, L>
where
    S: FrameSource,
    D: DetectorBackend,
    L: Labeler,
{
    pub fn new(source: S, detector: D, labeler: L, policy: DecisionPolicy) -> Self {
        Self {
            source,
            detector,
            labeler,
            policy,
            interval: LOOP_INTERVAL,
            frames: 0,
        }
    }

    /// Override the pause between iterations.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run one iteration without sleeping.
    pub fn step(&mut self) -> Result<StepOutcome> {
        let Ok(frame) = self.source.next_frame() else {
            return Ok(StepOutcome::ReadFailed);
        };
        self.frames += 1;

        let detections = self
            .detector
            .detect(frame.pixels(), frame.width, frame.height)?;
        log::debug!(
            "frame #{}: {} detections from {}",
            self.frames,
            detections.len(),
            self.detector.name()
        );

        let result = self.policy.decide(&detections, &frame, &mut self.labeler)?;
        if result.person_present {
            println!("{}", result.person_line());
        }
        Ok(StepOutcome::Classified(result))
    }

    /// Loop until `running` is cleared or an iteration fails.
    pub fn run(&mut self, running: &AtomicBool) -> Result<()> {
        while running.load(Ordering::SeqCst) {
            self.step()?;
            std::thread::sleep(self.interval);
        }
        log::info!("edge agent stopped after {} frames", self.frames);
        Ok(())
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    pub fn labeler(&self) -> &L {
        &self.labeler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::detect::{Detection, Source, StubBackend};
    use crate::ingest::{CameraConfig, SyntheticSource};
    use crate::remote::{Label, LabelResponse};

    #[derive(Default)]
    struct CountingLabeler {
        labels: Vec<&'static str>,
        calls: usize,
    }

    impl Labeler for CountingLabeler {
        fn detect_labels(&mut self, _image: &[u8]) -> Result<LabelResponse> {
            self.calls += 1;
            Ok(LabelResponse::new(
                self.labels.iter().map(|n| Label::new(*n, 90.0)).collect(),
            ))
        }
    }

    struct FailingLabeler;

    impl Labeler for FailingLabeler {
        fn detect_labels(&mut self, _image: &[u8]) -> Result<LabelResponse> {
            Err(anyhow::anyhow!("UnrecognizedClientException"))
        }
    }

    fn camera(fail_every: u64) -> SyntheticSource {
        let mut source = SyntheticSource::new(CameraConfig {
            device: "stub://test".to_string(),
            target_fps: 10,
            width: 16,
            height: 16,
        })
        .with_failure_every(fail_every);
        source.connect().unwrap();
        source
    }

    #[test]
    fn read_failure_skips_detection() -> Result<()> {
        let detector = StubBackend::new();
        let mut agent = EdgeAgent::new(
            camera(1),
            detector,
            CountingLabeler::default(),
            DecisionPolicy::default(),
        );

        assert_eq!(agent.step()?, StepOutcome::ReadFailed);
        assert_eq!(agent.step()?, StepOutcome::ReadFailed);
        assert_eq!(agent.detector().calls(), 0);
        assert_eq!(agent.labeler().calls, 0);
        assert_eq!(agent.source().reads(), 2);
        Ok(())
    }

    #[test]
    fn step_routes_frames_through_policy() -> Result<()> {
        let detector = StubBackend::new()
            .with_frame(vec![Detection::new(0, 0.92)])
            .with_frame(vec![Detection::new(0, 0.4)])
            .with_frame(vec![]);
        let labeler = CountingLabeler {
            labels: vec!["Person"],
            calls: 0,
        };
        let mut agent = EdgeAgent::new(camera(0), detector, labeler, DecisionPolicy::default());

        let StepOutcome::Classified(first) = agent.step()? else {
            panic!("expected a classified frame");
        };
        assert_eq!(first.source, Source::Edge);
        assert_eq!(first.confidence, 0.92);
        assert_eq!(agent.labeler().calls, 0);

        let StepOutcome::Classified(second) = agent.step()? else {
            panic!("expected a classified frame");
        };
        assert_eq!(second.source, Source::Rekognition);
        assert_eq!(second.confidence, 0.7);

        let StepOutcome::Classified(third) = agent.step()? else {
            panic!("expected a classified frame");
        };
        assert!(third.person_present);
        assert_eq!(agent.labeler().calls, 2);
        assert_eq!(agent.frames(), 3);
        Ok(())
    }

    #[test]
    fn remote_errors_propagate() {
        let mut agent = EdgeAgent::new(
            camera(0),
            StubBackend::new(),
            FailingLabeler,
            DecisionPolicy::default(),
        );

        let err = agent.step().unwrap_err();
        assert!(err.to_string().contains("UnrecognizedClientException"));
    }

    /// Clears the running flag once it has seen `limit` frames.
    struct StopAfter {
        running: Arc<AtomicBool>,
        limit: u64,
        seen: u64,
    }

    impl DetectorBackend for StopAfter {
        fn name(&self) -> &'static str {
            "stop-after"
        }

        fn detect(&mut self, _pixels: &[u8], _w: u32, _h: u32) -> Result<Vec<Detection>> {
            self.seen += 1;
            if self.seen >= self.limit {
                self.running.store(false, Ordering::SeqCst);
            }
            Ok(vec![Detection::new(0, 0.99)])
        }
    }

    #[test]
    fn run_retries_read_failures_until_stopped() -> Result<()> {
        let running = Arc::new(AtomicBool::new(true));
        let detector = StopAfter {
            running: running.clone(),
            limit: 3,
            seen: 0,
        };
        let mut agent = EdgeAgent::new(
            camera(2),
            detector,
            CountingLabeler::default(),
            DecisionPolicy::default(),
        )
        .with_interval(Duration::from_millis(1));

        agent.run(&running)?;

        assert_eq!(agent.frames(), 3);
        assert_eq!(agent.source().reads(), 5);
        assert_eq!(agent.labeler().calls, 0);
        Ok(())
    }

    #[test]
    fn run_returns_immediately_when_not_running() -> Result<()> {
        let running = AtomicBool::new(false);
        let mut agent = EdgeAgent::new(
            camera(0),
            StubBackend::new(),
            CountingLabeler::default(),
            DecisionPolicy::default(),
        );

        agent.run(&running)?;

        assert_eq!(agent.frames(), 0);
        Ok(())
    }
}
