//! Edge Agent
//!
//! Edge-first person detection for a single camera, with a cloud fallback.
//!
//! # Architecture
//!
//! Every frame follows one linear path:
//!
//! 1. **Ingest**: a camera source yields an RGB frame (`ingest`).
//! 2. **Local detection**: an on-device detector reports classes and scores (`detect`).
//! 3. **Decision**: a confident local person detection is final; anything else
//!    escalates (`policy`).
//! 4. **Remote labeling**: the frame is JPEG-encoded and labeled by
//!    Amazon Rekognition (`remote`).
//!
//! The loop (`agent`) is synchronous and single-threaded. Results are printed
//! and dropped; nothing is persisted.
//!
//! # Module Structure
//!
//! - `frame`: captured frames and JPEG encoding
//! - `ingest`: camera sources (V4L2, synthetic)
//! - `detect`: detector backends (tract/ONNX, stub) and result types
//! - `policy`: the edge-or-escalate decision
//! - `remote`: labeler trait, label interpretation, Rekognition client
//! - `agent`: the detection loop
//! - `config`: file + environment configuration

pub mod agent;
pub mod config;
pub mod detect;
pub mod frame;
pub mod ingest;
pub mod policy;
pub mod remote;

pub use agent::{EdgeAgent, StepOutcome, LOOP_INTERVAL};
pub use config::AgentConfig;
pub use detect::{Detection, DetectionResult, DetectorBackend, Source, StubBackend};
pub use frame::{encode_jpeg, Frame};
pub use ingest::{open_camera, CameraConfig, FrameSource, SyntheticSource};
pub use policy::{summarize_person, DecisionPolicy, DEFAULT_THRESHOLD};
pub use remote::{
    interpret_labels, ConfidenceMode, Label, LabelResponse, Labeler, RekognitionLabeler,
};
