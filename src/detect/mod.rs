mod backend;
mod backends;
mod result;

pub use backend::DetectorBackend;
pub use backends::StubBackend;
#[cfg(feature = "backend-tract")]
pub use backends::{TractBackend, YoloParams};
pub use result::{Detection, DetectionResult, Source, PERSON_CLASS_ID};
