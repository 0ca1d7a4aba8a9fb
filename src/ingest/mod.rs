//! Camera frame sources.
//!
//! - USB/V4L2 devices (feature: ingest-v4l2)
//! - Synthetic source for `stub://` devices (testing, offline runs)
//!
//! Every source produces packed RGB8 `Frame`s. A source is opened once at
//! startup; failure to open is fatal. Failures on individual reads are
//! reported to the caller, which decides whether to retry.

mod normalize;
pub mod synthetic;
#[cfg(feature = "ingest-v4l2")]
pub mod v4l2;

use anyhow::Result;

use crate::frame::Frame;

pub use synthetic::SyntheticSource;
#[cfg(feature = "ingest-v4l2")]
pub use v4l2::V4l2Source;

/// Device prefix that selects the synthetic source.
pub const STUB_SCHEME: &str = "stub://";

/// Configuration for a camera source.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraConfig {
    /// Device path (e.g., "/dev/video0") or `stub://<name>`.
    pub device: String,
    /// Requested frame rate. Devices may ignore it.
    pub target_fps: u32,
    /// Preferred frame width.
    pub width: u32,
    /// Preferred frame height.
    pub height: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device: "/dev/video0".to_string(),
            target_fps: 10,
            width: 640,
            height: 480,
        }
    }
}

/// Anything that yields frames one at a time.
pub trait FrameSource {
    /// Capture the next frame. Errors are per-read and may be transient.
    fn next_frame(&mut self) -> Result<Frame>;

    /// Human-readable source description for logs.
    fn describe(&self) -> String;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self) -> Result<Frame> {
        (**self).next_frame()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Open and connect the configured camera.
pub fn open_camera(config: &CameraConfig) -> Result<Box<dyn FrameSource>> {
    if config.device.starts_with(STUB_SCHEME) {
        let mut source = SyntheticSource::new(config.clone());
        source.connect()?;
        return Ok(Box::new(source));
    }
    open_device(config)
}

#[cfg(feature = "ingest-v4l2")]
fn open_device(config: &CameraConfig) -> Result<Box<dyn FrameSource>> {
    let mut source = V4l2Source::new(config.clone());
    source.connect()?;
    Ok(Box::new(source))
}

#[cfg(not(feature = "ingest-v4l2"))]
fn open_device(config: &CameraConfig) -> Result<Box<dyn FrameSource>> {
    anyhow::bail!(
        "camera {} requires the ingest-v4l2 feature; rebuild with --features ingest-v4l2 or use a {} device",
        config.device,
        STUB_SCHEME
    )
}
