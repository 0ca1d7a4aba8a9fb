//! Synthetic frame source for `stub://` devices.

use anyhow::{anyhow, Result};

use super::{CameraConfig, FrameSource};
use crate::frame::Frame;

/// Generates patterned RGB frames. Optionally fails every Nth read so the
/// loop's retry path can be exercised without hardware.
pub struct SyntheticSource {
    config: CameraConfig,
    frame_count: u64,
    reads: u64,
    fail_every: Option<u64>,
    connected: bool,
}

impl SyntheticSource {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            config,
            frame_count: 0,
            reads: 0,
            fail_every: None,
            connected: false,
        }
    }

    /// Fail every `n`th read (1-based). `0` disables failures.
    pub fn with_failure_every(mut self, n: u64) -> Self {
        self.fail_every = (n > 0).then_some(n);
        self
    }

    /// Synthetic sources are always available.
    pub fn connect(&mut self) -> Result<()> {
        self.connected = true;
        log::info!(
            "SyntheticSource: connected to {} ({}x{})",
            self.config.device,
            self.config.width,
            self.config.height
        );
        Ok(())
    }

    pub fn frames_captured(&self) -> u64 {
        self.frame_count
    }

    /// Reads attempted, including injected failures.
    pub fn reads(&self) -> u64 {
        self.reads
    }

    fn generate_pixels(&self) -> Vec<u8> {
        let pixel_count = (self.config.width as usize) * (self.config.height as usize) * 3;
        (0..pixel_count)
            .map(|i| ((i as u64 + self.frame_count) % 256) as u8)
            .collect()
    }
}

impl FrameSource for SyntheticSource {
    fn next_frame(&mut self) -> Result<Frame> {
        if !self.connected {
            return Err(anyhow!("synthetic source not connected; call connect() first"));
        }
        self.reads += 1;
        if let Some(n) = self.fail_every {
            if self.reads % n == 0 {
                return Err(anyhow!("synthetic read failure on read {}", self.reads));
            }
        }

        self.frame_count += 1;
        Frame::new(self.generate_pixels(), self.config.width, self.config.height)
    }

    fn describe(&self) -> String {
        format!("{} (synthetic)", self.config.device)
    }
}
