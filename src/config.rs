use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::ingest::CameraConfig;
use crate::policy::DEFAULT_THRESHOLD;
use crate::remote::{region_from_env, ConfidenceMode};

const DEFAULT_MODEL: &str = "yolov8n.onnx";
const DEFAULT_INPUT_SIZE: u32 = 640;

/// Model name that selects the scripted stub detector.
pub const STUB_MODEL: &str = "stub";

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct AgentConfigFile {
    camera: Option<CameraConfigFile>,
    detector: Option<DetectorConfigFile>,
    remote: Option<RemoteConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct CameraConfigFile {
    device: Option<String>,
    target_fps: Option<u32>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct DetectorConfigFile {
    model: Option<PathBuf>,
    input_size: Option<u32>,
    threshold: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct RemoteConfigFile {
    region: Option<String>,
    reported_confidence: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub camera: CameraConfig,
    pub detector: DetectorSettings,
    pub remote: RemoteSettings,
}

#[derive(Debug, Clone)]
pub struct DetectorSettings {
    /// ONNX model path, or `stub`.
    pub model: PathBuf,
    pub input_size: u32,
    /// Minimum local person confidence for an edge verdict.
    pub threshold: f32,
}

impl DetectorSettings {
    pub fn is_stub(&self) -> bool {
        self.model.as_os_str() == STUB_MODEL
    }
}

#[derive(Debug, Clone)]
pub struct RemoteSettings {
    pub region: String,
    pub confidence_mode: ConfidenceMode,
}

impl AgentConfig {
    /// Defaults, then `EDGE_AGENT_CONFIG` (JSON), then environment overrides.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("EDGE_AGENT_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) if !path.trim().is_empty() => Some(read_config_file(Path::new(path))?),
            _ => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: AgentConfigFile) -> Self {
        let camera_defaults = CameraConfig::default();
        let camera = file.camera.unwrap_or_default();
        let detector = file.detector.unwrap_or_default();
        let remote = file.remote.unwrap_or_default();

        Self {
            camera: CameraConfig {
                device: camera.device.unwrap_or(camera_defaults.device),
                target_fps: camera.target_fps.unwrap_or(camera_defaults.target_fps),
                width: camera.width.unwrap_or(camera_defaults.width),
                height: camera.height.unwrap_or(camera_defaults.height),
            },
            detector: DetectorSettings {
                model: detector
                    .model
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL)),
                input_size: detector.input_size.unwrap_or(DEFAULT_INPUT_SIZE),
                threshold: detector.threshold.unwrap_or(DEFAULT_THRESHOLD),
            },
            remote: RemoteSettings {
                region: remote.region.unwrap_or_else(region_from_env),
                confidence_mode: if remote.reported_confidence.unwrap_or(false) {
                    ConfidenceMode::Reported
                } else {
                    ConfidenceMode::Fixed
                },
            },
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(device) = std::env::var("EDGE_AGENT_CAMERA") {
            if !device.trim().is_empty() {
                self.camera.device = device;
            }
        }
        if let Ok(model) = std::env::var("EDGE_AGENT_MODEL") {
            if !model.trim().is_empty() {
                self.detector.model = PathBuf::from(model);
            }
        }
        if let Ok(threshold) = std::env::var("EDGE_AGENT_THRESHOLD") {
            self.detector.threshold = threshold
                .trim()
                .parse()
                .map_err(|_| anyhow!("EDGE_AGENT_THRESHOLD must be a number between 0 and 1"))?;
        }
        if let Ok(flag) = std::env::var("EDGE_AGENT_REPORTED_CONFIDENCE") {
            self.remote.confidence_mode = if parse_bool(&flag)? {
                ConfidenceMode::Reported
            } else {
                ConfidenceMode::Fixed
            };
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.detector.threshold) {
            return Err(anyhow!(
                "detector threshold must be within 0..=1, got {}",
                self.detector.threshold
            ));
        }
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(anyhow!("camera width and height must be non-zero"));
        }
        if self.detector.input_size == 0 {
            return Err(anyhow!("detector input_size must be non-zero"));
        }
        if self.remote.region.trim().is_empty() {
            return Err(anyhow!("remote region must not be empty"));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<AgentConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(anyhow!(
            "EDGE_AGENT_REPORTED_CONFIDENCE must be a boolean, got '{}'",
            other
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let cfg = AgentConfig::from_file(AgentConfigFile::default());

        assert_eq!(cfg.camera, CameraConfig::default());
        assert_eq!(cfg.detector.model, PathBuf::from("yolov8n.onnx"));
        assert_eq!(cfg.detector.input_size, 640);
        assert_eq!(cfg.detector.threshold, 0.7);
        assert_eq!(cfg.remote.confidence_mode, ConfidenceMode::Fixed);
        assert!(!cfg.detector.is_stub());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let parsed: Result<AgentConfigFile, _> =
            serde_json::from_str(r#"{ "detector": { "treshold": 0.5 } }"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn parse_bool_accepts_common_spellings() -> Result<()> {
        assert!(parse_bool("TRUE")?);
        assert!(parse_bool(" 1 ")?);
        assert!(!parse_bool("off")?);
        assert!(parse_bool("maybe").is_err());
        Ok(())
    }
}
