//! Live session configuration.

use crate::error::LiveError;
use retarget_core::LandmarkGroup;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, time::Duration};

#[derive(thiserror::Error, Debug)]
pub enum LiveIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Requested capture resolution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamDim {
    /// 720x480
    #[default]
    Sd,
    /// 1240x720
    Hd,
    /// 1920x1080
    Fhd,
}

impl StreamDim {
    /// `(width, height)` in pixels.
    pub fn size(self) -> (u32, u32) {
        match self {
            StreamDim::Sd => (720, 480),
            StreamDim::Hd => (1240, 720),
            StreamDim::Fhd => (1920, 1080),
        }
    }
}

/// Capture API preference.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Default,
    /// DirectShow.
    Capdshow,
}

impl Backend {
    /// Numeric API id as understood by common capture libraries.
    pub fn api_preference(self) -> i32 {
        match self {
            Backend::Default => 0,
            Backend::Capdshow => 700,
        }
    }
}

/// Which detector model feeds the session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DetectType {
    Hand,
    Face,
    #[default]
    Pose,
    Holistic,
}

impl DetectType {
    /// True if landmarks of `group` belong to this detector's output.
    pub fn accepts(self, group: LandmarkGroup) -> bool {
        match self {
            DetectType::Hand => group == LandmarkGroup::Hand,
            DetectType::Face => group == LandmarkGroup::Face,
            DetectType::Pose => group == LandmarkGroup::Pose,
            DetectType::Holistic => true,
        }
    }
}

fn default_min_confidence() -> f32 {
    0.7
}

fn default_tick_interval_ms() -> u64 {
    100
}

/// Options for [`crate::LiveScheduler::start`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveConfig {
    #[serde(default)]
    pub webcam_device: u32,
    #[serde(default)]
    pub stream_dim: StreamDim,
    #[serde(default)]
    pub backend: Backend,
    #[serde(default)]
    pub detect_type: DetectType,
    /// Drivers below this confidence are not retargeted.
    #[serde(default = "default_min_confidence")]
    pub min_tracking_confidence: f32,
    /// Re-apply every N ticks; `0` applies once only.
    #[serde(default)]
    pub refresh_interval: u32,
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            webcam_device: 0,
            stream_dim: StreamDim::default(),
            backend: Backend::default(),
            detect_type: DetectType::default(),
            min_tracking_confidence: default_min_confidence(),
            refresh_interval: 0,
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl LiveConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), LiveError> {
        let c = self.min_tracking_confidence;
        if !c.is_finite() || !(0.0..=1.0).contains(&c) {
            return Err(LiveError::invalid_config(format!(
                "minTrackingConfidence must be in [0, 1], got {c}"
            )));
        }
        if self.tick_interval_ms == 0 {
            return Err(LiveError::invalid_config("tickIntervalMs must be positive"));
        }
        Ok(())
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, LiveIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), LiveIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
