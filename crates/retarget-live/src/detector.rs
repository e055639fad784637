//! Detector seam and recorded-landmark replay.

use crate::config::{LiveConfig, LiveIoError};
use crate::error::BoxError;
use retarget_core::LandmarkSet;
use serde::{Deserialize, Serialize};
use std::{collections::VecDeque, fs, path::Path};

/// Source of per-frame landmark sets.
pub trait Detector {
    /// Pull one result. `None` means the stream is exhausted.
    fn next_frame(&mut self) -> Option<LandmarkSet>;
}

/// Opens a [`Detector`] for a session. Failures surface from
/// [`crate::LiveScheduler::start`] as an invalid configuration.
pub trait DetectorFactory {
    type Detector: Detector;

    fn open(&mut self, config: &LiveConfig) -> Result<Self::Detector, BoxError>;
}

/// Landmark frames captured earlier, one entry per tick.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkRecording {
    #[serde(default)]
    pub frames: Vec<LandmarkSet>,
}

impl LandmarkRecording {
    pub fn new(frames: Vec<LandmarkSet>) -> Self {
        Self { frames }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
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

/// Yields the recorded frames in order, then reports end of stream.
#[derive(Clone, Debug)]
pub struct ReplayDetector {
    frames: VecDeque<LandmarkSet>,
}

impl ReplayDetector {
    pub fn new(recording: LandmarkRecording) -> Self {
        Self {
            frames: recording.frames.into(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl Detector for ReplayDetector {
    fn next_frame(&mut self) -> Option<LandmarkSet> {
        self.frames.pop_front()
    }
}

/// Opens a fresh [`ReplayDetector`] over the same recording on each start.
#[derive(Clone, Debug)]
pub struct ReplayFactory {
    recording: LandmarkRecording,
}

impl ReplayFactory {
    pub fn new(recording: LandmarkRecording) -> Self {
        Self { recording }
    }
}

impl DetectorFactory for ReplayFactory {
    type Detector = ReplayDetector;

    fn open(&mut self, config: &LiveConfig) -> Result<ReplayDetector, BoxError> {
        log::debug!(
            "replay: {} frames, detect type {:?}",
            self.recording.len(),
            config.detect_type
        );
        Ok(ReplayDetector::new(self.recording.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retarget_core::Landmark;

    fn frame(x: f32) -> LandmarkSet {
        let mut set = LandmarkSet::new();
        set.insert("NoseTip", Landmark::new([x, 0.0, 0.0], 0.9));
        set
    }

    #[test]
    fn replay_yields_frames_then_none() {
        let mut factory = ReplayFactory::new(LandmarkRecording::new(vec![frame(0.0), frame(1.0)]));
        let mut det = factory.open(&LiveConfig::default()).expect("open");
        assert_eq!(det.remaining(), 2);
        assert_eq!(det.next_frame(), Some(frame(0.0)));
        assert_eq!(det.next_frame(), Some(frame(1.0)));
        assert_eq!(det.next_frame(), None);

        let mut again = factory.open(&LiveConfig::default()).expect("reopen");
        assert_eq!(again.next_frame(), Some(frame(0.0)));
    }

    #[test]
    fn recording_json_layout() {
        let raw = r#"{"frames": [
            {"landmarks": {"NoseTip": {"position": [0.0, 1.0, 2.0], "confidence": 0.8, "group": "face"}}},
            {}
        ]}"#;
        let rec: LandmarkRecording = serde_json::from_str(raw).expect("parse");
        assert_eq!(rec.len(), 2);
        assert!(rec.frames[1].is_empty());
        let nose = rec.frames[0].get("NoseTip").expect("nose");
        assert_eq!(nose.position, [0.0, 1.0, 2.0]);
    }

    #[test]
    fn recording_file_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("rec.json");
        let rec = LandmarkRecording::new(vec![frame(0.5)]);
        rec.write_json(&path).expect("write");
        assert_eq!(LandmarkRecording::load_json(&path).expect("load"), rec);
    }
}
