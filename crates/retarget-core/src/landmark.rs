use crate::driver::DriverTransform;
use nalgebra::{Quaternion, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Detector model a landmark came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LandmarkGroup {
    Pose,
    Hand,
    Face,
}

/// Single named landmark reported by a detector.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// Position in detector space.
    pub position: [f32; 3],
    /// Optional orientation as `[x, y, z, w]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<[f32; 4]>,
    /// Detection confidence in `[0, 1]`.
    pub confidence: f32,
    /// Source model; `None` when the detector does not say.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<LandmarkGroup>,
}

impl Landmark {
    pub fn new(position: [f32; 3], confidence: f32) -> Self {
        Self {
            position,
            rotation: None,
            confidence,
            group: None,
        }
    }

    pub fn with_group(mut self, group: LandmarkGroup) -> Self {
        self.group = Some(group);
        self
    }

    /// True if every position component is finite.
    pub fn is_finite(&self) -> bool {
        self.position.iter().all(|v| v.is_finite())
    }

    /// True if the confidence reaches `threshold`.
    #[inline]
    pub fn is_valid(&self, threshold: f32) -> bool {
        self.confidence >= threshold
    }

    /// Convert into a driver transform.
    ///
    /// Missing or degenerate (near-zero) rotations become identity.
    pub fn to_driver(&self) -> DriverTransform {
        let [x, y, z] = self.position;
        let rotation = match self.rotation {
            Some([qx, qy, qz, qw]) => {
                let q = Quaternion::new(qw, qx, qy, qz);
                if q.norm() > 1e-6 {
                    UnitQuaternion::from_quaternion(q)
                } else {
                    UnitQuaternion::identity()
                }
            }
            None => UnitQuaternion::identity(),
        };
        DriverTransform::new(Vector3::new(x, y, z), rotation, self.confidence)
    }
}

/// All landmarks a detector produced for one frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkSet {
    #[serde(default)]
    pub landmarks: BTreeMap<String, Landmark>,
}

impl LandmarkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, landmark: Landmark) {
        self.landmarks.insert(name.into(), landmark);
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&Landmark> {
        self.landmarks.get(name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Landmark)> {
        self.landmarks.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Mean confidence over all landmarks, `0.0` for an empty set.
    pub fn average_confidence(&self) -> f32 {
        if self.landmarks.is_empty() {
            return 0.0;
        }
        let sum: f32 = self.landmarks.values().map(|l| l.confidence).sum();
        sum / self.landmarks.len() as f32
    }
}
