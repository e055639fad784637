use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Transform of one driver object for a single scheduler tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DriverTransform {
    pub position: Vector3<f32>,
    pub rotation: UnitQuaternion<f32>,
    /// Detection quality in `[0, 1]`.
    pub confidence: f32,
}

impl DriverTransform {
    pub fn new(position: Vector3<f32>, rotation: UnitQuaternion<f32>, confidence: f32) -> Self {
        Self {
            position,
            rotation,
            confidence,
        }
    }

    /// Driver at `position` with identity rotation.
    pub fn at(position: Vector3<f32>, confidence: f32) -> Self {
        Self::new(position, UnitQuaternion::identity(), confidence)
    }

    /// True if the confidence reaches `min_confidence`.
    ///
    /// A NaN confidence never passes.
    #[inline]
    pub fn passes(&self, min_confidence: f32) -> bool {
        self.confidence >= min_confidence
    }
}

/// Driver transforms of one tick, keyed by driver name.
///
/// Lives for exactly one tick; nothing in the pipeline keeps a frame around.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DriverFrame {
    drivers: BTreeMap<String, DriverTransform>,
}

impl DriverFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a driver transform, returning the previous one.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        transform: DriverTransform,
    ) -> Option<DriverTransform> {
        self.drivers.insert(name.into(), transform)
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&DriverTransform> {
        self.drivers.get(name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }

    /// Iterate over `(name, transform)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DriverTransform)> {
        self.drivers.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of drivers whose confidence reaches `min_confidence`.
    pub fn count_passing(&self, min_confidence: f32) -> usize {
        self.drivers
            .values()
            .filter(|d| d.passes(min_confidence))
            .count()
    }
}

impl<S: Into<String>> FromIterator<(S, DriverTransform)> for DriverFrame {
    fn from_iter<I: IntoIterator<Item = (S, DriverTransform)>>(iter: I) -> Self {
        Self {
            drivers: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_gate_is_inclusive() {
        let d = DriverTransform::at(Vector3::zeros(), 0.7);
        assert!(d.passes(0.7));
        assert!(d.passes(0.5));
        assert!(!d.passes(0.71));
    }

    #[test]
    fn nan_confidence_never_passes() {
        let d = DriverTransform::at(Vector3::zeros(), f32::NAN);
        assert!(!d.passes(0.0));
    }

    #[test]
    fn frame_collects_and_counts() {
        let frame: DriverFrame = [
            ("LeftWrist", DriverTransform::at(Vector3::new(0.1, 0.0, 1.0), 0.9)),
            ("NoseTip", DriverTransform::at(Vector3::new(0.0, 0.0, 1.6), 0.2)),
        ]
        .into_iter()
        .collect();

        assert_eq!(frame.len(), 2);
        assert_eq!(frame.count_passing(0.5), 1);
        let names: Vec<&str> = frame.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["LeftWrist", "NoseTip"]);
    }
}
