use nalgebra::{UnitQuaternion, Vector3};
use retarget_mapping::ValueChannel;
use retarget_skeleton::SkeletonGraph;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Receiver of bone pose values, typically the host's live skeleton.
pub trait PoseSink {
    fn set_location(&mut self, bone: &str, location: Vector3<f32>);
    fn set_rotation(&mut self, bone: &str, rotation: UnitQuaternion<f32>);
    fn set_value(&mut self, bone: &str, channel: &ValueChannel, value: f32);
}

/// Local pose of one bone.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BonePose {
    pub location: Vector3<f32>,
    pub rotation: UnitQuaternion<f32>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, f32>,
}

impl Default for BonePose {
    fn default() -> Self {
        Self {
            location: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
            properties: BTreeMap::new(),
        }
    }
}

impl BonePose {
    fn set_euler(&mut self, axis: usize, angle: f32) {
        let (r, p, y) = self.rotation.euler_angles();
        let mut e = [r, p, y];
        e[axis] = angle;
        self.rotation = UnitQuaternion::from_euler_angles(e[0], e[1], e[2]);
    }
}

/// In-memory pose store.
///
/// Bones keep their last value until an update overwrites it, so a skipped
/// entry leaves its bone untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkeletonPose {
    bones: BTreeMap<String, BonePose>,
}

impl SkeletonPose {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rest pose for every bone of `skeleton`.
    pub fn rest(skeleton: &SkeletonGraph) -> Self {
        Self {
            bones: skeleton
                .names()
                .map(|n| (n.to_string(), BonePose::default()))
                .collect(),
        }
    }

    pub fn get(&self, bone: &str) -> Option<&BonePose> {
        self.bones.get(bone)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BonePose)> {
        self.bones.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn bone_mut(&mut self, bone: &str) -> &mut BonePose {
        self.bones.entry(bone.to_string()).or_default()
    }
}

impl PoseSink for SkeletonPose {
    fn set_location(&mut self, bone: &str, location: Vector3<f32>) {
        self.bone_mut(bone).location = location;
    }

    fn set_rotation(&mut self, bone: &str, rotation: UnitQuaternion<f32>) {
        self.bone_mut(bone).rotation = rotation;
    }

    fn set_value(&mut self, bone: &str, channel: &ValueChannel, value: f32) {
        let pose = self.bone_mut(bone);
        match channel {
            ValueChannel::Location(axis) => pose.location[axis.index()] = value,
            ValueChannel::RotationEuler(axis) => pose.set_euler(axis.index(), value),
            ValueChannel::Property(name) => {
                pose.properties.insert(name.clone(), value);
            }
        }
    }
}
