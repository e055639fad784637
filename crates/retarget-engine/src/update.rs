use crate::error::RetargetError;
use crate::pose::PoseSink;
use nalgebra::{UnitQuaternion, Vector3};
use retarget_mapping::ValueChannel;

/// New value for one bone channel.
#[derive(Clone, Debug, PartialEq)]
pub enum PoseChannel {
    Location(Vector3<f32>),
    Rotation(UnitQuaternion<f32>),
    /// Single scalar channel (location/euler component or custom property).
    Value { channel: ValueChannel, value: f32 },
}

/// Pose change produced by one mapping entry.
#[derive(Clone, Debug, PartialEq)]
pub struct PoseUpdate {
    /// Skeleton bone name (after resolution).
    pub bone: String,
    /// Driver that produced the update.
    pub driver: String,
    pub channel: PoseChannel,
}

/// Why an entry produced no update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SkipReason {
    /// `target_bone` is absent or `"NONE"`.
    Unbound,
    /// No transform for the driver in this frame.
    MissingDriver,
    /// Driver confidence below the threshold.
    LowConfidence(f32),
    /// The distance partner is missing or below the threshold.
    DistanceDriverUnavailable,
    /// The entry's transfer kind is not one this engine applies.
    UnsupportedKind,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SkippedEntry {
    pub driver: String,
    pub reason: SkipReason,
}

/// Outcome of one retargeting pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PoseUpdateSet {
    pub updates: Vec<PoseUpdate>,
    pub skipped: Vec<SkippedEntry>,
    pub errors: Vec<RetargetError>,
}

impl PoseUpdateSet {
    #[inline]
    pub fn len(&self) -> usize {
        self.updates.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    pub fn for_bone<'a>(&'a self, bone: &'a str) -> impl Iterator<Item = &'a PoseUpdate> + 'a {
        self.updates.iter().filter(move |u| u.bone == bone)
    }

    pub fn for_driver(&self, driver: &str) -> Option<&PoseUpdate> {
        self.updates.iter().find(|u| u.driver == driver)
    }

    /// Push every update into `sink`, in order.
    pub fn apply_to<S: PoseSink + ?Sized>(&self, sink: &mut S) {
        for u in &self.updates {
            match &u.channel {
                PoseChannel::Location(v) => sink.set_location(&u.bone, *v),
                PoseChannel::Rotation(q) => sink.set_rotation(&u.bone, *q),
                PoseChannel::Value { channel, value } => sink.set_value(&u.bone, channel, *value),
            }
        }
    }
}
