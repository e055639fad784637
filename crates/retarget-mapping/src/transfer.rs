//! Per-entry transfer parameters.
//!
//! These describe *how* a driver transform becomes a bone-local channel. They
//! stay free of any math library; the engine converts to its own types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// What a mapping entry writes onto its bone.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransferKind {
    /// Bone rotation follows the driver rotation.
    #[default]
    CopyRotation,
    /// Bone location follows the driver position.
    CopyLocation,
    /// A single channel is driven by a distance between driver points.
    ValueByDistance,
    /// Kind this crate does not know. Kept verbatim on save, never applied.
    Other(String),
}

impl TransferKind {
    pub fn as_str(&self) -> &str {
        match self {
            TransferKind::CopyRotation => "copy_rotation",
            TransferKind::CopyLocation => "copy_location",
            TransferKind::ValueByDistance => "value_by_distance",
            TransferKind::Other(name) => name,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, TransferKind::Other(_))
    }
}

impl From<String> for TransferKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "copy_rotation" => TransferKind::CopyRotation,
            "copy_location" => TransferKind::CopyLocation,
            "value_by_distance" => TransferKind::ValueByDistance,
            _ => TransferKind::Other(s),
        }
    }
}

impl From<TransferKind> for String {
    fn from(k: TransferKind) -> Self {
        match k {
            TransferKind::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for TransferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    fn from_str(s: &str) -> Option<Axis> {
        match s {
            "x" => Some(Axis::X),
            "y" => Some(Axis::Y),
            "z" => Some(Axis::Z),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

/// Source axis with a sign, e.g. `"-z"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignedAxis {
    #[serde(rename = "x")]
    PosX,
    #[serde(rename = "-x")]
    NegX,
    #[serde(rename = "y")]
    PosY,
    #[serde(rename = "-y")]
    NegY,
    #[serde(rename = "z")]
    PosZ,
    #[serde(rename = "-z")]
    NegZ,
}

impl SignedAxis {
    #[inline]
    pub fn axis(self) -> Axis {
        match self {
            SignedAxis::PosX | SignedAxis::NegX => Axis::X,
            SignedAxis::PosY | SignedAxis::NegY => Axis::Y,
            SignedAxis::PosZ | SignedAxis::NegZ => Axis::Z,
        }
    }

    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            SignedAxis::PosX | SignedAxis::PosY | SignedAxis::PosZ => 1.0,
            SignedAxis::NegX | SignedAxis::NegY | SignedAxis::NegZ => -1.0,
        }
    }

    /// Signed component of `v` along this axis.
    #[inline]
    pub fn pick(self, v: [f32; 3]) -> f32 {
        self.sign() * v[self.axis().index()]
    }
}

/// Output axis `i` takes the source component named by `self.0[i]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AxisRemap(pub [SignedAxis; 3]);

impl AxisRemap {
    pub const IDENTITY: AxisRemap =
        AxisRemap([SignedAxis::PosX, SignedAxis::PosY, SignedAxis::PosZ]);

    pub fn apply(&self, v: [f32; 3]) -> [f32; 3] {
        [self.0[0].pick(v), self.0[1].pick(v), self.0[2].pick(v)]
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// True if every source axis is used exactly once.
    pub fn is_permutation(&self) -> bool {
        let mut seen = [false; 3];
        for a in self.0 {
            seen[a.axis().index()] = true;
        }
        seen.iter().all(|&s| s)
    }
}

impl Default for AxisRemap {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Closed numeric interval `[min, max]`; `min > max` is allowed and inverts
/// the mapping.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f32,
    pub max: f32,
}

impl ValueRange {
    pub const UNIT: ValueRange = ValueRange { min: 0.0, max: 1.0 };

    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn span(&self) -> f32 {
        self.max - self.min
    }

    fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }
}

/// Linearly map `value` from `from` into `to`.
///
/// A degenerate `from` range maps everything onto `to.min`.
pub fn remap_value(value: f32, from: ValueRange, to: ValueRange, clamp: bool) -> f32 {
    let span = from.span();
    let mut t = if span.abs() > f32::EPSILON {
        (value - from.min) / span
    } else {
        0.0
    };
    if clamp {
        t = t.clamp(0.0, 1.0);
    }
    to.min + t * to.span()
}

/// Bone channel written by a [`TransferKind::ValueByDistance`] entry.
///
/// Serialized as `"location.x"`, `"rotation_euler.z"` or any other non-empty
/// string naming a custom property.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ValueChannel {
    Location(Axis),
    RotationEuler(Axis),
    Property(String),
}

impl Default for ValueChannel {
    fn default() -> Self {
        ValueChannel::Property("value".to_string())
    }
}

impl TryFrom<String> for ValueChannel {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if s.is_empty() {
            return Err("channel name must not be empty".to_string());
        }
        if let Some(axis) = s.strip_prefix("location.").and_then(Axis::from_str) {
            return Ok(ValueChannel::Location(axis));
        }
        if let Some(axis) = s.strip_prefix("rotation_euler.").and_then(Axis::from_str) {
            return Ok(ValueChannel::RotationEuler(axis));
        }
        Ok(ValueChannel::Property(s))
    }
}

impl From<ValueChannel> for String {
    fn from(c: ValueChannel) -> Self {
        c.to_string()
    }
}

impl fmt::Display for ValueChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueChannel::Location(a) => write!(f, "location.{}", a.as_str()),
            ValueChannel::RotationEuler(a) => write!(f, "rotation_euler.{}", a.as_str()),
            ValueChannel::Property(name) => f.write_str(name),
        }
    }
}

fn default_influence() -> f32 {
    1.0
}

fn is_zero_offset(v: &[f32; 3]) -> bool {
    *v == [0.0; 3]
}

/// Transfer parameters of one mapping entry (`"transfer"` object).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransferParams {
    #[serde(default)]
    pub kind: TransferKind,
    #[serde(default, skip_serializing_if = "AxisRemap::is_identity")]
    pub axis_remap: AxisRemap,
    /// Blend factor towards the driven value, `[0, 1]`.
    #[serde(default = "default_influence")]
    pub influence: f32,
    /// Added after remapping (location channels only).
    #[serde(default, skip_serializing_if = "is_zero_offset")]
    pub offset: [f32; 3],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_range: Option<ValueRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_range: Option<ValueRange>,
    #[serde(default)]
    pub clamp: bool,
    /// Second driver point for distance channels. Without it the distance is
    /// measured from the origin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_driver: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<ValueChannel>,
    /// Fields this crate does not interpret; written back unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for TransferParams {
    fn default() -> Self {
        Self {
            kind: TransferKind::default(),
            axis_remap: AxisRemap::IDENTITY,
            influence: default_influence(),
            offset: [0.0; 3],
            from_range: None,
            to_range: None,
            clamp: false,
            distance_driver: None,
            channel: None,
            extra: Map::new(),
        }
    }
}

impl TransferParams {
    /// True if nothing would be written for this object, unknown fields
    /// included.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Channel written by a distance entry.
    pub fn value_channel(&self) -> ValueChannel {
        self.channel.clone().unwrap_or_default()
    }

    /// Map a raw value through `from_range`/`to_range` (identity when unset).
    pub fn remap(&self, value: f32) -> f32 {
        let from = self.from_range.unwrap_or(ValueRange::UNIT);
        let to = self.to_range.unwrap_or(ValueRange::UNIT);
        if self.from_range.is_none() && self.to_range.is_none() {
            return if self.clamp {
                value.clamp(0.0, 1.0)
            } else {
                value
            };
        }
        remap_value(value, from, to, self.clamp)
    }

    /// Check numeric fields; returns a human-readable reason on failure.
    pub fn validate(&self) -> Result<(), String> {
        if !self.influence.is_finite() || !(0.0..=1.0).contains(&self.influence) {
            return Err(format!("influence must be in [0, 1], got {}", self.influence));
        }
        if self.offset.iter().any(|v| !v.is_finite()) {
            return Err("offset must be finite".to_string());
        }
        if !self.axis_remap.is_permutation() {
            return Err("axis_remap must use each of x, y, z exactly once".to_string());
        }
        for (label, range) in [("from_range", self.from_range), ("to_range", self.to_range)] {
            if let Some(r) = range {
                if !r.is_finite() {
                    return Err(format!("{label} must be finite"));
                }
            }
        }
        Ok(())
    }
}
