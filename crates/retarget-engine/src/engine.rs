use crate::error::RetargetError;
use crate::resolve::BoneResolver;
use crate::update::{PoseChannel, PoseUpdate, PoseUpdateSet, SkipReason, SkippedEntry};
use log::{debug, trace, warn};
use nalgebra::{UnitQuaternion, Vector3};
use retarget_core::{DriverFrame, DriverTransform};
use retarget_mapping::{default_rules, MappingDocument, MappingEntry, NameRules, TransferKind};
use retarget_skeleton::SkeletonGraph;

#[cfg(feature = "tracing")]
use tracing::instrument;

const MIN_REST_DISTANCE: f32 = 1e-6;

/// Turns driver frames into bone pose updates according to a mapping.
///
/// The engine holds no per-pass state; [`RetargetEngine::apply`] only reads its
/// inputs and can be called from anywhere.
#[derive(Clone, Debug)]
pub struct RetargetEngine {
    names: NameRules,
}

impl Default for RetargetEngine {
    fn default() -> Self {
        Self::new(default_rules().clone())
    }
}

struct Pass<'a> {
    frame: &'a DriverFrame,
    skeleton: &'a SkeletonGraph,
    resolver: BoneResolver<'a>,
    min_confidence: f32,
}

enum EntryOutcome {
    Update(PoseUpdate),
    Skip(SkipReason),
    Error(RetargetError),
}

impl RetargetEngine {
    pub fn new(names: NameRules) -> Self {
        Self { names }
    }

    pub fn name_rules(&self) -> &NameRules {
        &self.names
    }

    /// Compute pose updates for every bound entry whose driver passes the
    /// confidence gate.
    ///
    /// Entries are independent: a missing bone is recorded in
    /// [`PoseUpdateSet::errors`] and the pass continues. Skipped entries
    /// produce no update, so the caller's pose for that bone stays as it was.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "debug",
            skip_all,
            fields(entries = mapping.len(), drivers = frame.len(), min_confidence = min_confidence)
        )
    )]
    pub fn apply(
        &self,
        mapping: &MappingDocument,
        skeleton: &SkeletonGraph,
        frame: &DriverFrame,
        min_confidence: f32,
    ) -> PoseUpdateSet {
        let pass = Pass {
            frame,
            skeleton,
            resolver: BoneResolver::new(skeleton, &self.names),
            min_confidence,
        };

        let mut out = PoseUpdateSet::default();
        for (driver, entry) in mapping.iter() {
            match pass.entry(driver, entry) {
                EntryOutcome::Update(u) => out.updates.push(u),
                EntryOutcome::Skip(reason) => {
                    trace!("skip `{driver}`: {reason:?}");
                    out.skipped.push(SkippedEntry {
                        driver: driver.to_string(),
                        reason,
                    });
                }
                EntryOutcome::Error(err) => {
                    warn!("{err}");
                    out.errors.push(err);
                }
            }
        }
        debug!(
            "retarget pass: {} updates, {} skipped, {} errors",
            out.updates.len(),
            out.skipped.len(),
            out.errors.len()
        );
        out
    }
}

impl Pass<'_> {
    fn gated(&self, driver: &str) -> Result<&DriverTransform, SkipReason> {
        let t = self.frame.get(driver).ok_or(SkipReason::MissingDriver)?;
        if t.passes(self.min_confidence) {
            Ok(t)
        } else {
            Err(SkipReason::LowConfidence(t.confidence))
        }
    }

    fn entry(&self, driver: &str, entry: &MappingEntry) -> EntryOutcome {
        let Some(target) = entry.bound_target() else {
            return EntryOutcome::Skip(SkipReason::Unbound);
        };
        if !entry.transfer.kind.is_supported() {
            debug!("`{driver}`: transfer kind `{}` is not supported", entry.transfer.kind);
            return EntryOutcome::Skip(SkipReason::UnsupportedKind);
        }
        let transform = match self.gated(driver) {
            Ok(t) => t,
            Err(reason) => return EntryOutcome::Skip(reason),
        };
        let Some(bone) = self.resolver.resolve(target) else {
            return EntryOutcome::Error(RetargetError::UnboundBone {
                driver: driver.to_string(),
                bone: target.to_string(),
            });
        };

        let params = &entry.transfer;
        let channel = match &params.kind {
            TransferKind::CopyRotation => {
                let sa = transform.rotation.scaled_axis();
                let remapped = Vector3::from(params.axis_remap.apply([sa.x, sa.y, sa.z]));
                PoseChannel::Rotation(UnitQuaternion::from_scaled_axis(remapped * params.influence))
            }
            TransferKind::CopyLocation => {
                let p = transform.position;
                let remapped = Vector3::from(params.axis_remap.apply([p.x, p.y, p.z]));
                PoseChannel::Location(remapped * params.influence + Vector3::from(params.offset))
            }
            TransferKind::ValueByDistance => match self.distance_value(driver, entry, bone, transform) {
                Ok(value) => PoseChannel::Value {
                    channel: params.value_channel(),
                    value,
                },
                Err(outcome) => return outcome,
            },
            TransferKind::Other(_) => return EntryOutcome::Skip(SkipReason::UnsupportedKind),
        };

        EntryOutcome::Update(PoseUpdate {
            bone: bone.to_string(),
            driver: driver.to_string(),
            channel,
        })
    }

    /// Distance between this driver and its partner, divided by the rest
    /// distance between the target and helper bones, then range-mapped.
    fn distance_value(
        &self,
        driver: &str,
        entry: &MappingEntry,
        bone: &str,
        transform: &DriverTransform,
    ) -> Result<f32, EntryOutcome> {
        let params = &entry.transfer;
        let partner = match params.distance_driver.as_deref() {
            Some(name) => match self.gated(name) {
                Ok(t) => t.position,
                Err(_) => return Err(EntryOutcome::Skip(SkipReason::DistanceDriverUnavailable)),
            },
            None => Vector3::zeros(),
        };
        let distance = (transform.position - partner).norm();

        let rest = match entry.bound_other() {
            Some(helper) => {
                let Some(helper_bone) = self.resolver.resolve(helper) else {
                    return Err(EntryOutcome::Error(RetargetError::UnboundHelper {
                        driver: driver.to_string(),
                        bone: helper.to_string(),
                    }));
                };
                self.skeleton
                    .head_distance(bone, helper_bone)
                    .filter(|d| *d > MIN_REST_DISTANCE)
                    .unwrap_or(1.0)
            }
            None => 1.0,
        };

        Ok(params.remap(distance / rest) * params.influence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SkeletonPose;
    use approx::assert_relative_eq;
    use retarget_mapping::{AxisRemap, SignedAxis, TransferParams, ValueChannel, ValueRange};

    fn skeleton() -> SkeletonGraph {
        let mut g = SkeletonGraph::new();
        g.add_bone("root", Vector3::zeros(), Vector3::z(), None).unwrap();
        g.add_bone("head", Vector3::new(0.0, 0.0, 1.3), Vector3::new(0.0, 0.0, 1.6), Some("root"))
            .unwrap();
        g.add_bone("hand.L", Vector3::new(0.65, 0.1, 0.95), Vector3::new(0.65, 0.1, 0.9), Some("root"))
            .unwrap();
        g.add_bone("thumb.L", Vector3::new(0.65, 0.2, 0.95), Vector3::new(0.65, 0.25, 0.95), Some("hand.L"))
            .unwrap();
        g
    }

    fn rotated(angle: f32, confidence: f32) -> DriverTransform {
        DriverTransform::new(
            Vector3::new(0.1, 0.2, 0.3),
            UnitQuaternion::from_euler_angles(0.0, 0.0, angle),
            confidence,
        )
    }

    #[test]
    fn copies_rotation_of_confident_drivers() {
        let doc: MappingDocument = [("NoseTip", MappingEntry::bound_to("head"))]
            .into_iter()
            .collect();
        let frame: DriverFrame = [("NoseTip", rotated(0.5, 0.9))].into_iter().collect();
        let set = RetargetEngine::default().apply(&doc, &skeleton(), &frame, 0.7);
        assert_eq!(set.len(), 1);
        let PoseChannel::Rotation(q) = &set.updates[0].channel else {
            panic!("expected rotation");
        };
        assert_relative_eq!(q.angle(), 0.5, epsilon = 1e-5);
        assert_eq!(set.updates[0].bone, "head");
    }

    #[test]
    fn none_binding_never_updates() {
        let doc: MappingDocument = [("NoseTip", MappingEntry::unbound())].into_iter().collect();
        let engine = RetargetEngine::default();
        for confidence in [0.0, 0.5, 1.0] {
            let frame: DriverFrame = [("NoseTip", rotated(0.2, confidence))].into_iter().collect();
            let set = engine.apply(&doc, &skeleton(), &frame, 0.0);
            assert!(set.is_empty());
            assert_eq!(set.skipped[0].reason, SkipReason::Unbound);
            assert!(set.errors.is_empty());
        }
    }

    #[test]
    fn low_confidence_leaves_pose_unchanged() {
        let doc: MappingDocument = [("NoseTip", MappingEntry::bound_to("head"))]
            .into_iter()
            .collect();
        let g = skeleton();
        let engine = RetargetEngine::default();
        let mut pose = SkeletonPose::rest(&g);

        let good: DriverFrame = [("NoseTip", rotated(0.4, 0.95))].into_iter().collect();
        engine.apply(&doc, &g, &good, 0.7).apply_to(&mut pose);
        let snapshot = pose.clone();

        for i in 0..5 {
            let weak: DriverFrame = [("NoseTip", rotated(i as f32, 0.3))].into_iter().collect();
            let set = engine.apply(&doc, &g, &weak, 0.7);
            assert!(set.is_empty());
            assert!(matches!(set.skipped[0].reason, SkipReason::LowConfidence(c) if c == 0.3));
            set.apply_to(&mut pose);
            assert_eq!(pose, snapshot);
        }
    }

    #[test]
    fn missing_bone_is_isolated_per_entry() {
        let doc: MappingDocument = [
            ("NoseTip", MappingEntry::bound_to("head")),
            ("LeftEar", MappingEntry::bound_to("ear.L")),
        ]
        .into_iter()
        .collect();
        let frame: DriverFrame = [("NoseTip", rotated(0.1, 1.0)), ("LeftEar", rotated(0.1, 1.0))]
            .into_iter()
            .collect();
        let set = RetargetEngine::default().apply(&doc, &skeleton(), &frame, 0.5);
        assert_eq!(set.len(), 1);
        assert_eq!(
            set.errors,
            [RetargetError::UnboundBone {
                driver: "LeftEar".into(),
                bone: "ear.L".into()
            }]
        );
    }

    #[test]
    fn missing_driver_is_skipped() {
        let doc: MappingDocument = [("NoseTip", MappingEntry::bound_to("head"))]
            .into_iter()
            .collect();
        let set = RetargetEngine::default().apply(&doc, &skeleton(), &DriverFrame::new(), 0.0);
        assert!(set.is_empty());
        assert_eq!(set.skipped[0].reason, SkipReason::MissingDriver);
    }

    #[test]
    fn resolves_prefixed_names() {
        let doc: MappingDocument = [("LeftWrist", MappingEntry::bound_to("DEF-hand.L"))]
            .into_iter()
            .collect();
        let frame: DriverFrame = [("LeftWrist", rotated(0.1, 1.0))].into_iter().collect();
        let set = RetargetEngine::default().apply(&doc, &skeleton(), &frame, 0.5);
        assert_eq!(set.updates[0].bone, "hand.L");
    }

    #[test]
    fn copy_location_remaps_axes() {
        let transfer = TransferParams {
            kind: TransferKind::CopyLocation,
            axis_remap: AxisRemap([SignedAxis::PosX, SignedAxis::NegZ, SignedAxis::PosY]),
            influence: 0.5,
            offset: [0.0, 0.0, 1.0],
            ..TransferParams::default()
        };
        let doc: MappingDocument = [("LeftWrist", MappingEntry::bound_to("hand.L").with_transfer(transfer))]
            .into_iter()
            .collect();
        let frame: DriverFrame = [("LeftWrist", rotated(0.0, 1.0))].into_iter().collect();
        let set = RetargetEngine::default().apply(&doc, &skeleton(), &frame, 0.5);
        let PoseChannel::Location(v) = set.updates[0].channel else {
            panic!("expected location");
        };
        assert_relative_eq!(v, Vector3::new(0.05, -0.15, 1.1), epsilon = 1e-6);
    }

    #[test]
    fn unsupported_kind_is_skipped_alone() {
        let mapping = MappingDocument::parse(
            r#"{
                "LeftWrist": {"target_bone": "hand.L", "transfer": {"kind": "copy_scale"}},
                "NoseTip": {"target_bone": "head"}
            }"#,
        )
        .expect("mapping");
        let frame: DriverFrame = [("LeftWrist", rotated(0.2, 1.0)), ("NoseTip", rotated(0.2, 1.0))]
            .into_iter()
            .collect();
        let set = RetargetEngine::default().apply(&mapping, &skeleton(), &frame, 0.5);
        assert_eq!(set.len(), 1);
        assert_eq!(set.updates[0].driver, "NoseTip");
        assert!(set.errors.is_empty());
        assert_eq!(set.skipped.len(), 1);
        assert_eq!(set.skipped[0].driver, "LeftWrist");
        assert_eq!(set.skipped[0].reason, SkipReason::UnsupportedKind);
    }

    #[test]
    fn distance_channel_uses_helper_rest_length() {
        let transfer = TransferParams {
            kind: TransferKind::ValueByDistance,
            distance_driver: Some("LeftThumbTip".into()),
            from_range: Some(ValueRange::new(0.0, 2.0)),
            to_range: Some(ValueRange::new(0.0, 1.0)),
            clamp: true,
            channel: Some(ValueChannel::Property("grip".into())),
            ..TransferParams::default()
        };
        let entry = MappingEntry::bound_to("hand.L")
            .with_other_bone("thumb.L")
            .with_transfer(transfer);
        let doc: MappingDocument = [("LeftIndexTip", entry)].into_iter().collect();

        // rest distance hand.L -> thumb.L is 0.1
        let frame: DriverFrame = [
            ("LeftIndexTip", DriverTransform::at(Vector3::new(0.0, 0.0, 0.0), 1.0)),
            ("LeftThumbTip", DriverTransform::at(Vector3::new(0.0, 0.1, 0.0), 1.0)),
        ]
        .into_iter()
        .collect();
        let g = skeleton();
        let engine = RetargetEngine::default();
        let set = engine.apply(&doc, &g, &frame, 0.5);
        let PoseChannel::Value { channel, value } = &set.updates[0].channel else {
            panic!("expected value");
        };
        assert_eq!(channel, &ValueChannel::Property("grip".into()));
        assert_relative_eq!(*value, 0.5, epsilon = 1e-5);

        let mut pose = SkeletonPose::new();
        set.apply_to(&mut pose);
        assert_relative_eq!(pose.get("hand.L").unwrap().properties["grip"], 0.5, epsilon = 1e-5);

        let weak: DriverFrame = [
            ("LeftIndexTip", DriverTransform::at(Vector3::zeros(), 1.0)),
            ("LeftThumbTip", DriverTransform::at(Vector3::zeros(), 0.1)),
        ]
        .into_iter()
        .collect();
        let set = engine.apply(&doc, &g, &weak, 0.5);
        assert_eq!(set.skipped[0].reason, SkipReason::DistanceDriverUnavailable);
        set.apply_to(&mut pose);
        assert_relative_eq!(pose.get("hand.L").unwrap().properties["grip"], 0.5, epsilon = 1e-5);
    }

    #[test]
    fn unknown_helper_is_reported() {
        let entry = MappingEntry::bound_to("hand.L")
            .with_other_bone("pinky.L")
            .with_transfer(TransferParams {
                kind: TransferKind::ValueByDistance,
                ..TransferParams::default()
            });
        let doc: MappingDocument = [("LeftIndexTip", entry)].into_iter().collect();
        let frame: DriverFrame = [("LeftIndexTip", rotated(0.0, 1.0))].into_iter().collect();
        let set = RetargetEngine::default().apply(&doc, &skeleton(), &frame, 0.5);
        assert!(matches!(set.errors[0], RetargetError::UnboundHelper { .. }));
    }

    #[test]
    fn results_do_not_depend_on_entry_order() {
        let a: MappingDocument = [
            ("NoseTip", MappingEntry::bound_to("head")),
            ("LeftWrist", MappingEntry::bound_to("hand.L")),
        ]
        .into_iter()
        .collect();
        let b: MappingDocument = [
            ("LeftWrist", MappingEntry::bound_to("hand.L")),
            ("NoseTip", MappingEntry::bound_to("head")),
        ]
        .into_iter()
        .collect();
        let frame: DriverFrame = [("NoseTip", rotated(0.3, 1.0)), ("LeftWrist", rotated(0.6, 1.0))]
            .into_iter()
            .collect();
        let g = skeleton();
        let engine = RetargetEngine::default();
        let (mut pa, mut pb) = (SkeletonPose::new(), SkeletonPose::new());
        engine.apply(&a, &g, &frame, 0.5).apply_to(&mut pa);
        engine.apply(&b, &g, &frame, 0.5).apply_to(&mut pb);
        assert_eq!(pa, pb);
    }
}
