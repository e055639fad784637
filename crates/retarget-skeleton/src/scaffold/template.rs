//! Baseline humanoid in a rough T-pose.
//!
//! Rig space: +X is the character's left, +Y forward, +Z up, feet at z = 0.

use nalgebra::Vector3;
use retarget_mapping::Side;

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct BoneSpec {
    pub name: String,
    pub head: Vector3<f32>,
    pub tail: Vector3<f32>,
    pub parent: Option<String>,
}

#[derive(Default)]
struct Spec(Vec<BoneSpec>);

impl Spec {
    fn add(&mut self, name: String, head: [f32; 3], tail: [f32; 3], parent: Option<String>) {
        self.0.push(BoneSpec {
            name,
            head: Vector3::from(head),
            tail: Vector3::from(tail),
            parent,
        });
    }
}

fn offset(p: [f32; 3], dx: f32, dy: f32, dz: f32) -> [f32; 3] {
    [p[0] + dx, p[1] + dy, p[2] + dz]
}

fn arm(spec: &mut Spec, side: Side) {
    let shoulder = [side.place_x(0.2), 0.0, 1.25];
    let elbow = [side.place_x(0.5), 0.05, 1.05];
    let wrist = [side.place_x(0.65), 0.1, 0.95];
    let n = |base: &str| format!("{base}.{side}");

    spec.add(n("upper_arm_fk"), shoulder, offset(shoulder, 0.0, 0.0, 0.15), Some("chest".into()));
    spec.add(n("forearm_fk"), elbow, offset(elbow, 0.0, 0.0, -0.1), Some(n("upper_arm_fk")));
    spec.add(n("forearm_tweak"), elbow, offset(elbow, 0.0, 0.0, -0.1), Some(n("forearm_fk")));
    spec.add(n("hand_ik"), wrist, offset(wrist, 0.0, 0.0, -0.05), Some(n("forearm_fk")));
    spec.add(n("hand"), wrist, offset(wrist, 0.0, 0.0, -0.05), Some(n("forearm_fk")));
}

fn leg(spec: &mut Spec, side: Side) {
    let x = side.place_x(0.12);
    let hip = [x, 0.0, 1.0];
    let knee = [x, 0.05, 0.5];
    let ankle = [x, 0.12, 0.1];
    let toe = [x, 0.25, 0.05];
    let heel = offset(ankle, 0.0, -0.05, 0.0);
    let n = |base: &str| format!("{base}.{side}");

    spec.add(n("thigh_fk"), hip, offset(hip, 0.0, 0.0, -0.2), Some("torso".into()));
    spec.add(n("shin_fk"), knee, offset(knee, 0.0, 0.0, -0.2), Some(n("thigh_fk")));
    spec.add(n("shin_tweak"), knee, offset(knee, 0.0, 0.0, -0.1), Some(n("shin_fk")));
    spec.add(n("foot_ik"), ankle, offset(ankle, 0.0, 0.0, -0.05), Some(n("shin_fk")));
    spec.add(n("foot_spin_ik"), ankle, offset(ankle, 0.0, 0.05, 0.0), Some(n("foot_ik")));
    spec.add(n("heel"), heel, offset(heel, 0.0, 0.0, 0.05), Some(n("foot_ik")));
    spec.add(n("toe"), toe, offset(toe, 0.0, 0.05, 0.0), Some(n("foot_ik")));
    spec.add(n("toe_spin"), toe, offset(toe, 0.0, 0.05, 0.02), Some(n("foot_ik")));
}

/// Template bones, parents first.
pub(crate) fn humanoid() -> Vec<BoneSpec> {
    let mut spec = Spec::default();
    spec.add("root".into(), [0.0, 0.0, 0.0], [0.0, 0.05, 0.1], None);
    spec.add("torso".into(), [0.0, 0.0, 0.1], [0.0, 0.0, 1.0], Some("root".into()));
    spec.add("chest".into(), [0.0, 0.0, 1.0], [0.0, 0.0, 1.3], Some("torso".into()));
    spec.add("head".into(), [0.0, 0.0, 1.3], [0.0, 0.0, 1.6], Some("chest".into()));
    for side in [Side::L, Side::R] {
        arm(&mut spec, side);
    }
    for side in [Side::L, Side::R] {
        leg(&mut spec, side);
    }
    spec.0
}

/// Chains whose heads are pinned to their parents' tails.
pub(crate) fn chains() -> Vec<Vec<String>> {
    let mut out = vec![vec![
        "root".to_string(),
        "torso".into(),
        "chest".into(),
        "head".into(),
    ]];
    for side in [Side::L, Side::R] {
        out.push(vec![
            format!("upper_arm_fk.{side}"),
            format!("forearm_fk.{side}"),
            format!("hand_ik.{side}"),
        ]);
        out.push(vec![
            "torso".to_string(),
            format!("thigh_fk.{side}"),
            format!("shin_fk.{side}"),
            format!("foot_ik.{side}"),
        ]);
    }
    out
}
