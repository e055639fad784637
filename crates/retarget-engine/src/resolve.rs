use log::debug;
use retarget_mapping::{NameRules, Side};
use retarget_skeleton::SkeletonGraph;
use std::collections::HashMap;

/// Maps mapping-file bone names onto bones of one skeleton.
///
/// Exact names win. Otherwise the name is normalized and matched on
/// `(base, side)`, so `DEF-hand.L` finds `hand_L`; a left bone never
/// resolves to a right one. Ties go to the bone inserted first.
#[derive(Debug)]
pub struct BoneResolver<'a> {
    skeleton: &'a SkeletonGraph,
    rules: &'a NameRules,
    by_base: HashMap<(String, Option<Side>), &'a str>,
}

impl<'a> BoneResolver<'a> {
    pub fn new(skeleton: &'a SkeletonGraph, rules: &'a NameRules) -> Self {
        let mut by_base = HashMap::new();
        for name in skeleton.names() {
            let r = rules.resolve(name);
            by_base.entry((r.base, r.side)).or_insert(name);
        }
        Self {
            skeleton,
            rules,
            by_base,
        }
    }

    /// Skeleton bone name for `name`, if any.
    pub fn resolve(&self, name: &str) -> Option<&'a str> {
        if let Some(bone) = self.skeleton.get(name) {
            return Some(bone.name());
        }
        let r = self.rules.resolve(name);
        let found = self.by_base.get(&(r.base, r.side)).copied();
        if let Some(bone) = found {
            debug!("resolved `{name}` to `{bone}` by base name");
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn skeleton() -> SkeletonGraph {
        let mut g = SkeletonGraph::new();
        let z = Vector3::zeros();
        let up = Vector3::z();
        g.add_bone("root", z, up, None).unwrap();
        g.add_bone("hand_L", z, up, Some("root")).unwrap();
        g.add_bone("ORG-hand.R", z, up, Some("root")).unwrap();
        g.add_bone("DEF-head", z, up, Some("root")).unwrap();
        g.add_bone("head", z, up, Some("root")).unwrap();
        g
    }

    #[test]
    fn exact_then_normalized() {
        let g = skeleton();
        let rules = NameRules::default();
        let r = BoneResolver::new(&g, &rules);
        assert_eq!(r.resolve("head"), Some("head"));
        assert_eq!(r.resolve("CTRL-head"), Some("DEF-head"));
        assert_eq!(r.resolve("DEF-hand.L"), Some("hand_L"));
        assert_eq!(r.resolve("hand.R"), Some("ORG-hand.R"));
    }

    #[test]
    fn never_crosses_sides() {
        let mut g = SkeletonGraph::new();
        g.add_bone("root", Vector3::zeros(), Vector3::z(), None).unwrap();
        g.add_bone("foot.L", Vector3::zeros(), Vector3::z(), Some("root")).unwrap();
        let rules = NameRules::default();
        let r = BoneResolver::new(&g, &rules);
        assert_eq!(r.resolve("foot.R"), None);
        assert_eq!(r.resolve("foot"), None);
        assert_eq!(r.resolve("MCH-foot_L"), Some("foot.L"));
    }
}
