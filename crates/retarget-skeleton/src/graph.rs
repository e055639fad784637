use crate::error::SkeletonError;
use log::warn;
use nalgebra::Vector3;
use std::collections::HashMap;

/// Z offset given to a tail that would otherwise sit on its head.
pub const MIN_BONE_LENGTH: f32 = 0.05;

const DEGENERATE_LEN: f32 = 1e-6;

/// Index of a bone inside its [`SkeletonGraph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoneId(usize);

impl BoneId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A bone in rest pose.
#[derive(Clone, Debug, PartialEq)]
pub struct Bone {
    name: String,
    head: Vector3<f32>,
    tail: Vector3<f32>,
    parent: Option<BoneId>,
    children: Vec<BoneId>,
    connected: bool,
}

impl Bone {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn head(&self) -> Vector3<f32> {
        self.head
    }

    #[inline]
    pub fn tail(&self) -> Vector3<f32> {
        self.tail
    }

    /// Back-reference to the parent; `None` only for the root.
    #[inline]
    pub fn parent(&self) -> Option<BoneId> {
        self.parent
    }

    /// Children in insertion order.
    #[inline]
    pub fn children(&self) -> &[BoneId] {
        &self.children
    }

    /// True if the head is pinned to the parent's tail.
    #[inline]
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn length(&self) -> f32 {
        (self.tail - self.head).norm()
    }
}

/// Rooted bone tree.
///
/// Bones live in a flat arena and refer to each other by [`BoneId`]; parents
/// are back-references only. A bone can only be added under an existing
/// parent, so the graph is acyclic by construction and the first bone is
/// always the root.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SkeletonGraph {
    bones: Vec<Bone>,
    by_name: HashMap<String, BoneId>,
}

impl SkeletonGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a bone under `parent` (or as the root when `parent` is `None`).
    ///
    /// Nothing is modified when an error is returned.
    pub fn add_bone(
        &mut self,
        name: impl Into<String>,
        head: Vector3<f32>,
        tail: Vector3<f32>,
        parent: Option<&str>,
    ) -> Result<BoneId, SkeletonError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(SkeletonError::DuplicateName { name });
        }
        let parent_id = match parent {
            Some(p) => Some(self.id(p).ok_or_else(|| SkeletonError::MissingBone {
                name: p.to_string(),
            })?),
            None => {
                if let Some(root) = self.root() {
                    return Err(SkeletonError::MultipleRoots {
                        name,
                        root: self.bones[root.0].name.clone(),
                    });
                }
                None
            }
        };

        let id = BoneId(self.bones.len());
        if let Some(p) = parent_id {
            self.bones[p.0].children.push(id);
        }
        self.by_name.insert(name.clone(), id);
        self.bones.push(Bone {
            name,
            head,
            tail,
            parent: parent_id,
            children: Vec::new(),
            connected: false,
        });
        Ok(id)
    }

    /// Pin each bone's head to the tail of the previous bone in `names`.
    ///
    /// Best effort: a link whose bones are missing, or where the second bone
    /// is not a direct child of the first, is skipped and reported. Bones that
    /// collapse to zero length get their tail pushed up by [`MIN_BONE_LENGTH`].
    pub fn connect_chain(&mut self, names: &[&str]) -> Vec<SkeletonError> {
        let mut errors = Vec::new();
        for pair in names.windows(2) {
            let (parent_name, child_name) = (pair[0], pair[1]);
            let (Some(parent), Some(child)) = (self.id(parent_name), self.id(child_name)) else {
                let missing = if self.contains(parent_name) {
                    child_name
                } else {
                    parent_name
                };
                warn!("connect_chain: skipping {parent_name} -> {child_name}, `{missing}` not found");
                errors.push(SkeletonError::MissingBone {
                    name: missing.to_string(),
                });
                continue;
            };
            if self.bones[child.0].parent != Some(parent) {
                warn!("connect_chain: `{child_name}` is not a child of `{parent_name}`");
                errors.push(SkeletonError::NotChild {
                    parent: parent_name.to_string(),
                    child: child_name.to_string(),
                });
                continue;
            }

            let anchor = self.bones[parent.0].tail;
            let bone = &mut self.bones[child.0];
            bone.head = anchor;
            bone.connected = true;
            if (bone.tail - bone.head).norm() < DEGENERATE_LEN {
                bone.tail = bone.head + Vector3::z() * MIN_BONE_LENGTH;
            }
        }
        errors
    }

    pub(crate) fn set_connected(&mut self, id: BoneId, connected: bool) {
        self.bones[id.0].connected = connected;
    }

    #[inline]
    pub fn id(&self, name: &str) -> Option<BoneId> {
        self.by_name.get(name).copied()
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    #[inline]
    pub fn bone(&self, id: BoneId) -> &Bone {
        &self.bones[id.0]
    }

    pub fn get(&self, name: &str) -> Option<&Bone> {
        self.id(name).map(|id| &self.bones[id.0])
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// The root bone, `None` for an empty graph.
    pub fn root(&self) -> Option<BoneId> {
        (!self.bones.is_empty()).then_some(BoneId(0))
    }

    /// Bones in insertion order.
    pub fn bones(&self) -> impl Iterator<Item = &Bone> {
        self.bones.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bones.iter().map(|b| b.name.as_str())
    }

    pub fn parent_of(&self, name: &str) -> Option<&Bone> {
        self.get(name)
            .and_then(|b| b.parent)
            .map(|p| &self.bones[p.0])
    }

    /// Depth-first pre-order walk from the root; children in insertion order.
    pub fn walk(&self) -> Vec<BoneId> {
        let mut order = Vec::with_capacity(self.bones.len());
        let mut stack: Vec<BoneId> = self.root().into_iter().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.bones[id.0].children.iter().rev().copied());
        }
        order
    }

    /// Parent, grandparent, ... up to and including the root.
    pub fn ancestors(&self, id: BoneId) -> impl Iterator<Item = BoneId> + '_ {
        std::iter::successors(self.bones[id.0].parent, |p| self.bones[p.0].parent)
    }

    /// Names from `name` up to the root, `name` first.
    pub fn chain_to_root(&self, name: &str) -> Option<Vec<&str>> {
        let id = self.id(name)?;
        Some(
            std::iter::once(id)
                .chain(self.ancestors(id))
                .map(|b| self.bones[b.0].name.as_str())
                .collect(),
        )
    }

    pub fn depth(&self, id: BoneId) -> usize {
        self.ancestors(id).count()
    }

    /// Distance between the heads of two bones.
    pub fn head_distance(&self, a: &str, b: &str) -> Option<f32> {
        Some((self.get(a)?.head - self.get(b)?.head).norm())
    }

    /// Check the tree invariants: one root, unique names, consistent links.
    pub fn validate(&self) -> Result<(), SkeletonError> {
        if self.bones.is_empty() {
            return Err(SkeletonError::Empty);
        }
        let mut roots = self.bones.iter().filter(|b| b.parent.is_none());
        if let (Some(first), Some(second)) = (roots.next(), roots.next()) {
            return Err(SkeletonError::MultipleRoots {
                name: second.name.clone(),
                root: first.name.clone(),
            });
        }
        if self.by_name.len() != self.bones.len() {
            let mut seen = std::collections::HashSet::new();
            if let Some(dup) = self.bones.iter().find(|b| !seen.insert(b.name.as_str())) {
                return Err(SkeletonError::DuplicateName {
                    name: dup.name.clone(),
                });
            }
        }
        for (i, bone) in self.bones.iter().enumerate() {
            for &c in &bone.children {
                if self.bones[c.0].parent != Some(BoneId(i)) {
                    return Err(SkeletonError::NotChild {
                        parent: bone.name.clone(),
                        child: self.bones[c.0].name.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn v(x: f32, y: f32, z: f32) -> Vector3<f32> {
        Vector3::new(x, y, z)
    }

    fn spine() -> SkeletonGraph {
        let mut g = SkeletonGraph::new();
        g.add_bone("root", v(0.0, 0.0, 0.0), v(0.0, 0.0, 0.1), None).unwrap();
        g.add_bone("torso", v(0.0, 0.0, 0.1), v(0.0, 0.0, 1.0), Some("root")).unwrap();
        g.add_bone("chest", v(0.0, 0.0, 1.0), v(0.0, 0.0, 1.3), Some("torso")).unwrap();
        g.add_bone("arm.L", v(0.2, 0.0, 1.2), v(0.5, 0.0, 1.2), Some("chest")).unwrap();
        g.add_bone("head", v(0.0, 0.0, 1.35), v(0.0, 0.0, 1.6), Some("chest")).unwrap();
        g
    }

    #[test]
    fn duplicate_name_is_rejected_without_mutation() {
        let mut g = spine();
        let before = g.clone();
        let err = g
            .add_bone("chest", Vector3::zeros(), Vector3::z(), Some("root"))
            .unwrap_err();
        assert_eq!(err, SkeletonError::DuplicateName { name: "chest".into() });
        assert_eq!(g, before);
    }

    #[test]
    fn second_root_and_missing_parent_are_rejected() {
        let mut g = spine();
        assert!(matches!(
            g.add_bone("floating", Vector3::zeros(), Vector3::z(), None),
            Err(SkeletonError::MultipleRoots { .. })
        ));
        assert!(matches!(
            g.add_bone("finger", Vector3::zeros(), Vector3::z(), Some("hand")),
            Err(SkeletonError::MissingBone { ref name }) if name == "hand"
        ));
        assert!(g.validate().is_ok());
    }

    #[test]
    fn walk_is_preorder_in_insertion_order() {
        let g = spine();
        let names: Vec<&str> = g.walk().into_iter().map(|id| g.bone(id).name()).collect();
        assert_eq!(names, ["root", "torso", "chest", "arm.L", "head"]);
    }

    #[test]
    fn chain_to_root_ends_at_root() {
        let g = spine();
        assert_eq!(
            g.chain_to_root("arm.L").unwrap(),
            ["arm.L", "chest", "torso", "root"]
        );
        assert_eq!(g.depth(g.id("head").unwrap()), 3);
        assert!(g.chain_to_root("nope").is_none());
    }

    #[test]
    fn connect_chain_pins_heads() {
        let mut g = spine();
        let errors = g.connect_chain(&["root", "torso", "chest", "head"]);
        assert!(errors.is_empty());
        let head = g.get("head").unwrap();
        assert!(head.is_connected());
        assert_relative_eq!(head.head(), v(0.0, 0.0, 1.3));
        assert_relative_eq!(g.get("torso").unwrap().head(), v(0.0, 0.0, 0.1));
    }

    #[test]
    fn connect_chain_skips_missing_and_unrelated_links() {
        let mut g = spine();
        let errors = g.connect_chain(&["root", "spine", "chest", "head", "arm.L"]);
        assert_eq!(
            errors,
            [
                SkeletonError::MissingBone { name: "spine".into() },
                SkeletonError::MissingBone { name: "spine".into() },
                SkeletonError::NotChild {
                    parent: "head".into(),
                    child: "arm.L".into()
                },
            ]
        );
        assert!(g.get("head").unwrap().is_connected());
        assert!(!g.get("arm.L").unwrap().is_connected());
    }

    #[test]
    fn connect_chain_fixes_zero_length_bones() {
        let mut g = SkeletonGraph::new();
        g.add_bone("a", v(0.0, 0.0, 0.0), v(0.0, 0.0, 1.0), None).unwrap();
        g.add_bone("b", v(5.0, 0.0, 0.0), v(0.0, 0.0, 1.0), Some("a")).unwrap();
        g.connect_chain(&["a", "b"]);
        let b = g.get("b").unwrap();
        assert_relative_eq!(b.head(), v(0.0, 0.0, 1.0));
        assert_relative_eq!(b.tail(), v(0.0, 0.0, 1.05), epsilon = 1e-6);
    }

    #[test]
    fn empty_graph_fails_validation() {
        assert_eq!(SkeletonGraph::new().validate(), Err(SkeletonError::Empty));
        assert!(SkeletonGraph::new().walk().is_empty());
    }
}
