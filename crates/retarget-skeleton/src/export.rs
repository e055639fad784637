//! Plain bone-list view of a skeleton, independent of any scene format.

use crate::{SkeletonError, SkeletonGraph};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

#[derive(thiserror::Error, Debug)]
pub enum SkeletonIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Skeleton(#[from] SkeletonError),
}

/// One exported bone.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoneRecord {
    pub name: String,
    pub head: [f32; 3],
    pub tail: [f32; 3],
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub connected: bool,
}

/// Serializable bone list.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SkeletonExport {
    pub bones: Vec<BoneRecord>,
}

impl SkeletonExport {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, SkeletonIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), SkeletonIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

fn arr(v: Vector3<f32>) -> [f32; 3] {
    [v.x, v.y, v.z]
}

impl SkeletonGraph {
    /// Export all bones in traversal order (parents before children).
    pub fn export(&self) -> SkeletonExport {
        let bones = self
            .walk()
            .into_iter()
            .map(|id| self.bone(id))
            .map(|b| BoneRecord {
                name: b.name().to_string(),
                head: arr(b.head()),
                tail: arr(b.tail()),
                parent: b.parent().map(|p| self.bone(p).name().to_string()),
                connected: b.is_connected(),
            })
            .collect();
        SkeletonExport { bones }
    }

    /// Rebuild a graph from a bone list in any order.
    ///
    /// Bones are inserted once their parent exists, keeping the list order
    /// otherwise. Fails on duplicate names, a second root, or a parent that
    /// never appears (which also covers parent cycles). Connected flags are
    /// restored as stored; head positions are not re-derived.
    pub fn from_export(export: &SkeletonExport) -> Result<Self, SkeletonError> {
        if export.bones.is_empty() {
            return Err(SkeletonError::Empty);
        }
        let mut graph = SkeletonGraph::new();
        let mut pending: Vec<&BoneRecord> = export.bones.iter().collect();
        while !pending.is_empty() {
            let before = pending.len();
            let mut rest = Vec::with_capacity(before);
            for rec in pending {
                let ready = match rec.parent.as_deref() {
                    None => true,
                    Some(p) => graph.contains(p),
                };
                if !ready {
                    rest.push(rec);
                    continue;
                }
                let id = graph.add_bone(
                    rec.name.clone(),
                    Vector3::from(rec.head),
                    Vector3::from(rec.tail),
                    rec.parent.as_deref(),
                )?;
                graph.set_connected(id, rec.connected);
            }
            if rest.len() == before {
                let orphan = rest[0].parent.clone().unwrap_or_default();
                return Err(SkeletonError::MissingBone { name: orphan });
            }
            pending = rest;
        }
        Ok(graph)
    }

    /// Load an exported bone list and rebuild the graph.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, SkeletonIoError> {
        let export = SkeletonExport::load_json(path)?;
        Ok(Self::from_export(&export)?)
    }

    /// Export and write as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), SkeletonIoError> {
        self.export().write_json(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> SkeletonGraph {
        let mut g = SkeletonGraph::new();
        g.add_bone("root", Vector3::zeros(), Vector3::new(0.0, 0.0, 0.1), None)
            .unwrap();
        g.add_bone(
            "torso",
            Vector3::new(0.0, 0.0, 0.5),
            Vector3::new(0.0, 0.0, 1.0),
            Some("root"),
        )
        .unwrap();
        g.connect_chain(&["root", "torso"]);
        g
    }

    #[test]
    fn export_lists_parents_by_name() {
        let export = small().export();
        assert_eq!(export.bones.len(), 2);
        assert_eq!(export.bones[0].parent, None);
        assert_eq!(export.bones[1].parent.as_deref(), Some("root"));
        assert_eq!(export.bones[1].head, [0.0, 0.0, 0.1]);
        assert!(export.bones[1].connected);
    }

    #[test]
    fn json_file_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("skeleton.json");
        let g = small();
        g.write_json(&path).expect("write");
        let loaded = SkeletonGraph::load_json(&path).expect("load");
        assert_eq!(loaded, g);
    }

    #[test]
    fn from_export_accepts_any_order() {
        let g = small();
        let mut export = g.export();
        export.bones.reverse();
        let rebuilt = SkeletonGraph::from_export(&export).expect("rebuild");
        assert_eq!(rebuilt, g);
    }

    #[test]
    fn from_export_rejects_invalid_lists() {
        let mut export = small().export();
        export.bones[1].parent = Some("pelvis".into());
        assert_eq!(
            SkeletonGraph::from_export(&export),
            Err(SkeletonError::MissingBone { name: "pelvis".into() })
        );

        let mut export = small().export();
        export.bones[1].parent = None;
        assert!(matches!(
            SkeletonGraph::from_export(&export),
            Err(SkeletonError::MultipleRoots { .. })
        ));

        let mut export = small().export();
        export.bones[1].name = "root".into();
        assert!(matches!(
            SkeletonGraph::from_export(&export),
            Err(SkeletonError::DuplicateName { .. })
        ));

        assert_eq!(
            SkeletonGraph::from_export(&SkeletonExport::default()),
            Err(SkeletonError::Empty)
        );
    }
}
