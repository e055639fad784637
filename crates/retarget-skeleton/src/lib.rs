//! Bone hierarchies for retargeting.
//!
//! [`SkeletonGraph`] is an arena-backed bone tree with name lookup,
//! deterministic traversal and best-effort chain connection. The
//! [`scaffold`] module synthesizes a humanoid skeleton from a mapping
//! document so mappings can be validated and exercised without an authored
//! rig.
//!
//! ```
//! use retarget_mapping::MappingDocument;
//! use retarget_skeleton::build_scaffold;
//!
//! let doc = MappingDocument::parse(r#"{"LeftWrist": {"target_bone": "hand.L"}}"#).unwrap();
//! let scaffold = build_scaffold(&doc).unwrap();
//! let chain = scaffold.skeleton.chain_to_root("hand.L").unwrap();
//! assert_eq!(chain.last(), Some(&"root"));
//! ```

mod error;
mod export;
mod graph;
pub mod scaffold;

pub use error::SkeletonError;
pub use export::{BoneRecord, SkeletonExport, SkeletonIoError};
pub use graph::{Bone, BoneId, SkeletonGraph, MIN_BONE_LENGTH};
pub use scaffold::{
    build_scaffold, fallback_skeleton, scatter_position, Scaffold, ScaffoldBuilder, ScaffoldError,
    ScaffoldReport, ScaffoldRules,
};
