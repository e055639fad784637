//! Retargeting engine.
//!
//! [`RetargetEngine::apply`] walks a [`retarget_mapping::MappingDocument`],
//! gates each driver on confidence, resolves the bound bone against a
//! [`retarget_skeleton::SkeletonGraph`] and returns a [`PoseUpdateSet`]. It
//! never writes to a skeleton itself; push the result into any [`PoseSink`]
//! (for example [`SkeletonPose`]) when you are ready.
//!
//! ```
//! use nalgebra::Vector3;
//! use retarget_core::{DriverFrame, DriverTransform};
//! use retarget_engine::{RetargetEngine, SkeletonPose};
//! use retarget_mapping::MappingDocument;
//! use retarget_skeleton::build_scaffold;
//!
//! let mapping = MappingDocument::parse(r#"{"NoseTip": {"target_bone": "head"}}"#).unwrap();
//! let skeleton = build_scaffold(&mapping).unwrap().skeleton;
//! let frame: DriverFrame = [("NoseTip", DriverTransform::at(Vector3::zeros(), 0.9))]
//!     .into_iter()
//!     .collect();
//!
//! let updates = RetargetEngine::default().apply(&mapping, &skeleton, &frame, 0.7);
//! let mut pose = SkeletonPose::rest(&skeleton);
//! updates.apply_to(&mut pose);
//! assert_eq!(updates.len(), 1);
//! ```

mod engine;
mod error;
mod pose;
mod resolve;
mod update;

pub use engine::RetargetEngine;
pub use error::RetargetError;
pub use pose::{BonePose, PoseSink, SkeletonPose};
pub use resolve::BoneResolver;
pub use update::{PoseChannel, PoseUpdate, PoseUpdateSet, SkipReason, SkippedEntry};
