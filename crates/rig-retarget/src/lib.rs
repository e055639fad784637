//! High-level facade crate for the `retarget-*` workspace.
//!
//! This crate provides:
//! - stable re-exports of the underlying crates
//! - end-to-end helpers in [`pipeline`] that load a mapping, pick a target
//!   skeleton, check bindings and replay recorded landmarks through the live
//!   scheduler
//! - (feature `cli`) the `rig-retarget` command-line tool
//!
//! ## Quickstart
//!
//! ```
//! use rig_retarget::mapping::MappingDocument;
//! use rig_retarget::pipeline;
//!
//! let mapping = MappingDocument::parse(
//!     r#"{"NoseTip": {"target_bone": "head"}, "Blink": {"target_bone": "NONE"}}"#,
//! )?;
//! let skeleton = pipeline::target_skeleton(&mapping, None)?;
//! let report = pipeline::check_mapping(&mapping, &skeleton);
//! assert_eq!(report.bound, 1);
//! assert_eq!(report.unbound, 1);
//! assert!(report.is_clean());
//! # Ok::<(), rig_retarget::pipeline::PipelineError>(())
//! ```
//!
//! ## API map
//! - `rig_retarget::core`: driver transforms, landmarks, logger.
//! - `rig_retarget::mapping`: mapping documents, bone-name resolution,
//!   transfer parameters.
//! - `rig_retarget::skeleton`: skeleton graph, export/import, synthetic
//!   scaffold builder.
//! - `rig_retarget::engine`: retargeting engine and pose sinks.
//! - `rig_retarget::live`: live scheduler, processing chain, replay.

pub use retarget_core as core;
pub use retarget_engine as engine;
pub use retarget_live as live;
pub use retarget_mapping as mapping;
pub use retarget_skeleton as skeleton;

pub use retarget_engine::{RetargetEngine, SkeletonPose};
pub use retarget_live::{LiveConfig, LiveScheduler};
pub use retarget_mapping::MappingDocument;
pub use retarget_skeleton::SkeletonGraph;

pub mod pipeline;
