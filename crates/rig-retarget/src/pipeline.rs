//! End-to-end helpers: mapping file in, checked bindings or replayed pose out.

use log::{info, warn};
use retarget_engine::{BoneResolver, SkeletonPose};
use retarget_live::{
    IntervalTimer, LandmarkRecording, LiveConfig, LiveError, LiveIoError, LiveScheduler,
    ManualTimer, ReplayFactory, RunSummary, TickTimer,
};
use retarget_mapping::{default_rules, MappingDocument, MappingError, MappingIoError};
use retarget_skeleton::{ScaffoldBuilder, ScaffoldError, SkeletonGraph, SkeletonIoError};
use serde::Serialize;
use std::{fs, path::Path};

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Mapping(#[from] MappingError),
    #[error(transparent)]
    MappingIo(#[from] MappingIoError),
    #[error(transparent)]
    SkeletonIo(#[from] SkeletonIoError),
    #[error(transparent)]
    Scaffold(#[from] ScaffoldError),
    #[error(transparent)]
    Live(#[from] LiveError),
    #[error(transparent)]
    LiveIo(#[from] LiveIoError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Skeleton to retarget onto: the exported rig at `skeleton_path` if given,
/// otherwise a scaffold built from the mapping.
///
/// A mapping without recognized bones yields the single-root fallback.
pub fn target_skeleton(
    mapping: &MappingDocument,
    skeleton_path: Option<&Path>,
) -> Result<SkeletonGraph, PipelineError> {
    if let Some(path) = skeleton_path {
        let skeleton = SkeletonGraph::load_json(path)?;
        info!("loaded skeleton with {} bones from {}", skeleton.len(), path.display());
        return Ok(skeleton);
    }
    let scaffold = ScaffoldBuilder::default().build_or_fallback(mapping)?;
    if scaffold.skeleton.len() == 1 {
        warn!("mapping references no recognized bones, using a bare root");
    }
    Ok(scaffold.skeleton)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EntryStatus {
    /// Target (and helper, if any) found; `bone` is the resolved name.
    Bound { bone: String },
    Unbound,
    /// A referenced bone is missing from the skeleton.
    Unresolvable { bone: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EntryCheck {
    pub driver: String,
    #[serde(flatten)]
    pub status: EntryStatus,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub entries: Vec<EntryCheck>,
    pub bound: usize,
    pub unbound: usize,
    pub unresolvable: usize,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.unresolvable == 0
    }
}

/// Resolve every entry of `mapping` against `skeleton`.
pub fn check_mapping(mapping: &MappingDocument, skeleton: &SkeletonGraph) -> CheckReport {
    let resolver = BoneResolver::new(skeleton, default_rules());
    let mut report = CheckReport::default();
    for (driver, entry) in mapping.iter() {
        let status = match entry.bound_target() {
            None => EntryStatus::Unbound,
            Some(target) => match resolver.resolve(target) {
                None => EntryStatus::Unresolvable {
                    bone: target.to_string(),
                },
                Some(bone) => match entry.bound_other() {
                    Some(other) if resolver.resolve(other).is_none() => {
                        EntryStatus::Unresolvable {
                            bone: other.to_string(),
                        }
                    }
                    _ => EntryStatus::Bound {
                        bone: bone.to_string(),
                    },
                },
            },
        };
        match status {
            EntryStatus::Bound { .. } => report.bound += 1,
            EntryStatus::Unbound => report.unbound += 1,
            EntryStatus::Unresolvable { .. } => report.unresolvable += 1,
        }
        report.entries.push(EntryCheck {
            driver: driver.to_string(),
            status,
        });
    }
    report
}

#[derive(Clone, Debug)]
pub struct ReplayOutput {
    /// Pose after the last application.
    pub pose: SkeletonPose,
    pub summary: RunSummary,
}

/// Run a recording through the live scheduler until it is exhausted.
///
/// With `realtime` ticks are paced by the configured interval; otherwise they
/// run back to back.
pub fn replay(
    mapping: MappingDocument,
    skeleton: SkeletonGraph,
    recording: LandmarkRecording,
    config: &LiveConfig,
    realtime: bool,
) -> Result<ReplayOutput, PipelineError> {
    if realtime {
        replay_with(mapping, skeleton, recording, config, IntervalTimer::new())
    } else {
        replay_with(mapping, skeleton, recording, config, ManualTimer::new())
    }
}

fn replay_with<T: TickTimer>(
    mapping: MappingDocument,
    skeleton: SkeletonGraph,
    recording: LandmarkRecording,
    config: &LiveConfig,
    timer: T,
) -> Result<ReplayOutput, PipelineError> {
    let pose = SkeletonPose::rest(&skeleton);
    let mut live = LiveScheduler::new(mapping, skeleton, ReplayFactory::new(recording), timer, pose);
    live.start(config)?;
    let summary = live.run();
    Ok(ReplayOutput {
        pose: live.into_sink(),
        summary,
    })
}

/// Write any serializable value as pretty JSON.
pub fn write_json<T: Serialize + ?Sized>(value: &T, path: impl AsRef<Path>) -> Result<(), PipelineError> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}
