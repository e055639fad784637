//! Live retargeting loop.
//!
//! A [`LiveScheduler`] owns a mapping, a target skeleton and a [`PoseSink`].
//! Once started it pulls one landmark set per tick from a [`Detector`], turns
//! it into a driver frame with a [`ProcessingChain`] and runs the retargeting
//! engine on the first tick and then every `refresh_interval` ticks. The
//! session ends when the detector runs dry, on [`LiveScheduler::stop`] or when
//! a [`CancelToken`] fires.
//!
//! ```
//! use retarget_core::{Landmark, LandmarkSet};
//! use retarget_engine::SkeletonPose;
//! use retarget_live::{LandmarkRecording, LiveConfig, LiveScheduler, ManualTimer, ReplayFactory};
//! use retarget_mapping::MappingDocument;
//! use retarget_skeleton::build_scaffold;
//!
//! let mapping = MappingDocument::parse(r#"{"NoseTip": {"target_bone": "head"}}"#).unwrap();
//! let skeleton = build_scaffold(&mapping).unwrap().skeleton;
//! let mut set = LandmarkSet::new();
//! set.insert("NoseTip", Landmark::new([0.0, 0.0, 1.0], 0.9));
//! let recording = LandmarkRecording::new(vec![set; 4]);
//!
//! let pose = SkeletonPose::rest(&skeleton);
//! let mut live = LiveScheduler::new(mapping, skeleton, ReplayFactory::new(recording), ManualTimer::new(), pose);
//! live.start(&LiveConfig::default()).unwrap();
//! let summary = live.run();
//! assert_eq!(summary.ticks, 5);
//! assert_eq!(summary.applications, 1);
//! ```
//!
//! [`PoseSink`]: retarget_engine::PoseSink

mod cancel;
mod chain;
mod config;
mod detector;
mod error;
mod scheduler;
mod state;
mod timer;

pub use cancel::CancelToken;
pub use chain::{ChainBuilder, LandmarkChain, ProcessingChain};
pub use config::{Backend, DetectType, LiveConfig, LiveIoError, StreamDim};
pub use detector::{Detector, DetectorFactory, LandmarkRecording, ReplayDetector, ReplayFactory};
pub use error::{BoxError, LiveError};
pub use scheduler::{DefaultChainBuilder, LiveScheduler, RunSummary, StopReason, TickOutcome};
pub use state::{LiveSessionState, SchedulerState};
pub use timer::{IntervalTimer, ManualTimer, TickTimer};
