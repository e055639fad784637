//! Core types shared by the `retarget-*` crates.
//!
//! This crate is intentionally small. It describes what a detector hands to
//! the pipeline (named [`Landmark`]s grouped in a [`LandmarkSet`]) and what the
//! retargeting engine consumes (a [`DriverFrame`] of [`DriverTransform`]s). It
//! does *not* know about mapping files, skeletons or any host application.

mod driver;
mod landmark;
mod logger;

pub use driver::{DriverFrame, DriverTransform};
pub use landmark::{Landmark, LandmarkGroup, LandmarkSet};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, level_from_verbosity};
