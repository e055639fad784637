//! Mapping model for driver-to-bone retargeting.
//!
//! A mapping document binds driver names (one per tracked landmark) to bones
//! of a target skeleton. The crate covers:
//! - parsing mapping JSON, including the older nested `cgt_props` layout,
//! - bone-name normalization (`DEF-`/`ORG-`/`MCH-`/`CTRL-` prefixes and
//!   `.L`/`.R`/`_L`/`_R` side suffixes),
//! - typed transfer parameters (axis remaps, value ranges, distance channels).
//!
//! ## Quickstart
//!
//! ```
//! use retarget_mapping::{resolve, MappingDocument, Side};
//!
//! let doc = MappingDocument::parse(r#"{"LeftWrist": {"target_bone": "DEF-hand.L"}}"#).unwrap();
//! let entry = doc.get("LeftWrist").unwrap();
//! let name = resolve(entry.bound_target().unwrap());
//! assert_eq!(name.base, "hand");
//! assert_eq!(name.side, Some(Side::L));
//! ```
//!
//! Unknown fields of an entry are kept and written back on save so authoring
//! tools can attach their own data.

mod document;
mod entry;
mod error;
mod io;
mod names;
mod transfer;

pub use document::MappingDocument;
pub use entry::{MappingEntry, UNBOUND_BONE};
pub use error::MappingError;
pub use io::MappingIoError;
pub use names::{default_rules, resolve, NameRules, ResolvedName, Side};
pub use transfer::{
    remap_value, Axis, AxisRemap, SignedAxis, TransferKind, TransferParams, ValueChannel,
    ValueRange,
};
