use crate::SkeletonIoError;
use retarget_mapping::{NameRules, Side};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Parent choice for a bone whose base name contains one of `keywords`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRule {
    pub keywords: Vec<String>,
    /// Base name of the parent for sided bones; `.L`/`.R` is appended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sided_parent: Option<String>,
    /// Parent for unsided bones, or for all bones if `sided_parent` is unset.
    pub parent: String,
}

impl ParentRule {
    fn new(keywords: &[&str], sided_parent: Option<&str>, parent: &str) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            sided_parent: sided_parent.map(str::to_string),
            parent: parent.to_string(),
        }
    }

    fn matches(&self, base: &str) -> bool {
        self.keywords.iter().any(|k| !k.is_empty() && base.contains(k.as_str()))
    }

    fn parent_for(&self, side: Option<Side>) -> String {
        match (&self.sided_parent, side) {
            (Some(p), Some(side)) => format!("{p}.{side}"),
            _ => self.parent.clone(),
        }
    }
}

/// Golden-angle spiral used to place bones the template does not cover.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterParams {
    /// Radius of the first point; point `i` sits at `radius * sqrt(i + 1)`.
    pub radius: f32,
    /// Height of every scattered head.
    pub z: f32,
    /// Tail offset along +Z.
    pub tail_dz: f32,
}

impl Default for ScatterParams {
    fn default() -> Self {
        Self {
            radius: 0.08,
            z: 0.2,
            tail_dz: 0.05,
        }
    }
}

/// Data driving the scaffold builder.
///
/// Everything the builder decides by name lives here so rigs with other
/// naming schemes can supply their own tables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaffoldRules {
    pub names: NameRules,
    /// Base names accepted from a mapping; anything else is ignored.
    pub allowed_bases: Vec<String>,
    /// Checked in order, first match wins.
    pub parent_rules: Vec<ParentRule>,
    pub default_parent: String,
    pub scatter: ScatterParams,
}

impl Default for ScaffoldRules {
    fn default() -> Self {
        let allowed_bases = [
            "root",
            "torso",
            "chest",
            "head",
            "upper_arm_fk",
            "forearm_fk",
            "forearm_tweak",
            "hand_ik",
            "hand",
            "thigh_fk",
            "shin_fk",
            "shin_tweak",
            "foot_ik",
            "foot_spin_ik",
            "heel",
            "toe",
            "toe_spin",
        ]
        .map(String::from)
        .to_vec();

        let parent_rules = vec![
            ParentRule::new(&["forearm"], Some("upper_arm_fk"), "chest"),
            ParentRule::new(&["hand"], Some("forearm_fk"), "chest"),
            ParentRule::new(&["thigh"], None, "root"),
            ParentRule::new(&["shin"], Some("thigh_fk"), "root"),
            ParentRule::new(&["foot", "toe"], Some("shin_fk"), "root"),
            ParentRule::new(&["cheek", "brow", "lip", "lid", "head"], None, "head"),
        ];

        Self {
            names: NameRules::default(),
            allowed_bases,
            parent_rules,
            default_parent: "root".to_string(),
            scatter: ScatterParams::default(),
        }
    }
}

impl ScaffoldRules {
    /// True if the normalized base of `name` is in the allow-list.
    pub fn is_allowed(&self, name: &str) -> bool {
        let base = self.names.resolve(name).base;
        self.allowed_bases.iter().any(|b| *b == base)
    }

    /// Parent picked by keyword for a bone with this base name and side.
    pub fn parent_for(&self, base: &str, side: Option<Side>) -> String {
        self.parent_rules
            .iter()
            .find(|r| r.matches(base))
            .map(|r| r.parent_for(side))
            .unwrap_or_else(|| self.default_parent.clone())
    }

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
