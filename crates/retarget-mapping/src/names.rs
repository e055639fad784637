//! Bone-name normalization.
//!
//! Rig bone names carry a layer prefix (`DEF-` deformation, `ORG-`
//! organizational, `MCH-` mechanism, `CTRL-` control) and a side suffix. Both
//! are stripped to get a base name that can be compared across rigs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Side tag of a mirrored bone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    L,
    R,
}

impl Side {
    /// The opposite side.
    #[inline]
    pub fn mirrored(self) -> Side {
        match self {
            Side::L => Side::R,
            Side::R => Side::L,
        }
    }

    /// `+1.0` for left, `-1.0` for right (rig space: +X is the character's left).
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Side::L => 1.0,
            Side::R => -1.0,
        }
    }

    /// Force the sign of `x` to this side.
    #[inline]
    pub fn place_x(self, x: f32) -> f32 {
        self.sign() * x.abs()
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::L => f.write_str("L"),
            Side::R => f.write_str("R"),
        }
    }
}

/// A bone name split into its parts.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResolvedName {
    /// Layer prefix that was stripped, if any (e.g. `"DEF-"`).
    pub prefix: Option<String>,
    /// Base name without prefix and side suffix.
    pub base: String,
    pub side: Option<Side>,
    /// Exact suffix that was stripped, if any (e.g. `"_L"`).
    pub suffix: Option<String>,
}

impl ResolvedName {
    /// Base name with the side suffix but without the layer prefix.
    pub fn unprefixed(&self) -> String {
        match &self.suffix {
            Some(suffix) => format!("{}{}", self.base, suffix),
            None => self.base.clone(),
        }
    }

    /// Reassemble the original name.
    pub fn full(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}{}", prefix, self.unprefixed()),
            None => self.unprefixed(),
        }
    }

    /// True if `other` names the same bone up to prefix and suffix style.
    pub fn same_bone(&self, other: &ResolvedName) -> bool {
        self.base == other.base && self.side == other.side
    }
}

/// Prefix families and side suffixes recognized by [`NameRules::resolve`].
///
/// `left_suffixes[i]` and `right_suffixes[i]` are mirror images of each other.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NameRules {
    pub prefixes: Vec<String>,
    pub left_suffixes: Vec<String>,
    pub right_suffixes: Vec<String>,
}

impl Default for NameRules {
    fn default() -> Self {
        Self {
            prefixes: ["DEF-", "ORG-", "MCH-", "CTRL-"]
                .map(String::from)
                .to_vec(),
            left_suffixes: [".L", "_L"].map(String::from).to_vec(),
            right_suffixes: [".R", "_R"].map(String::from).to_vec(),
        }
    }
}

impl NameRules {
    /// Split `name` into prefix, base and side.
    ///
    /// Total: at most one prefix and one suffix are stripped, anything
    /// unrecognized stays in `base`.
    pub fn resolve(&self, name: &str) -> ResolvedName {
        let (prefix, rest) = match self
            .prefixes
            .iter()
            .find(|p| !p.is_empty() && name.starts_with(p.as_str()))
        {
            Some(p) => (Some(p.clone()), &name[p.len()..]),
            None => (None, name),
        };

        let sided = self
            .left_suffixes
            .iter()
            .map(|s| (s, Side::L))
            .chain(self.right_suffixes.iter().map(|s| (s, Side::R)))
            .find(|(s, _)| !s.is_empty() && rest.ends_with(s.as_str()));

        match sided {
            Some((suffix, side)) => ResolvedName {
                prefix,
                base: rest[..rest.len() - suffix.len()].to_string(),
                side: Some(side),
                suffix: Some(suffix.clone()),
            },
            None => ResolvedName {
                prefix,
                base: rest.to_string(),
                side: None,
                suffix: None,
            },
        }
    }

    /// Name of the bone `name` refers to on `side`, keeping prefix and
    /// suffix style.
    ///
    /// Unsided names get the first configured suffix for `side`.
    pub fn for_side(&self, name: &str, side: Side) -> String {
        let resolved = self.resolve(name);
        if resolved.side == Some(side) {
            return name.to_string();
        }
        let suffix = self.mirror_suffix(resolved.suffix.as_deref(), side);
        let mut out = String::with_capacity(name.len() + 2);
        if let Some(prefix) = &resolved.prefix {
            out.push_str(prefix);
        }
        out.push_str(&resolved.base);
        out.push_str(&suffix);
        out
    }

    fn mirror_suffix(&self, suffix: Option<&str>, side: Side) -> String {
        let (from, to) = match side {
            Side::L => (&self.right_suffixes, &self.left_suffixes),
            Side::R => (&self.left_suffixes, &self.right_suffixes),
        };
        suffix
            .and_then(|s| from.iter().position(|f| f == s))
            .and_then(|i| to.get(i))
            .or_else(|| to.first())
            .cloned()
            .unwrap_or_else(|| format!(".{side}"))
    }
}

/// Built-in rules (the four layer prefixes and dot/underscore suffixes).
pub fn default_rules() -> &'static NameRules {
    static RULES: OnceLock<NameRules> = OnceLock::new();
    RULES.get_or_init(NameRules::default)
}

/// Resolve `name` with [`default_rules`].
pub fn resolve(name: &str) -> ResolvedName {
    default_rules().resolve(name)
}
