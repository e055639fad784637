use crate::transfer::TransferParams;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Bone value meaning "unbound, ignore this entry".
pub const UNBOUND_BONE: &str = "NONE";

const LEGACY_PROPS: &str = "cgt_props";

/// One driver-to-bone binding.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MappingEntry {
    /// Bone driven by this entry; `"NONE"` leaves the entry unbound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_bone: Option<String>,
    /// Secondary bone, e.g. the far end of a distance measurement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_bone: Option<String>,
    /// Logical driver set (`"pose"`, `"face"`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    #[serde(default, skip_serializing_if = "TransferParams::is_default")]
    pub transfer: TransferParams,
    /// Fields this crate does not interpret; written back unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn bound(name: Option<&str>) -> Option<&str> {
    name.filter(|n| !n.is_empty() && *n != UNBOUND_BONE)
}

fn nested_str<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    path.iter()
        .try_fold(value, |v, key| v.get(*key))
        .and_then(Value::as_str)
}

impl MappingEntry {
    /// Entry bound to `target_bone`.
    pub fn bound_to(target_bone: impl Into<String>) -> Self {
        Self {
            target_bone: Some(target_bone.into()),
            ..Self::default()
        }
    }

    /// Unbound entry (`target_bone = "NONE"`).
    pub fn unbound() -> Self {
        Self::bound_to(UNBOUND_BONE)
    }

    pub fn with_other_bone(mut self, other_bone: impl Into<String>) -> Self {
        self.other_bone = Some(other_bone.into());
        self
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(collection.into());
        self
    }

    pub fn with_transfer(mut self, transfer: TransferParams) -> Self {
        self.transfer = transfer;
        self
    }

    /// Target bone, or `None` when absent, empty or `"NONE"`.
    pub fn bound_target(&self) -> Option<&str> {
        bound(self.target_bone.as_deref())
    }

    /// Secondary bone, with the same `"NONE"` handling as the target.
    pub fn bound_other(&self) -> Option<&str> {
        bound(self.other_bone.as_deref())
    }

    #[inline]
    pub fn is_bound(&self) -> bool {
        self.bound_target().is_some()
    }

    /// True if the entry names any bone field at all, bound or not.
    pub fn has_bone_reference(&self) -> bool {
        self.target_bone.is_some() || self.other_bone.is_some()
    }

    /// All bound bone names this entry refers to, target first.
    pub fn bone_refs(&self) -> impl Iterator<Item = &str> {
        self.bound_target().into_iter().chain(self.bound_other())
    }

    /// Fill missing bone fields from the nested `cgt_props` layout.
    ///
    /// `target.target_bone` wins over `by_obj.target_bone`. The nested
    /// object itself stays in `extra`.
    pub(crate) fn lift_legacy_props(&mut self) {
        let Some(props) = self.extra.get(LEGACY_PROPS) else {
            return;
        };
        if self.target_bone.is_none() {
            self.target_bone = nested_str(props, &["target", "target_bone"])
                .or_else(|| nested_str(props, &["by_obj", "target_bone"]))
                .map(str::to_string);
        }
        if self.other_bone.is_none() {
            self.other_bone = nested_str(props, &["by_obj", "other_bone"]).map(str::to_string);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(v: Value) -> MappingEntry {
        let mut e: MappingEntry = serde_json::from_value(v).expect("entry");
        e.lift_legacy_props();
        e
    }

    #[test]
    fn none_and_empty_are_unbound() {
        assert!(!MappingEntry::unbound().is_bound());
        assert!(!MappingEntry::bound_to("").is_bound());
        assert_eq!(MappingEntry::bound_to("hand.L").bound_target(), Some("hand.L"));
    }

    #[test]
    fn bone_refs_skip_unbound_fields() {
        let e = MappingEntry::unbound().with_other_bone("thumb.01.L");
        let refs: Vec<&str> = e.bone_refs().collect();
        assert_eq!(refs, ["thumb.01.L"]);
        assert!(e.has_bone_reference());
    }

    #[test]
    fn extra_fields_survive_round_trip() {
        let raw = json!({
            "target_bone": "head",
            "constraint": {"type": "COPY_ROTATION"},
            "notes": "authored"
        });
        let e = entry(raw.clone());
        assert_eq!(e.extra.len(), 2);
        assert_eq!(serde_json::to_value(&e).expect("ser"), raw);
    }

    #[test]
    fn legacy_props_are_lifted() {
        let e = entry(json!({
            "cgt_props": {
                "target": {"target_bone": "DEF-forearm.L"},
                "by_obj": {"target_bone": "ignored", "other_bone": "DEF-hand.L"}
            }
        }));
        assert_eq!(e.target_bone.as_deref(), Some("DEF-forearm.L"));
        assert_eq!(e.other_bone.as_deref(), Some("DEF-hand.L"));
        assert!(e.extra.contains_key("cgt_props"));
    }

    #[test]
    fn top_level_fields_win_over_legacy_props() {
        let e = entry(json!({
            "target_bone": "head",
            "cgt_props": {"by_obj": {"target_bone": "chest"}}
        }));
        assert_eq!(e.target_bone.as_deref(), Some("head"));
    }
}
