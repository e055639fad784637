use crate::entry::MappingEntry;
use crate::error::MappingError;
use log::debug;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Driver name to [`MappingEntry`].
///
/// Entries are kept sorted by driver name, so every walk over a document is
/// deterministic regardless of the key order in the source file.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MappingDocument {
    entries: BTreeMap<String, MappingEntry>,
}

impl MappingDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a mapping from JSON text.
    pub fn parse(raw: &str) -> Result<Self, MappingError> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_value(value)
    }

    /// Build a mapping from an already decoded JSON value.
    ///
    /// Fails on the first entry that is not an object, cannot be decoded, has
    /// no bone reference (top-level or legacy `cgt_props`) or carries invalid
    /// transfer parameters.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(value)))]
    pub fn from_value(value: Value) -> Result<Self, MappingError> {
        let Value::Object(root) = value else {
            return Err(MappingError::NotAnObject);
        };

        let mut entries = BTreeMap::new();
        for (driver, raw_entry) in root {
            if !raw_entry.is_object() {
                return Err(MappingError::EntryNotAnObject { driver });
            }
            let mut entry: MappingEntry = match serde_json::from_value(raw_entry) {
                Ok(entry) => entry,
                Err(source) => return Err(MappingError::InvalidEntry { driver, source }),
            };
            entry.lift_legacy_props();
            if !entry.has_bone_reference() {
                return Err(MappingError::MissingBoneReference { driver });
            }
            if let Err(reason) = entry.transfer.validate() {
                return Err(MappingError::InvalidTransfer { driver, reason });
            }
            entries.insert(driver, entry);
        }

        debug!("parsed mapping with {} entries", entries.len());
        Ok(Self { entries })
    }

    /// Serialize as pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[inline]
    pub fn get(&self, driver: &str) -> Option<&MappingEntry> {
        self.entries.get(driver)
    }

    #[inline]
    pub fn get_mut(&mut self, driver: &str) -> Option<&mut MappingEntry> {
        self.entries.get_mut(driver)
    }

    pub fn insert(&mut self, driver: impl Into<String>, entry: MappingEntry) -> Option<MappingEntry> {
        self.entries.insert(driver.into(), entry)
    }

    pub fn remove(&mut self, driver: &str) -> Option<MappingEntry> {
        self.entries.remove(driver)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(driver, entry)` pairs in driver-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MappingEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn bound(&self) -> impl Iterator<Item = (&str, &MappingEntry)> {
        self.iter().filter(|(_, e)| e.is_bound())
    }

    pub fn bound_count(&self) -> usize {
        self.bound().count()
    }

    pub fn unbound_count(&self) -> usize {
        self.len() - self.bound_count()
    }

    /// Distinct collection names, sorted.
    pub fn collections(&self) -> BTreeSet<&str> {
        self.entries
            .values()
            .filter_map(|e| e.collection.as_deref())
            .collect()
    }

    pub fn in_collection<'a>(
        &'a self,
        collection: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a MappingEntry)> + 'a {
        self.iter()
            .filter(move |(_, e)| e.collection.as_deref() == Some(collection))
    }

    /// Every bound `target_bone`/`other_bone`, first occurrence only, in
    /// driver-name order.
    pub fn referenced_bones(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.entries
            .values()
            .flat_map(MappingEntry::bone_refs)
            .filter(|name| seen.insert(*name))
            .collect()
    }
}

impl<S: Into<String>> FromIterator<(S, MappingEntry)> for MappingDocument {
    fn from_iter<I: IntoIterator<Item = (S, MappingEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
