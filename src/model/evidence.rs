//! Label → evidence key mapping for motif and ATU selections

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Evidence key standing for the whole-story summary rather than a section.
pub const WHOLE_SUMMARY_KEY: &str = "__WHOLE_SUMMARY__";

/// Mapping from a label to its evidence keys.
///
/// Each label's key list is de-duplicated and keeps insertion order.
/// Labels themselves are kept sorted so emission is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvidenceMap(BTreeMap<String, Vec<String>>);

impl EvidenceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key to a label's list. Empty keys and duplicates are ignored.
    ///
    /// Returns true if the key was added.
    pub fn insert_key(&mut self, label: impl Into<String>, key: impl Into<String>) -> bool {
        let key = key.into();
        let keys = self.0.entry(label.into()).or_default();
        if key.is_empty() || keys.contains(&key) {
            return false;
        }
        keys.push(key);
        true
    }

    /// Replace a label's list wholesale, applying the same dedupe rule.
    pub fn set_keys<I, S>(&mut self, label: impl Into<String>, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let label = label.into();
        self.0.insert(label.clone(), Vec::new());
        for key in keys {
            self.insert_key(label.clone(), key);
        }
    }

    pub fn keys_for(&self, label: &str) -> &[String] {
        self.0.get(label).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Vec<String>)> for EvidenceMap {
    fn from_iter<T: IntoIterator<Item = (String, Vec<String>)>>(iter: T) -> Self {
        let mut map = EvidenceMap::new();
        for (label, keys) in iter {
            map.set_keys(label, keys);
        }
        map
    }
}
