//! Evidence map normalization
//!
//! Three generations of evidence entries exist on disk, per label:
//! - `{ "evidence_keys": [...] }` (current)
//! - `{ "related_sections": [...], "include_whole_summary": bool }`
//! - anything else, which reads as no evidence

use crate::json::scalar_to_string;
use crate::model::{EvidenceMap, WHOLE_SUMMARY_KEY};
use serde_json::{json, Map, Value};

/// Normalize a single label's evidence entry into an ordered key list.
pub fn normalize_entry(raw: &Value) -> Vec<String> {
    let keys: Vec<String> = if let Some(keys) = raw.get("evidence_keys").and_then(Value::as_array) {
        keys.iter().map(scalar_to_string).collect()
    } else if raw.get("related_sections").is_some() || raw.get("include_whole_summary").is_some() {
        let mut keys = Vec::new();
        if raw.get("include_whole_summary").and_then(Value::as_bool) == Some(true) {
            keys.push(WHOLE_SUMMARY_KEY.to_string());
        }
        if let Some(sections) = raw.get("related_sections").and_then(Value::as_array) {
            keys.extend(sections.iter().map(scalar_to_string));
        }
        keys
    } else {
        if !raw.is_null() {
            tracing::debug!(entry = %raw, "unrecognized evidence entry, treating as empty");
        }
        Vec::new()
    };

    let mut out: Vec<String> = Vec::with_capacity(keys.len());
    for key in keys {
        if !key.is_empty() && !out.contains(&key) {
            out.push(key);
        }
    }
    out
}

/// Normalize a whole label → entry mapping. A non-object reads as empty.
pub fn normalize(raw: Option<&Value>) -> EvidenceMap {
    let mut map = EvidenceMap::new();
    if let Some(Value::Object(entries)) = raw {
        for (label, entry) in entries {
            map.set_keys(label.clone(), normalize_entry(entry));
        }
    }
    map
}

/// Emit the current `{label: {evidence_keys: [...]}}` shape.
pub fn to_value(map: &EvidenceMap) -> Value {
    let mut out = Map::new();
    for (label, keys) in map.iter() {
        out.insert(label.to_string(), json!({ "evidence_keys": keys }));
    }
    Value::Object(out)
}
