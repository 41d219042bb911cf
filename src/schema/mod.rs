//! On-disk schema versions
//!
//! A persisted document is one of three shapes, modeled as the closed
//! tagged union [`RawDocument`]. Readers and writers are free functions per
//! version; [`read`] and [`write`] dispatch on the tag.
//!
//! - v1: flat identity fields, `annotation.{motif,deep}`, `narrative_structure`
//! - v2: nested `metadata`/`source_info`, flat per-event relationship and action fields
//! - v3: as v2, with `relationships` lists and `action_layer` objects per event

pub(crate) mod common;
pub mod nested;
pub mod v1;

use crate::json::scalar_to_string;
use crate::model::AnnotationDocument;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors surfaced while identifying a raw document
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("document is not a JSON object")]
    NotAnObject,

    #[error("unknown schema version: {0}")]
    UnknownVersion(String),
}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVersion {
    V1,
    V2,
    V3,
}

impl SchemaVersion {
    pub const ALL: [SchemaVersion; 3] = [SchemaVersion::V1, SchemaVersion::V2, SchemaVersion::V3];

    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaVersion::V1 => "v1",
            SchemaVersion::V2 => "v2",
            SchemaVersion::V3 => "v3",
        }
    }

    /// The value written to the top-level `version` field, if any.
    pub fn tag(&self) -> Option<&'static str> {
        match self {
            SchemaVersion::V1 => None,
            SchemaVersion::V2 => Some("2.0"),
            SchemaVersion::V3 => Some("3.0"),
        }
    }

    /// Suffix appended to the story's base name in file names.
    pub fn file_suffix(&self) -> &'static str {
        match self {
            SchemaVersion::V1 => "",
            SchemaVersion::V2 => "_v2",
            SchemaVersion::V3 => "_v3",
        }
    }

    /// Parse an explicit version tag (`"2.0"`, `"v2"`, `"2"`).
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().trim_start_matches(['v', 'V']) {
            "1" | "1.0" => Some(SchemaVersion::V1),
            "2" | "2.0" => Some(SchemaVersion::V2),
            "3" | "3.0" => Some(SchemaVersion::V3),
            _ => None,
        }
    }
}

impl std::fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SchemaVersion {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| SchemaError::UnknownVersion(s.to_string()))
    }
}

/// A persisted document tagged with its schema version.
#[derive(Debug, Clone, PartialEq)]
pub enum RawDocument {
    V1(Value),
    V2(Value),
    V3(Value),
}

impl RawDocument {
    /// Identify the version of a raw JSON document.
    pub fn detect(value: Value) -> SchemaResult<Self> {
        let version = detect_version(&value)?;
        Ok(Self::tagged(version, value))
    }

    pub fn tagged(version: SchemaVersion, value: Value) -> Self {
        match version {
            SchemaVersion::V1 => RawDocument::V1(value),
            SchemaVersion::V2 => RawDocument::V2(value),
            SchemaVersion::V3 => RawDocument::V3(value),
        }
    }

    pub fn version(&self) -> SchemaVersion {
        match self {
            RawDocument::V1(_) => SchemaVersion::V1,
            RawDocument::V2(_) => SchemaVersion::V2,
            RawDocument::V3(_) => SchemaVersion::V3,
        }
    }

    pub fn as_value(&self) -> &Value {
        match self {
            RawDocument::V1(v) | RawDocument::V2(v) | RawDocument::V3(v) => v,
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            RawDocument::V1(v) | RawDocument::V2(v) | RawDocument::V3(v) => v,
        }
    }
}

const V1_MARKERS: [&str; 3] = ["annotation", "narrative_structure", "source_text"];
const NESTED_MARKERS: [&str; 4] = [
    "narrative_events",
    "source_info",
    "themes_and_motifs",
    "analysis",
];

/// Determine the schema version from an explicit tag or the document's shape.
///
/// An explicit `version` field always wins, and an unrecognized one is an
/// error rather than a reason to sniff.
pub fn detect_version(value: &Value) -> SchemaResult<SchemaVersion> {
    let obj = value.as_object().ok_or(SchemaError::NotAnObject)?;

    if let Some(tag) = obj.get("version").filter(|v| !v.is_null()) {
        let tag = scalar_to_string(tag);
        return SchemaVersion::from_tag(&tag).ok_or(SchemaError::UnknownVersion(tag));
    }

    if NESTED_MARKERS.iter().any(|k| obj.contains_key(*k)) {
        let events = obj
            .get("narrative_events")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let has_v3_events = events.iter().any(|e| {
            e.get("relationships").map_or(false, Value::is_array)
                || e.get("action_layer").map_or(false, Value::is_object)
        });
        return Ok(if has_v3_events {
            SchemaVersion::V3
        } else {
            SchemaVersion::V2
        });
    }

    if V1_MARKERS.iter().any(|k| obj.contains_key(*k)) {
        return Ok(SchemaVersion::V1);
    }

    Err(SchemaError::UnknownVersion(
        "document matches no known shape".to_string(),
    ))
}

/// Read a tagged document into the canonical model.
pub fn read(raw: &RawDocument) -> AnnotationDocument {
    match raw {
        RawDocument::V1(v) => v1::read(v),
        RawDocument::V2(v) | RawDocument::V3(v) => nested::read(v),
    }
}

/// Detect and read in one step.
pub fn read_value(value: Value) -> SchemaResult<(AnnotationDocument, SchemaVersion)> {
    let raw = RawDocument::detect(value)?;
    Ok((read(&raw), raw.version()))
}

/// Emit the canonical document in the requested version.
pub fn write(doc: &AnnotationDocument, version: SchemaVersion) -> RawDocument {
    match version {
        SchemaVersion::V1 => RawDocument::V1(v1::write(doc)),
        SchemaVersion::V2 => RawDocument::V2(nested::write(doc, SchemaVersion::V2)),
        SchemaVersion::V3 => RawDocument::V3(nested::write(doc, SchemaVersion::V3)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn explicit_version_wins() {
        let doc = json!({"version": "2.0", "annotation": {}});
        assert_eq!(detect_version(&doc).unwrap(), SchemaVersion::V2);
        let numeric_tag = json!({"version": 3});
        assert_eq!(detect_version(&numeric_tag).unwrap(), SchemaVersion::V3);
    }

    #[test]
    fn unrecognized_explicit_version_is_an_error() {
        let err = detect_version(&json!({"version": "4.0", "narrative_events": []})).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownVersion(v) if v == "4.0"));
    }

    #[test]
    fn shape_sniffing_distinguishes_v2_and_v3() {
        let v2 = json!({
            "metadata": {"id": "a"},
            "narrative_events": [{"relationship_level1": "x"}]
        });
        let v3 = json!({"metadata": {"id": "a"}, "narrative_events": [{"relationships": []}]});
        let v3_layer = json!({"narrative_events": [{"action_layer": {}}]});
        assert_eq!(detect_version(&v2).unwrap(), SchemaVersion::V2);
        assert_eq!(detect_version(&v3).unwrap(), SchemaVersion::V3);
        assert_eq!(detect_version(&v3_layer).unwrap(), SchemaVersion::V3);
    }

    #[test]
    fn shape_sniffing_finds_v1() {
        let v1 = json!({"id": "a", "narrative_structure": []});
        assert_eq!(detect_version(&v1).unwrap(), SchemaVersion::V1);
    }

    #[test]
    fn unknown_shapes_are_surfaced() {
        assert!(matches!(
            detect_version(&json!({"foo": 1})),
            Err(SchemaError::UnknownVersion(_))
        ));
        assert!(matches!(
            detect_version(&json!([1, 2])),
            Err(SchemaError::NotAnObject)
        ));
    }

    #[test]
    fn version_parsing_accepts_common_spellings() {
        assert_eq!("v3".parse::<SchemaVersion>().unwrap(), SchemaVersion::V3);
        assert_eq!("1.0".parse::<SchemaVersion>().unwrap(), SchemaVersion::V1);
        assert!("v9".parse::<SchemaVersion>().is_err());
    }
}
