//! v2 and v3: nested metadata, `narrative_events`, `themes_and_motifs`, `analysis`
//!
//! The two versions share a document layout and differ only per event:
//! v2 keeps flat relationship and action fields (plus `relationship_multi`
//! for multi-relationship events), v3 carries `relationships` and
//! `action_layer` instead. The two event representations never coexist in
//! one emitted event.

use super::common::{self, child, items};
use super::SchemaVersion;
use crate::json::str_field;
use crate::model::{AnnotationDocument, NarrativeEvent, SourceText};
use crate::normalize::{action, reconcile, relationship};
use serde_json::{json, Map, Value};

pub fn read(raw: &Value) -> AnnotationDocument {
    let metadata = child(raw, "metadata");
    let source_info = child(raw, "source_info");
    let analysis = child(raw, "analysis");
    let meta = |key: &str| metadata.map(|m| str_field(m, key)).unwrap_or_default();

    AnnotationDocument {
        id: meta("id"),
        culture: meta("culture"),
        title: meta("title"),
        metadata: common::read_metadata(metadata),
        source: source_info
            .map(|s| SourceText {
                text: str_field(s, "text_content"),
                language: str_field(s, "language"),
                text_type: str_field(s, "type"),
                reference_uri: str_field(s, "reference_uri"),
            })
            .unwrap_or_default(),
        themes: common::read_theme(child(raw, "themes_and_motifs")),
        characters: common::read_characters(items(Some(raw), "characters")),
        narrative_events: common::read_events(items(Some(raw), "narrative_events")),
        propp_functions: common::read_propp_functions(items(analysis, "propp_functions")),
        propp_notes: analysis
            .map(|a| str_field(a, "propp_notes"))
            .unwrap_or_default(),
        summaries: common::read_summaries(analysis.and_then(|a| a.get("paragraph_summaries"))),
        cross_validation: common::read_cross_validation(
            analysis.and_then(|a| a.get("bias_reflection")),
        ),
        qa: common::read_qa(analysis.and_then(|a| a.get("qa_notes"))),
    }
}

/// v2 event: flat fields, `relationship_multi` only in multi mode.
///
/// In multi mode the flat relationship fields are written empty so no
/// reader can mistake them for the whole story.
pub(crate) fn write_v2_event(event: &NarrativeEvent) -> Value {
    let mut obj: Map<String, Value> = common::event_core(event);
    let reconciled = reconcile(event);
    let flat = if reconciled.is_multi() {
        let entries: Vec<Value> = reconciled
            .entries
            .iter()
            .map(common::relationship_to_value)
            .collect();
        obj.insert("relationship_multi".into(), Value::Array(entries));
        relationship::FlatRelationship::default()
    } else {
        reconciled.first_flat()
    };
    obj.insert(
        "relationship_level1".into(),
        json!(flat.relationship_level1),
    );
    obj.insert(
        "relationship_level2".into(),
        json!(flat.relationship_level2),
    );
    obj.insert("sentiment".into(), json!(flat.sentiment));
    action::decode(&event.action_layer).write_into(&mut obj);
    Value::Object(obj)
}

/// v3 event: every relationship entry and the nested action layer.
pub(crate) fn write_v3_event(event: &NarrativeEvent) -> Value {
    let mut obj: Map<String, Value> = common::event_core(event);
    let entries: Vec<Value> = event
        .relationships
        .iter()
        .map(common::relationship_to_value)
        .collect();
    obj.insert("relationships".into(), Value::Array(entries));
    obj.insert(
        "action_layer".into(),
        action::layer_to_value(&event.action_layer),
    );
    Value::Object(obj)
}

/// Write the nested layout; `version` must be V2 or V3.
pub fn write(doc: &AnnotationDocument, version: SchemaVersion) -> Value {
    let write_event: fn(&NarrativeEvent) -> Value = match version {
        SchemaVersion::V3 => write_v3_event,
        _ => write_v2_event,
    };
    json!({
        "version": version.tag().unwrap_or("2.0"),
        "metadata": {
            "id": doc.id,
            "title": doc.title,
            "culture": doc.culture,
            "annotator": doc.metadata.annotator,
            "date_annotated": doc.metadata.date_annotated,
            "confidence": doc.metadata.confidence,
        },
        "source_info": {
            "language": doc.source.language,
            "type": doc.source.text_type,
            "reference_uri": doc.source.reference_uri,
            "text_content": doc.source.text,
        },
        "characters": common::characters_to_value(&doc.characters),
        "narrative_events": doc.narrative_events.iter().map(write_event).collect::<Vec<_>>(),
        "themes_and_motifs": common::theme_to_value(&doc.themes, true),
        "analysis": {
            "propp_functions": common::propp_functions_to_value(&doc.propp_functions),
            "propp_notes": doc.propp_notes,
            "paragraph_summaries": common::summaries_to_value(&doc.summaries),
            "bias_reflection": common::cross_validation_to_value(&doc.cross_validation),
            "qa_notes": common::qa_to_value(&doc.qa),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EventType, RelationshipEntry};
    use crate::normalize::action::FLAT_ACTION_KEYS;

    fn two_target_event() -> NarrativeEvent {
        let mut event = NarrativeEvent::new("e1", EventType::Rescue)
            .with_agents(["Hunter"])
            .with_targets(["Girl", "Grandmother"])
            .with_relationship(
                RelationshipEntry::new("Hunter", "Girl").with_levels("stranger", ""),
            )
            .with_relationship(
                RelationshipEntry::new("Hunter", "Grandmother").with_levels("鄰居(neighbor)", ""),
            );
        event.action_layer.function = "rescue".into();
        event
    }

    #[test]
    fn v2_multi_mode_empties_flat_fields() {
        let out = write_v2_event(&two_target_event());
        assert_eq!(out["relationship_level1"], "");
        assert_eq!(out["sentiment"], "");
        let multi = out["relationship_multi"].as_array().unwrap();
        assert_eq!(multi.len(), 2);
        assert_eq!(multi[1]["relationship_level1"], "neighbor");
        assert_eq!(out["narrative_function"], "rescue");
        assert!(out.get("relationships").is_none());
        assert!(out.get("action_layer").is_none());
    }

    #[test]
    fn v2_single_mode_has_no_multi_list() {
        let event = NarrativeEvent::new("e2", EventType::Lack)
            .with_agents(["Girl"])
            .with_targets(["Wolf"])
            .with_relationship(
                RelationshipEntry::new("Girl", "Wolf").with_sentiment("fearful"),
            );
        let out = write_v2_event(&event);
        assert_eq!(out["sentiment"], "fearful");
        assert!(out.get("relationship_multi").is_none());
    }

    #[test]
    fn v2_lone_entry_without_matching_agent_uses_multi_list() {
        let event = NarrativeEvent::new("e3", EventType::Villainy)
            .with_targets(["Girl"])
            .with_relationship(
                RelationshipEntry::new("Tiger", "Girl").with_levels("enemy", ""),
            );
        let out = write_v2_event(&event);
        assert_eq!(out["relationship_level1"], "");
        let multi = out["relationship_multi"].as_array().unwrap();
        assert_eq!(multi.len(), 1);
        assert_eq!(multi[0]["agent"], "Tiger");
    }

    #[test]
    fn v3_event_carries_no_flat_keys() {
        let out = write_v3_event(&two_target_event());
        let relationship_keys = [
            "relationship_level1",
            "relationship_level2",
            "sentiment",
            "relationship_multi",
        ];
        for key in FLAT_ACTION_KEYS.iter().chain(relationship_keys.iter()) {
            assert!(out.get(*key).is_none(), "unexpected key {}", key);
        }
        assert_eq!(out["relationships"].as_array().unwrap().len(), 2);
        assert_eq!(out["action_layer"]["function"], "rescue");
    }

    #[test]
    fn v3_document_is_tagged() {
        let doc = AnnotationDocument::new("t", "Tale", "Taiwan");
        let out = write(&doc, SchemaVersion::V3);
        assert_eq!(out["version"], "3.0");
        assert_eq!(write(&doc, SchemaVersion::V2)["version"], "2.0");
    }
}
