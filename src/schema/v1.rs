//! v1: flat identity fields, events under `narrative_structure`
//!
//! v1 has a single flat relationship triple per event. Events with several
//! relationships are written with the first one only; callers that need all
//! of them must use v3. When that entry names participants other than the
//! event's first agent and target, it is also written as a `relationship`
//! object so readers recover who it links.

use super::common::{self, child, items};
use crate::json::{array, str_field};
use crate::model::{AnnotationDocument, NarrativeEvent, SourceText};
use crate::normalize::{action, reconcile, relationship};
use serde_json::{json, Map, Value};

pub fn read(raw: &Value) -> AnnotationDocument {
    let metadata = child(raw, "metadata");
    let annotation = child(raw, "annotation");
    let motif = annotation.and_then(|a| child(a, "motif"));
    let deep = annotation.and_then(|a| child(a, "deep"));

    // Identity sometimes lived under `metadata` in hand-edited files.
    let identity = |key: &str| {
        let top = str_field(raw, key);
        if top.is_empty() {
            metadata.map(|m| str_field(m, key)).unwrap_or_default()
        } else {
            top
        }
    };

    let characters = match annotation.and_then(|a| a.get("characters")) {
        Some(_) => common::read_characters(items(annotation, "characters")),
        None => common::read_characters(array(raw, "characters")),
    };

    AnnotationDocument {
        id: identity("id"),
        culture: identity("culture"),
        title: identity("title"),
        metadata: common::read_metadata(metadata),
        source: read_source(raw.get("source_text")),
        themes: common::read_theme(motif),
        characters,
        narrative_events: common::read_events(array(raw, "narrative_structure")),
        propp_functions: common::read_propp_functions(items(deep, "propp_functions")),
        propp_notes: deep
            .map(|d| str_field(d, "propp_notes"))
            .unwrap_or_default(),
        summaries: common::read_summaries(deep.and_then(|d| d.get("paragraph_summaries"))),
        cross_validation: common::read_cross_validation(raw.get("cross_validation")),
        qa: common::read_qa(raw.get("qa")),
    }
}

/// `source_text` is an object in current files and a bare string in the oldest ones.
fn read_source(value: Option<&Value>) -> SourceText {
    match value {
        Some(Value::String(text)) => SourceText {
            text: text.clone(),
            ..Default::default()
        },
        Some(obj @ Value::Object(_)) => SourceText {
            text: str_field(obj, "text"),
            language: str_field(obj, "language"),
            text_type: str_field(obj, "type"),
            reference_uri: str_field(obj, "reference_uri"),
        },
        _ => SourceText::default(),
    }
}

pub(crate) fn write_event(event: &NarrativeEvent) -> Value {
    let mut obj: Map<String, Value> = common::event_core(event);
    let reconciled = reconcile(event);
    if reconciled.entries.len() > 1 {
        tracing::warn!(
            event_id = %event.id,
            dropped = reconciled.entries.len() - 1,
            "v1 keeps only the first relationship"
        );
    }
    if let Some(first) = reconciled.entries.first() {
        if !relationship::flat_fields_suffice(event, first) {
            obj.insert("relationship".into(), common::relationship_to_value(first));
        }
    }
    let flat = reconciled.first_flat();
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

pub fn write(doc: &AnnotationDocument) -> Value {
    json!({
        "id": doc.id,
        "culture": doc.culture,
        "title": doc.title,
        "source_text": {
            "text": doc.source.text,
            "language": doc.source.language,
            "type": doc.source.text_type,
            "reference_uri": doc.source.reference_uri,
        },
        "metadata": {
            "annotator": doc.metadata.annotator,
            "date_annotated": doc.metadata.date_annotated,
            "confidence": doc.metadata.confidence,
        },
        "annotation": {
            "characters": common::characters_to_value(&doc.characters),
            "motif": common::theme_to_value(&doc.themes, false),
            "deep": {
                "paragraph_summaries": common::summaries_to_value(&doc.summaries),
                "propp_functions": common::propp_functions_to_value(&doc.propp_functions),
                "propp_notes": doc.propp_notes,
            },
        },
        "narrative_structure": doc.narrative_events.iter().map(write_event).collect::<Vec<_>>(),
        "cross_validation": common::cross_validation_to_value(&doc.cross_validation),
        "qa": common::qa_to_value(&doc.qa),
    })
}
