//! Readers and writers for document pieces shared across schema versions

use crate::json::{array, as_int, int_field, object, opt_str_field, str_field, str_list, str_map};
use crate::model::{
    AnnotationMetadata, CharacterProfile, CrossValidationNote, EventType, NarrativeEvent,
    ProppFunctionMark, QaRecord, RelationshipEntry, SummarySet, TargetType, TextSpan, ThemeProfile,
    WHOLE_SUMMARY_KEY,
};
use crate::normalize::{action, evidence, relationship};
use serde_json::{json, Map, Value};

// ---------------------------------------------------------------------------
// Spans
// ---------------------------------------------------------------------------

/// A span is kept only if both bounds are integers.
pub(crate) fn read_span(value: Option<&Value>) -> Option<TextSpan> {
    let obj = value.filter(|v| v.is_object())?;
    let start = obj.get("start").and_then(as_int);
    let end = obj.get("end").and_then(as_int);
    match (start, end) {
        (Some(start), Some(end)) => Some(TextSpan::new(start, end, str_field(obj, "text"))),
        _ => {
            tracing::debug!(span = %obj, "dropping span with non-numeric bounds");
            None
        }
    }
}

pub(crate) fn span_to_value(span: Option<&TextSpan>) -> Value {
    match span {
        Some(span) => json!({"start": span.start, "end": span.end, "text": span.text}),
        None => Value::Null,
    }
}

// ---------------------------------------------------------------------------
// Narrative events
// ---------------------------------------------------------------------------

/// Read everything an event carries, whatever version it was written in.
pub(crate) fn read_event(raw: &Value) -> NarrativeEvent {
    let type_str = str_field(raw, "event_type");
    let event_type = EventType::parse(&type_str).unwrap_or_else(|| {
        if !type_str.trim().is_empty() {
            tracing::warn!(event_type = %type_str, "unknown event type, reading as OTHER");
        }
        EventType::Other
    });

    NarrativeEvent {
        id: str_field(raw, "id").trim().to_string(),
        text_span: read_span(raw.get("text_span")),
        event_type,
        description: str_field(raw, "description"),
        agents: str_list(raw.get("agents")),
        targets: str_list(raw.get("targets")),
        target_type: TargetType::parse(&str_field(raw, "target_type")),
        object_type: opt_str_field(raw, "object_type"),
        instrument: opt_str_field(raw, "instrument"),
        time_order: int_field(raw, "time_order"),
        relationships: relationship::read_relationships(raw),
        action_layer: action::read_action_layer(raw),
    }
}

/// Fields every version writes identically.
pub(crate) fn event_core(event: &NarrativeEvent) -> Map<String, Value> {
    let mut obj = Map::new();
    obj.insert("id".into(), json!(event.id));
    obj.insert("text_span".into(), span_to_value(event.text_span.as_ref()));
    obj.insert("event_type".into(), json!(event.event_type.as_str()));
    obj.insert("description".into(), json!(event.description));
    obj.insert("agents".into(), json!(event.agents));
    obj.insert("targets".into(), json!(event.targets));
    obj.insert("target_type".into(), json!(event.target_type.as_str()));
    obj.insert(
        "object_type".into(),
        json!(event.object_type.clone().unwrap_or_default()),
    );
    obj.insert(
        "instrument".into(),
        json!(event.instrument.clone().unwrap_or_default()),
    );
    obj.insert("time_order".into(), json!(event.time_order));
    obj
}

pub(crate) fn relationship_to_value(entry: &RelationshipEntry) -> Value {
    json!({
        "agent": entry.agent,
        "target": entry.target,
        "relationship_level1": relationship::extract_english(&entry.relationship_level1),
        "relationship_level2": entry.relationship_level2,
        "sentiment": entry.sentiment,
    })
}

pub(crate) fn read_events(items: &[Value]) -> Vec<NarrativeEvent> {
    items
        .iter()
        .filter(|item| item.is_object())
        .map(read_event)
        .collect()
}

// ---------------------------------------------------------------------------
// Characters
// ---------------------------------------------------------------------------

pub(crate) fn read_characters(items: &[Value]) -> Vec<CharacterProfile> {
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(name) => Some(CharacterProfile {
                name: name.trim().to_string(),
                ..Default::default()
            }),
            Value::Object(_) => Some(CharacterProfile {
                name: str_field(item, "name").trim().to_string(),
                alias: str_field(item, "alias"),
                archetype: str_field(item, "archetype"),
            }),
            _ => None,
        })
        .filter(|c| !c.name.is_empty())
        .collect()
}

pub(crate) fn characters_to_value(characters: &[CharacterProfile]) -> Value {
    Value::Array(
        characters
            .iter()
            .map(|c| {
                json!({"name": c.name, "alias": c.alias, "archetype": c.archetype})
            })
            .collect(),
    )
}

// ---------------------------------------------------------------------------
// Themes
// ---------------------------------------------------------------------------

/// `motif_type` and `atu_categories` may be scalars on disk; they always
/// read as lists.
pub(crate) fn read_theme(obj: Option<&Value>) -> ThemeProfile {
    let Some(obj) = obj else {
        return ThemeProfile::default();
    };
    let atu = obj
        .get("atu_categories")
        .or_else(|| obj.get("atu_type"));
    ThemeProfile {
        ending_type: str_field(obj, "ending_type"),
        key_values: str_list(obj.get("key_values")),
        motif_type: str_list(obj.get("motif_type")),
        atu_categories: str_list(atu),
        motif_evidence: evidence::normalize(obj.get("motif_evidence")),
        atu_evidence: evidence::normalize(obj.get("atu_evidence")),
    }
}

pub(crate) fn theme_to_value(theme: &ThemeProfile, always_emit_evidence: bool) -> Value {
    let mut obj = Map::new();
    obj.insert("ending_type".into(), json!(theme.ending_type));
    obj.insert("key_values".into(), json!(theme.key_values));
    obj.insert("motif_type".into(), json!(theme.motif_type));
    obj.insert("atu_categories".into(), json!(theme.atu_categories));
    if always_emit_evidence || !theme.motif_evidence.is_empty() {
        obj.insert(
            "motif_evidence".into(),
            evidence::to_value(&theme.motif_evidence),
        );
    }
    if always_emit_evidence || !theme.atu_evidence.is_empty() {
        obj.insert(
            "atu_evidence".into(),
            evidence::to_value(&theme.atu_evidence),
        );
    }
    Value::Object(obj)
}

// ---------------------------------------------------------------------------
// Summaries, Propp functions, reflection, QA
// ---------------------------------------------------------------------------

/// Structured `{per_section, whole}`, or an older flat `{key: text}` map in
/// which the whole-summary sentinel names the whole summary.
pub(crate) fn read_summaries(value: Option<&Value>) -> SummarySet {
    let Some(obj) = value.filter(|v| v.is_object()) else {
        if value.map_or(false, |v| !v.is_null()) {
            tracing::debug!("paragraph summaries are not an object, ignoring");
        }
        return SummarySet::default();
    };

    if obj.get("per_section").is_some() || obj.get("whole").is_some() {
        return SummarySet {
            per_section: str_map(obj.get("per_section")).into_iter().collect(),
            whole: str_field(obj, "whole"),
        };
    }

    let mut set = SummarySet::default();
    for (key, text) in str_map(Some(obj)) {
        if key == WHOLE_SUMMARY_KEY {
            set.whole = text;
        } else {
            set.per_section.insert(key, text);
        }
    }
    set
}

pub(crate) fn summaries_to_value(set: &SummarySet) -> Value {
    json!({"per_section": set.per_section, "whole": set.whole})
}

pub(crate) fn read_propp_functions(items: &[Value]) -> Vec<ProppFunctionMark> {
    items
        .iter()
        .filter(|item| item.is_object())
        .map(|item| ProppFunctionMark {
            function: str_field(item, "function"),
            text_span: read_span(item.get("text_span")),
            evidence: str_field(item, "evidence"),
        })
        .collect()
}

pub(crate) fn propp_functions_to_value(marks: &[ProppFunctionMark]) -> Value {
    Value::Array(
        marks
            .iter()
            .map(|m| {
                json!({
                    "function": m.function,
                    "text_span": span_to_value(m.text_span.as_ref()),
                    "evidence": m.evidence,
                })
            })
            .collect(),
    )
}

pub(crate) fn read_cross_validation(value: Option<&Value>) -> CrossValidationNote {
    let Some(obj) = value.filter(|v| v.is_object()) else {
        return CrossValidationNote::default();
    };
    CrossValidationNote {
        cultural_reading: str_field(obj, "cultural_reading"),
        gender_norms: str_field(obj, "gender_norms"),
        hero_villain_mapping: str_field(obj, "hero_villain_mapping"),
        ambiguous_motifs: str_list(obj.get("ambiguous_motifs")),
    }
}

pub(crate) fn cross_validation_to_value(note: &CrossValidationNote) -> Value {
    json!({
        "cultural_reading": note.cultural_reading,
        "gender_norms": note.gender_norms,
        "hero_villain_mapping": note.hero_villain_mapping,
        "ambiguous_motifs": note.ambiguous_motifs,
    })
}

pub(crate) fn read_qa(value: Option<&Value>) -> QaRecord {
    let Some(obj) = value.filter(|v| v.is_object()) else {
        return QaRecord::default();
    };
    QaRecord {
        difficulty: str_field(obj, "difficulty"),
        uncertain_sections: str_list(obj.get("uncertain_sections")),
        notes: str_field(obj, "notes"),
    }
}

pub(crate) fn qa_to_value(qa: &QaRecord) -> Value {
    json!({
        "difficulty": qa.difficulty,
        "uncertain_sections": qa.uncertain_sections,
        "notes": qa.notes,
    })
}

/// `annotator`, `date_annotated`, `confidence` from a metadata object.
pub(crate) fn read_metadata(value: Option<&Value>) -> AnnotationMetadata {
    let Some(obj) = value else {
        return Default::default();
    };
    AnnotationMetadata {
        annotator: str_field(obj, "annotator"),
        date_annotated: str_field(obj, "date_annotated"),
        confidence: str_field(obj, "confidence"),
    }
}

/// Pick a nested object by key, used by the version readers.
pub(crate) fn child<'a>(obj: &'a Value, key: &str) -> Option<&'a Value> {
    object(obj, key)
}

pub(crate) fn items<'a>(obj: Option<&'a Value>, key: &str) -> &'a [Value] {
    obj.map(|o| array(o, key)).unwrap_or(&[])
}
