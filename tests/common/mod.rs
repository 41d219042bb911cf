//! Shared fixtures for the integration tests
//!
//! One story, "The Tiger Aunt", in canonical form and in each on-disk
//! version. The raw fixtures are exactly what the writers emit, so
//! `write(read(raw)) == raw` holds for each.

#![allow(dead_code)]

use folkmark::model::{
    CharacterProfile, CrossValidationNote, ProppFunctionMark, QaRecord, SourceText,
};
use folkmark::{AnnotationDocument, EventType, NarrativeEvent, RelationshipEntry, TextSpan};
use serde_json::{json, Value};

pub const TALE_TEXT: &str =
    "The tiger aunt knocked at night. She ate the boy. The girl fled up a tree and poured hot oil.";

pub const ARRIVAL: (i64, i64) = (0, 32);
pub const DEVOURING: (i64, i64) = (33, 49);
pub const ESCAPE: (i64, i64) = (50, 93);

/// Text between two character offsets of `TALE_TEXT`.
pub fn slice(bounds: (i64, i64)) -> String {
    TALE_TEXT
        .chars()
        .skip(bounds.0 as usize)
        .take((bounds.1 - bounds.0) as usize)
        .collect()
}

pub fn span(bounds: (i64, i64)) -> TextSpan {
    TextSpan::new(bounds.0, bounds.1, slice(bounds))
}

/// Canonical document with single-relationship events only.
pub fn tiger_aunt() -> AnnotationDocument {
    let mut doc = AnnotationDocument::new("tiger_aunt", "The Tiger Aunt", "Taiwan");
    doc.metadata.annotator = "lin".into();
    doc.metadata.date_annotated = "2024-03-09".into();
    doc.metadata.confidence = "high".into();
    doc.source = SourceText {
        text: TALE_TEXT.into(),
        language: "en".into(),
        text_type: "folktale".into(),
        reference_uri: String::new(),
    };
    doc.characters = vec![
        CharacterProfile {
            name: "Tiger Aunt".into(),
            alias: "Grandaunt".into(),
            archetype: "villain".into(),
        },
        CharacterProfile::new("Girl", "hero"),
        CharacterProfile::new("Boy", "victim"),
    ];

    let mut devouring = NarrativeEvent::new("e2", EventType::Villainy)
        .with_span(span(DEVOURING))
        .with_agents(["Tiger Aunt"])
        .with_targets(["Boy"])
        .with_time_order(2)
        .with_relationship(
            RelationshipEntry::new("Tiger Aunt", "Boy")
                .with_levels("predator", "false_kin")
                .with_sentiment("hostile"),
        );
    devouring.description = "The tiger aunt eats the boy".into();
    devouring.action_layer.category = "violence".into();
    devouring.action_layer.action_type = "devour".into();
    devouring.action_layer.status = "success".into();
    devouring.action_layer.function = "villainy".into();

    let mut escape = NarrativeEvent::new("e3", EventType::Victory)
        .with_span(span(ESCAPE))
        .with_agents(["Girl"])
        .with_targets(["Tiger Aunt"])
        .with_time_order(3)
        .with_relationship(
            RelationshipEntry::new("Girl", "Tiger Aunt")
                .with_levels("enemy", "")
                .with_sentiment("defiant"),
        );
    escape.description = "The girl kills the tiger aunt with hot oil".into();
    escape.instrument = Some("hot oil".into());
    escape.action_layer.category = "cunning".into();
    escape.action_layer.action_type = "trap".into();
    escape.action_layer.context = "up a tree".into();
    escape.action_layer.status = "success".into();
    escape.action_layer.function = "victory".into();

    doc.narrative_events = vec![devouring, escape];

    doc.themes.ending_type = "HAPPY".into();
    doc.themes.key_values = vec!["cleverness".into()];
    doc.themes.motif_type = vec!["K311".into()];
    doc.themes.atu_categories = vec!["ATU 333".into()];
    doc.themes.motif_evidence.set_keys("K311", ["S33-49"]);
    doc.themes
        .atu_evidence
        .set_keys("ATU 333", ["__WHOLE_SUMMARY__", "S50-93"]);

    doc.propp_functions = vec![ProppFunctionMark {
        function: "A".into(),
        text_span: Some(span(DEVOURING)),
        evidence: "the boy is eaten".into(),
    }];
    doc.summaries
        .per_section
        .insert("S33-49".into(), "The boy is eaten.".into());
    doc.summaries.whole = "A girl outwits a tiger aunt.".into();
    doc.cross_validation = CrossValidationNote {
        cultural_reading: "cautionary tale about strangers".into(),
        gender_norms: String::new(),
        hero_villain_mapping: "girl / tiger aunt".into(),
        ambiguous_motifs: vec![],
    };
    doc.qa = QaRecord {
        difficulty: "medium".into(),
        uncertain_sections: vec!["S50-93".into()],
        notes: String::new(),
    };
    doc
}

fn span_value(bounds: (i64, i64)) -> Value {
    json!({"start": bounds.0, "end": bounds.1, "text": slice(bounds)})
}

fn event_core(
    id: &str,
    event_type: &str,
    bounds: (i64, i64),
    description: &str,
    agents: &[&str],
    targets: &[&str],
    instrument: &str,
    time_order: i64,
) -> serde_json::Map<String, Value> {
    let value = json!({
        "id": id,
        "text_span": span_value(bounds),
        "event_type": event_type,
        "description": description,
        "agents": agents,
        "targets": targets,
        "target_type": "character",
        "object_type": "",
        "instrument": instrument,
        "time_order": time_order,
    });
    match value {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

fn arrival_core() -> serde_json::Map<String, Value> {
    event_core(
        "e1",
        "DECEPTION",
        ARRIVAL,
        "The tiger aunt poses as a relative",
        &["Tiger Aunt"],
        &["Girl", "Boy"],
        "",
        1,
    )
}

fn devouring_core() -> serde_json::Map<String, Value> {
    event_core(
        "e2",
        "VILLAINY",
        DEVOURING,
        "The tiger aunt eats the boy",
        &["Tiger Aunt"],
        &["Boy"],
        "",
        2,
    )
}

fn escape_core() -> serde_json::Map<String, Value> {
    event_core(
        "e3",
        "VICTORY",
        ESCAPE,
        "The girl kills the tiger aunt with hot oil",
        &["Girl"],
        &["Tiger Aunt"],
        "hot oil",
        3,
    )
}

fn extend(mut core: serde_json::Map<String, Value>, extra: Value) -> Value {
    if let Value::Object(extra) = extra {
        core.extend(extra);
    }
    Value::Object(core)
}

fn arrival_relationships() -> Value {
    json!([
        {"agent": "Tiger Aunt", "target": "Girl", "relationship_level1": "kin",
         "relationship_level2": "false_kin", "sentiment": "deceptive"},
        {"agent": "Tiger Aunt", "target": "Boy", "relationship_level1": "guardian",
         "relationship_level2": "pretend_guardian", "sentiment": "greedy"}
    ])
}

fn characters_value() -> Value {
    json!([
        {"name": "Tiger Aunt", "alias": "Grandaunt", "archetype": "villain"},
        {"name": "Girl", "alias": "", "archetype": "hero"},
        {"name": "Boy", "alias": "", "archetype": "victim"}
    ])
}

fn propp_value() -> Value {
    json!([{"function": "A", "text_span": span_value(DEVOURING), "evidence": "the boy is eaten"}])
}

fn summaries_value() -> Value {
    json!({"per_section": {"S33-49": "The boy is eaten."}, "whole": "A girl outwits a tiger aunt."})
}

fn reflection_value() -> Value {
    json!({
        "cultural_reading": "cautionary tale about strangers",
        "gender_norms": "",
        "hero_villain_mapping": "girl / tiger aunt",
        "ambiguous_motifs": []
    })
}

fn qa_value() -> Value {
    json!({"difficulty": "medium", "uncertain_sections": ["S50-93"], "notes": ""})
}

fn themes_value() -> Value {
    json!({
        "ending_type": "HAPPY",
        "key_values": ["cleverness"],
        "motif_type": ["K311"],
        "atu_categories": ["ATU 333"],
        "motif_evidence": {"K311": {"evidence_keys": ["S33-49"]}},
        "atu_evidence": {"ATU 333": {"evidence_keys": ["__WHOLE_SUMMARY__", "S50-93"]}}
    })
}

fn nested(version: &str, events: Vec<Value>) -> Value {
    json!({
        "version": version,
        "metadata": {
            "id": "tiger_aunt",
            "title": "The Tiger Aunt",
            "culture": "Taiwan",
            "annotator": "lin",
            "date_annotated": "2024-03-09",
            "confidence": "high"
        },
        "source_info": {
            "language": "en",
            "type": "folktale",
            "reference_uri": "",
            "text_content": TALE_TEXT
        },
        "characters": characters_value(),
        "narrative_events": events,
        "themes_and_motifs": themes_value(),
        "analysis": {
            "propp_functions": propp_value(),
            "propp_notes": "",
            "paragraph_summaries": summaries_value(),
            "bias_reflection": reflection_value(),
            "qa_notes": qa_value()
        }
    })
}

/// v3 document; event `e1` has two relationship entries.
pub fn v3_fixture() -> Value {
    let events = vec![
        extend(
            arrival_core(),
            json!({
                "relationships": arrival_relationships(),
                "action_layer": {"category": "deception", "type": "disguise",
                                 "context": "night visit", "status": "success",
                                 "function": "trickery"}
            }),
        ),
        extend(
            devouring_core(),
            json!({
                "relationships": [{"agent": "Tiger Aunt", "target": "Boy",
                                   "relationship_level1": "predator",
                                   "relationship_level2": "false_kin", "sentiment": "hostile"}],
                "action_layer": {"category": "violence", "type": "devour", "context": "",
                                 "status": "success", "function": "villainy"}
            }),
        ),
        extend(
            escape_core(),
            json!({
                "relationships": [{"agent": "Girl", "target": "Tiger Aunt",
                                   "relationship_level1": "enemy",
                                   "relationship_level2": "", "sentiment": "defiant"}],
                "action_layer": {"category": "cunning", "type": "trap", "context": "up a tree",
                                 "status": "success", "function": "victory"}
            }),
        ),
    ];
    nested("3.0", events)
}

/// v2 document; `e1` is in multi mode.
pub fn v2_fixture() -> Value {
    let events = vec![
        extend(
            arrival_core(),
            json!({
                "relationship_multi": arrival_relationships(),
                "relationship_level1": "", "relationship_level2": "", "sentiment": "",
                "action_category": "deception", "action_type": "disguise",
                "action_context": "night visit", "action_status": "success",
                "narrative_function": "trickery"
            }),
        ),
        extend(
            devouring_core(),
            json!({
                "relationship_level1": "predator", "relationship_level2": "false_kin",
                "sentiment": "hostile",
                "action_category": "violence", "action_type": "devour",
                "action_context": "", "action_status": "success",
                "narrative_function": "villainy"
            }),
        ),
        extend(
            escape_core(),
            json!({
                "relationship_level1": "enemy", "relationship_level2": "", "sentiment": "defiant",
                "action_category": "cunning", "action_type": "trap",
                "action_context": "up a tree", "action_status": "success",
                "narrative_function": "victory"
            }),
        ),
    ];
    nested("2.0", events)
}

/// v1 document; `e1` carries only its first relationship.
pub fn v1_fixture() -> Value {
    let events = vec![
        extend(
            arrival_core(),
            json!({
                "relationship_level1": "kin", "relationship_level2": "false_kin",
                "sentiment": "deceptive",
                "action_category": "deception", "action_type": "disguise",
                "action_context": "night visit", "action_status": "success",
                "narrative_function": "trickery"
            }),
        ),
        extend(
            devouring_core(),
            json!({
                "relationship_level1": "predator", "relationship_level2": "false_kin",
                "sentiment": "hostile",
                "action_category": "violence", "action_type": "devour",
                "action_context": "", "action_status": "success",
                "narrative_function": "villainy"
            }),
        ),
        extend(
            escape_core(),
            json!({
                "relationship_level1": "enemy", "relationship_level2": "", "sentiment": "defiant",
                "action_category": "cunning", "action_type": "trap",
                "action_context": "up a tree", "action_status": "success",
                "narrative_function": "victory"
            }),
        ),
    ];
    json!({
        "id": "tiger_aunt",
        "culture": "Taiwan",
        "title": "The Tiger Aunt",
        "source_text": {
            "text": TALE_TEXT,
            "language": "en",
            "type": "folktale",
            "reference_uri": ""
        },
        "metadata": {"annotator": "lin", "date_annotated": "2024-03-09", "confidence": "high"},
        "annotation": {
            "characters": characters_value(),
            "motif": themes_value(),
            "deep": {
                "paragraph_summaries": summaries_value(),
                "propp_functions": propp_value(),
                "propp_notes": ""
            }
        },
        "narrative_structure": events,
        "cross_validation": reflection_value(),
        "qa": qa_value()
    })
}
