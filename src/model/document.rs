//! AnnotationDocument: the canonical, version-agnostic annotation of one story

use super::event::{NarrativeEvent, TextSpan};
use super::evidence::EvidenceMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The story text and where it came from.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SourceText {
    pub text: String,
    pub language: String,
    #[serde(rename = "type")]
    pub text_type: String,
    pub reference_uri: String,
}

impl SourceText {
    /// Length in characters, the unit spans are measured in.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Who annotated the story, when, and how sure they were.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnnotationMetadata {
    pub annotator: String,
    /// ISO date (`YYYY-MM-DD`), empty when unknown.
    pub date_annotated: String,
    pub confidence: String,
}

/// Thematic classification, each label list backed by an evidence map.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ThemeProfile {
    pub ending_type: String,
    pub key_values: Vec<String>,
    pub motif_type: Vec<String>,
    pub atu_categories: Vec<String>,
    pub motif_evidence: EvidenceMap,
    pub atu_evidence: EvidenceMap,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CharacterProfile {
    pub name: String,
    pub alias: String,
    pub archetype: String,
}

impl CharacterProfile {
    pub fn new(name: impl Into<String>, archetype: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: String::new(),
            archetype: archetype.into(),
        }
    }
}

/// A Propp function located in the text.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProppFunctionMark {
    pub function: String,
    pub text_span: Option<TextSpan>,
    pub evidence: String,
}

/// Summaries keyed by section key (`S{start}-{end}`) plus the whole-story summary.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SummarySet {
    pub per_section: BTreeMap<String, String>,
    pub whole: String,
}

impl SummarySet {
    pub fn for_section(&self, key: &str) -> Option<&str> {
        self.per_section
            .get(key)
            .map(String::as_str)
            .filter(|s| !s.trim().is_empty())
    }
}

/// Annotator's reflection on interpretive bias.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CrossValidationNote {
    pub cultural_reading: String,
    pub gender_norms: String,
    pub hero_villain_mapping: String,
    pub ambiguous_motifs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QaRecord {
    pub difficulty: String,
    pub uncertain_sections: Vec<String>,
    pub notes: String,
}

/// The single live annotation of one story.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnnotationDocument {
    pub id: String,
    pub culture: String,
    pub title: String,
    pub metadata: AnnotationMetadata,
    pub source: SourceText,
    pub themes: ThemeProfile,
    pub characters: Vec<CharacterProfile>,
    pub narrative_events: Vec<NarrativeEvent>,
    pub propp_functions: Vec<ProppFunctionMark>,
    pub propp_notes: String,
    pub summaries: SummarySet,
    pub cross_validation: CrossValidationNote,
    pub qa: QaRecord,
}

impl AnnotationDocument {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        culture: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            culture: culture.into(),
            ..Default::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.source.text = text.into();
        self
    }

    pub fn character(&self, name: &str) -> Option<&CharacterProfile> {
        self.characters.iter().find(|c| c.name == name)
    }

    /// Agent/target names that have no matching character profile.
    pub fn unknown_participants(&self) -> Vec<&str> {
        let mut unknown: Vec<&str> = Vec::new();
        for event in &self.narrative_events {
            for name in event.agents.iter().chain(event.targets.iter()) {
                if self.character(name).is_none() && !unknown.contains(&name.as_str()) {
                    unknown.push(name);
                }
            }
        }
        unknown
    }
}
