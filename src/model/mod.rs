//! Canonical in-memory annotation model
//!
//! Every on-disk schema version reads into these types and is written back
//! out of them. Nothing here knows about versions.

mod document;
mod event;
mod evidence;

pub use document::{
    AnnotationDocument, AnnotationMetadata, CharacterProfile, CrossValidationNote,
    ProppFunctionMark, QaRecord, SourceText, SummarySet, ThemeProfile,
};
pub use event::{
    ActionLayer, EventType, NarrativeEvent, RelationshipEntry, TargetType, TextSpan,
};
pub use evidence::{EvidenceMap, WHOLE_SUMMARY_KEY};
