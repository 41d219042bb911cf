//! Annotator client and fragment merge
//!
//! An annotator (usually a model-backed service) proposes part of a v3
//! document for a story: characters, events, themes, summaries. The
//! fragment is merged into the canonical document key by key; keys the
//! fragment leaves out keep their current values.

use crate::model::AnnotationDocument;
use crate::schema::common;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

/// Errors from annotator calls and fragment merges.
#[derive(Debug, thiserror::Error)]
pub enum AnnotatorError {
    #[error("annotator not available: {0}")]
    Unavailable(String),
    #[error("annotation request failed: {0}")]
    RequestFailed(String),
    #[error("invalid fragment: {0}")]
    InvalidFragment(String),
}

/// Client trait for an annotation service.
#[async_trait]
pub trait NarrativeAnnotator: Send + Sync {
    /// Propose a v3-shaped fragment for `text`. `context` carries whatever
    /// the caller already knows (title, culture, prior annotation).
    async fn annotate(&self, text: &str, context: &str) -> Result<Value, AnnotatorError>;
}

/// Mock annotator for testing: returns preconfigured fragments by text.
#[derive(Default)]
pub struct MockAnnotator {
    fragments: HashMap<String, Value>,
}

impl MockAnnotator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fragment(mut self, text: impl Into<String>, fragment: Value) -> Self {
        self.fragments.insert(text.into(), fragment);
        self
    }
}

#[async_trait]
impl NarrativeAnnotator for MockAnnotator {
    async fn annotate(&self, text: &str, _context: &str) -> Result<Value, AnnotatorError> {
        self.fragments
            .get(text)
            .cloned()
            .ok_or_else(|| {
                AnnotatorError::RequestFailed(format!("no fragment for {:?}", text))
            })
    }
}

/// Merge a fragment into `doc`. Returns the top-level parts that were replaced.
pub fn merge_fragment(
    doc: &mut AnnotationDocument,
    fragment: &Value,
) -> Result<Vec<&'static str>, AnnotatorError> {
    if !fragment.is_object() {
        return Err(AnnotatorError::InvalidFragment(
            "fragment is not a JSON object".to_string(),
        ));
    }

    let mut replaced = Vec::new();
    if let Some(items) = fragment.get("characters").and_then(Value::as_array) {
        doc.characters = common::read_characters(items);
        replaced.push("characters");
    }
    if let Some(items) = fragment.get("narrative_events").and_then(Value::as_array) {
        doc.narrative_events = common::read_events(items);
        replaced.push("narrative_events");
    }
    if let Some(theme) = fragment.get("themes_and_motifs").filter(|v| v.is_object()) {
        doc.themes = common::read_theme(Some(theme));
        replaced.push("themes_and_motifs");
    }
    if let Some(summaries) = fragment
        .get("analysis")
        .and_then(|a| a.get("paragraph_summaries"))
        .filter(|v| v.is_object())
    {
        doc.summaries = common::read_summaries(Some(summaries));
        replaced.push("paragraph_summaries");
    }

    tracing::debug!(doc = %doc.id, ?replaced, "merged annotator fragment");
    Ok(replaced)
}

/// Ask `annotator` for a fragment covering the document's text and merge it.
pub async fn annotate_document(
    annotator: &dyn NarrativeAnnotator,
    doc: &mut AnnotationDocument,
) -> Result<Vec<&'static str>, AnnotatorError> {
    let context = format!("{} ({})", doc.title, doc.culture);
    let fragment = annotator.annotate(&doc.source.text, &context).await?;
    merge_fragment(doc, &fragment)
}
