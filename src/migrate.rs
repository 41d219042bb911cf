//! Explicit, one-shot document migrations
//!
//! Readers never invent data. Anything generated (event ids, dates) is
//! assigned here, on request, so the change is visible in the saved file.

use crate::model::AnnotationDocument;
use chrono::NaiveDate;
use uuid::Uuid;

const EVENT_ID_PREFIX: &str = "evt-";

/// Assign `evt-<uuid>` ids to events whose id is blank. Returns the count assigned.
pub fn backfill_event_ids(doc: &mut AnnotationDocument) -> usize {
    let mut assigned = 0;
    for event in doc
        .narrative_events
        .iter_mut()
        .filter(|e| e.id.trim().is_empty())
    {
        event.id = format!("{}{}", EVENT_ID_PREFIX, Uuid::new_v4());
        assigned += 1;
    }
    if assigned > 0 {
        tracing::info!(doc = %doc.id, assigned, "backfilled event ids");
    }
    assigned
}

/// Set `metadata.date_annotated` when it is blank. Returns whether it changed.
pub fn stamp_missing_date(doc: &mut AnnotationDocument, date: NaiveDate) -> bool {
    if !doc.metadata.date_annotated.trim().is_empty() {
        return false;
    }
    doc.metadata.date_annotated = date.format("%Y-%m-%d").to_string();
    true
}
