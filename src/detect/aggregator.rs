//! Evidence aggregation across text sections
//!
//! One detection request is issued per derived text section (its summary,
//! or its raw text when no summary exists), plus an optional request for
//! the whole-story summary. For each label only the best-scoring section is
//! kept as evidence. Labels only the whole summary produced get the
//! whole-summary sentinel.
//!
//! The per-section batch is all-or-nothing: if any request fails, the
//! remaining ones are aborted and nothing is merged.

use super::detector::{Detection, DetectorError, EvidenceDetector, LabelScore};
use crate::config::DetectionConfig;
use crate::model::{
    AnnotationDocument, EvidenceMap, NarrativeEvent, SummarySet, ThemeProfile, WHOLE_SUMMARY_KEY,
};
use crate::normalize::derive_sections;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Errors that abort an aggregation run
#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("detection failed for section {section_key}: {source}")]
    SectionFailed {
        section_key: String,
        source: DetectorError,
    },

    #[error("whole-summary detection failed: {0}")]
    WholeSummaryFailed(#[source] DetectorError),

    #[error("detection task failed: {0}")]
    Join(String),
}

/// One planned per-section detection request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRequest {
    pub section_key: String,
    pub text: String,
    /// True when `text` is the section's raw text rather than its summary.
    pub from_raw_text: bool,
}

/// Plan the per-section requests, longest request text first, capped at `max`.
///
/// Sections without a summary fall back to their raw text; no section is
/// skipped for lack of a summary. Equal lengths keep section order.
pub fn plan_requests(
    events: &[NarrativeEvent],
    full_text: &str,
    summaries: &SummarySet,
    max: usize,
) -> Vec<SectionRequest> {
    let mut requests: Vec<SectionRequest> = derive_sections(events, full_text)
        .into_iter()
        .map(|section| {
            let key = section.key();
            match summaries.for_section(&key) {
                Some(summary) => SectionRequest {
                    text: summary.to_string(),
                    section_key: key,
                    from_raw_text: false,
                },
                None => SectionRequest {
                    text: section.text,
                    section_key: key,
                    from_raw_text: true,
                },
            }
        })
        .collect();

    requests.sort_by(|a, b| b.text.chars().count().cmp(&a.text.chars().count()));
    if requests.len() > max {
        tracing::debug!(
            planned = requests.len(),
            kept = max,
            "truncating section requests to the longest texts"
        );
        requests.truncate(max);
    }
    requests
}

/// A label chosen for a theme axis with its single best evidence key.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredLabel {
    pub label: String,
    pub similarity: f32,
    pub evidence_key: String,
}

/// Merged result for both theme axes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedEvidence {
    pub atu: Vec<ScoredLabel>,
    pub motifs: Vec<ScoredLabel>,
    pub sections_queried: usize,
    pub whole_summary_queried: bool,
}

fn evidence_map(labels: &[ScoredLabel]) -> EvidenceMap {
    labels
        .iter()
        .map(|l| (l.label.clone(), vec![l.evidence_key.clone()]))
        .collect()
}

fn apply_axis(labels: &[ScoredLabel], selected: &mut Vec<String>, evidence: &mut EvidenceMap) {
    for scored in labels {
        if !selected.contains(&scored.label) {
            selected.push(scored.label.clone());
        }
        evidence.set_keys(scored.label.clone(), [scored.evidence_key.clone()]);
    }
}

impl AggregatedEvidence {
    pub fn atu_evidence(&self) -> EvidenceMap {
        evidence_map(&self.atu)
    }

    pub fn motif_evidence(&self) -> EvidenceMap {
        evidence_map(&self.motifs)
    }

    /// Add detected labels to a theme profile and replace their evidence.
    ///
    /// Labels already selected keep their position; others are appended.
    pub fn apply_to(&self, theme: &mut ThemeProfile) {
        apply_axis(
            &self.atu,
            &mut theme.atu_categories,
            &mut theme.atu_evidence,
        );
        apply_axis(
            &self.motifs,
            &mut theme.motif_type,
            &mut theme.motif_evidence,
        );
    }
}

/// Keep each label's best section, fill in whole-summary-only labels, rank.
fn merge_axis<'a>(
    section_hits: impl Iterator<Item = (&'a str, &'a [LabelScore])>,
    whole_hits: &[LabelScore],
    max_labels: usize,
) -> Vec<ScoredLabel> {
    let mut order: Vec<String> = Vec::new();
    let mut best: HashMap<String, (f32, String)> = HashMap::new();

    for (key, hits) in section_hits {
        for hit in hits.iter().filter(|h| !h.label.trim().is_empty()) {
            match best.get_mut(&hit.label) {
                Some(current) => {
                    if hit.similarity > current.0 {
                        *current = (hit.similarity, key.to_string());
                    }
                }
                None => {
                    order.push(hit.label.clone());
                    best.insert(hit.label.clone(), (hit.similarity, key.to_string()));
                }
            }
        }
    }

    for hit in whole_hits.iter().filter(|h| !h.label.trim().is_empty()) {
        match best.get_mut(&hit.label) {
            Some(current) => {
                if current.1 == WHOLE_SUMMARY_KEY && hit.similarity > current.0 {
                    current.0 = hit.similarity;
                }
            }
            None => {
                order.push(hit.label.clone());
                best.insert(
                    hit.label.clone(),
                    (hit.similarity, WHOLE_SUMMARY_KEY.to_string()),
                );
            }
        }
    }

    let mut ranked: Vec<ScoredLabel> = order
        .into_iter()
        .filter_map(|label| {
            best.remove(&label).map(|(similarity, evidence_key)| ScoredLabel {
                label,
                similarity,
                evidence_key,
            })
        })
        .collect();
    // Stable: ties keep first-seen order.
    ranked.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    ranked.truncate(max_labels);
    ranked
}

/// Runs detection over a document's sections and merges the results.
pub struct EvidenceAggregator {
    detector: Arc<dyn EvidenceDetector>,
    config: DetectionConfig,
}

impl EvidenceAggregator {
    pub fn new(detector: Arc<dyn EvidenceDetector>) -> Self {
        Self {
            detector,
            config: DetectionConfig::default(),
        }
    }

    pub fn with_config(mut self, config: DetectionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    pub async fn aggregate(
        &self,
        doc: &AnnotationDocument,
    ) -> Result<AggregatedEvidence, AggregationError> {
        self.aggregate_parts(&doc.narrative_events, &doc.source.text, &doc.summaries)
            .await
    }

    pub async fn aggregate_parts(
        &self,
        events: &[NarrativeEvent],
        full_text: &str,
        summaries: &SummarySet,
    ) -> Result<AggregatedEvidence, AggregationError> {
        let requests = plan_requests(
            events,
            full_text,
            summaries,
            self.config.max_section_requests,
        );
        let section_results = self.run_sections(&requests).await?;

        let whole = summaries.whole.trim();
        let whole_result = if self.config.include_whole_summary && !whole.is_empty() {
            Some(
                self.detector
                    .detect(whole, self.config.top_k)
                    .await
                    .map_err(AggregationError::WholeSummaryFailed)?,
            )
        } else {
            None
        };

        let empty = Detection::default();
        let whole_detection = whole_result.as_ref().unwrap_or(&empty);

        let atu = merge_axis(
            requests
                .iter()
                .zip(&section_results)
                .map(|(r, d)| (r.section_key.as_str(), d.atu.as_slice())),
            &whole_detection.atu,
            self.config.max_labels,
        );
        let motifs = merge_axis(
            requests
                .iter()
                .zip(&section_results)
                .map(|(r, d)| (r.section_key.as_str(), d.motifs.as_slice())),
            &whole_detection.motifs,
            self.config.max_labels,
        );

        tracing::info!(
            sections = requests.len(),
            atu = atu.len(),
            motifs = motifs.len(),
            "evidence aggregation complete"
        );

        Ok(AggregatedEvidence {
            atu,
            motifs,
            sections_queried: requests.len(),
            whole_summary_queried: whole_result.is_some(),
        })
    }

    /// Issue all section requests concurrently, bounded by `max_in_flight`.
    ///
    /// Results come back in request order. The first failure aborts the
    /// rest of the batch.
    async fn run_sections(
        &self,
        requests: &[SectionRequest],
    ) -> Result<Vec<Detection>, AggregationError> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_in_flight.max(1)));
        let mut tasks: JoinSet<(usize, Result<Detection, DetectorError>)> = JoinSet::new();

        for (index, request) in requests.iter().enumerate() {
            let detector = Arc::clone(&self.detector);
            let semaphore = Arc::clone(&semaphore);
            let text = request.text.clone();
            let top_k = self.config.top_k;
            tasks.spawn(async move {
                let outcome = match semaphore.acquire_owned().await {
                    Ok(_permit) => detector.detect(&text, top_k).await,
                    Err(e) => Err(DetectorError::RequestFailed(format!("semaphore: {}", e))),
                };
                (index, outcome)
            });
        }

        let mut results: Vec<Option<Detection>> = vec![None; requests.len()];
        while let Some(joined) = tasks.join_next().await {
            let (index, outcome) = joined.map_err(|e| AggregationError::Join(e.to_string()))?;
            match outcome {
                Ok(detection) => results[index] = Some(detection),
                Err(source) => {
                    tasks.abort_all();
                    let section_key = requests[index].section_key.clone();
                    tracing::warn!(
                        section = %section_key,
                        error = %source,
                        "section detection failed"
                    );
                    return Err(AggregationError::SectionFailed {
                        section_key,
                        source,
                    });
                }
            }
        }

        results
            .into_iter()
            .enumerate()
            .map(|(index, r)| {
                r.ok_or_else(|| {
                    AggregationError::Join(format!(
                        "no result for section {}",
                        requests[index].section_key
                    ))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hits(pairs: &[(&str, f32)]) -> Vec<LabelScore> {
        pairs.iter().map(|(l, s)| LabelScore::new(*l, *s)).collect()
    }

    #[test]
    fn best_section_wins_per_label() {
        let a = hits(&[("ATU 313", 0.6)]);
        let b = hits(&[("ATU 313", 0.8)]);
        let merged = merge_axis(
            vec![("S0-10", a.as_slice()), ("S10-20", b.as_slice())].into_iter(),
            &[],
            5,
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].evidence_key, "S10-20");
        assert_eq!(merged[0].similarity, 0.8);
    }

    #[test]
    fn whole_summary_only_labels_use_sentinel() {
        let a = hits(&[("ATU 313", 0.6)]);
        let whole = hits(&[("ATU 313", 0.9), ("ATU 510A", 0.5)]);
        let merged = merge_axis(vec![("S0-10", a.as_slice())].into_iter(), &whole, 5);
        assert_eq!(merged[0].label, "ATU 313");
        assert_eq!(merged[0].evidence_key, "S0-10");
        assert_eq!(merged[1].label, "ATU 510A");
        assert_eq!(merged[1].evidence_key, WHOLE_SUMMARY_KEY);
    }

    #[test]
    fn ranking_is_descending_with_first_seen_ties_and_truncated() {
        let a = hits(&[("x", 0.5), ("y", 0.7), ("z", 0.5), ("w", 0.1)]);
        let merged = merge_axis(vec![("S0-1", a.as_slice())].into_iter(), &[], 3);
        let labels: Vec<&str> = merged.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, vec!["y", "x", "z"]);
    }

    #[test]
    fn nan_score_does_not_disturb_ranking_of_others() {
        let a = hits(&[("low", 0.5), ("broken", f32::NAN), ("high", 0.9)]);
        let merged = merge_axis(vec![("S0-1", a.as_slice())].into_iter(), &[], 5);
        let finite: Vec<&str> = merged
            .iter()
            .filter(|l| !l.similarity.is_nan())
            .map(|l| l.label.as_str())
            .collect();
        assert_eq!(finite, vec!["high", "low"]);
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn plan_prefers_longest_texts_and_falls_back_to_raw() {
        use crate::model::{EventType, TextSpan};
        let text = "abcdefghijklmnopqrstuvwxyz";
        let events = vec![
            NarrativeEvent::new("a", EventType::Other).with_span(TextSpan::new(0, 2, "")),
            NarrativeEvent::new("b", EventType::Other).with_span(TextSpan::new(2, 10, "")),
            NarrativeEvent::new("c", EventType::Other).with_span(TextSpan::new(10, 12, "")),
        ];
        let mut summaries = SummarySet::default();
        summaries.per_section.insert(
            "S10-12".into(),
            "a much longer summary than the raw text".into(),
        );

        let plan = plan_requests(&events, text, &summaries, 2);
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].section_key, "S10-12");
        assert!(!plan[0].from_raw_text);
        assert_eq!(plan[1].section_key, "S2-10");
        assert_eq!(plan[1].text, "cdefghij");
        assert!(plan[1].from_raw_text);
    }

    #[test]
    fn apply_appends_labels_and_replaces_evidence() {
        let mut theme = ThemeProfile::default();
        theme.atu_categories.push("ATU 313".into());
        theme.atu_evidence.insert_key("ATU 313", "S0-1");
        let aggregated = AggregatedEvidence {
            atu: vec![
                ScoredLabel {
                    label: "ATU 510A".into(),
                    similarity: 0.9,
                    evidence_key: "S4-9".into(),
                },
                ScoredLabel {
                    label: "ATU 313".into(),
                    similarity: 0.8,
                    evidence_key: "S9-12".into(),
                },
            ],
            ..Default::default()
        };
        aggregated.apply_to(&mut theme);
        assert_eq!(theme.atu_categories, vec!["ATU 313", "ATU 510A"]);
        assert_eq!(theme.atu_evidence.keys_for("ATU 313"), ["S9-12"]);
        assert_eq!(theme.atu_evidence.keys_for("ATU 510A"), ["S4-9"]);
    }
}
