//! Text sections derived from narrative event spans
//!
//! Sections are never persisted. They are recomputed from the event list on
//! every read, one per distinct `(start, end)` interval, and identified by
//! the key `S{start}-{end}`.

use crate::model::{NarrativeEvent, SummarySet};
use std::collections::{BTreeSet, HashMap};

/// A disjointly-keyed slice of the source text backed by one or more events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSection {
    pub start: usize,
    pub end: usize,
    /// Event numbers that contributed this interval, ascending.
    pub event_numbers: Vec<i64>,
    /// `N{n1,n2,...}` over `event_numbers`.
    pub display_label: String,
    /// The literal text `[start, end)`.
    pub text: String,
}

impl TextSection {
    pub fn key(&self) -> String {
        section_key(self.start, self.end)
    }

    pub fn char_len(&self) -> usize {
        self.end - self.start
    }
}

/// The evidence key for an interval.
pub fn section_key(start: usize, end: usize) -> String {
    format!("S{}-{}", start, end)
}

/// Parse a section key back into its bounds.
pub fn parse_section_key(key: &str) -> Option<(usize, usize)> {
    let rest = key.strip_prefix('S')?;
    let (start, end) = rest.split_once('-')?;
    let start = start.parse().ok()?;
    let end = end.parse().ok()?;
    (end > start).then_some((start, end))
}

struct Accumulator {
    start: usize,
    end: usize,
    first_seen: usize,
    numbers: BTreeSet<i64>,
}

/// Derive the ordered, de-duplicated section list for a set of events.
///
/// Events without a span, or whose span is empty or inverted after
/// clamping to the text, contribute nothing. Events sharing an exact
/// interval fold into one section. Output is ordered by `start`, ties by
/// the order the interval was first seen.
pub fn derive_sections(events: &[NarrativeEvent], full_text: &str) -> Vec<TextSection> {
    let chars: Vec<char> = full_text.chars().collect();
    let len = chars.len() as i64;

    let mut by_key: HashMap<(usize, usize), Accumulator> = HashMap::new();

    for (index, event) in events.iter().enumerate() {
        let Some(span) = &event.text_span else {
            continue;
        };
        let start = span.start.clamp(0, len);
        let end = span.end.clamp(0, len);
        if end <= start {
            tracing::debug!(
                event_id = %event.id,
                start = span.start,
                end = span.end,
                "skipping empty or inverted span"
            );
            continue;
        }
        let (start, end) = (start as usize, end as usize);
        let number = event.time_order.unwrap_or(index as i64 + 1);
        let first_seen = by_key.len();
        by_key
            .entry((start, end))
            .or_insert_with(|| Accumulator {
                start,
                end,
                first_seen,
                numbers: BTreeSet::new(),
            })
            .numbers
            .insert(number);
    }

    let mut accumulators: Vec<Accumulator> = by_key.into_values().collect();
    accumulators.sort_by_key(|a| (a.start, a.first_seen));

    accumulators
        .into_iter()
        .map(|acc| {
            let event_numbers: Vec<i64> = acc.numbers.into_iter().collect();
            let display_label = format!(
                "N{}",
                event_numbers
                    .iter()
                    .map(|n| n.to_string())
                    .collect::<Vec<_>>()
                    .join(",")
            );
            TextSection {
                start: acc.start,
                end: acc.end,
                event_numbers,
                display_label,
                text: chars[acc.start..acc.end].iter().collect(),
            }
        })
        .collect()
}

/// Per-section summary keys that no derived section carries any more.
///
/// A key is stale when it does not parse as `S{start}-{end}` or when no
/// section has those bounds, typically after event spans were edited.
pub fn stale_summary_keys<'a>(
    sections: &[TextSection],
    summaries: &'a SummarySet,
) -> Vec<&'a str> {
    summaries
        .per_section
        .keys()
        .filter(|key| match parse_section_key(key) {
            Some((start, end)) => !sections.iter().any(|s| s.start == start && s.end == end),
            None => true,
        })
        .map(String::as_str)
        .collect()
}
