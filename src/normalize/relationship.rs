//! Relationship reconciliation between legacy flat fields and entry lists
//!
//! On load, relationship data may arrive as a list (`relationships`,
//! `relationship_multi`), a single object (`relationship`), or three flat
//! strings. All of them normalize into an ordered `Vec<RelationshipEntry>`.
//! On emission, `reconcile` decides whether an event fits the single flat
//! triple or needs the multi-relationship representation.

use crate::json::{str_field, str_list};
use crate::model::{NarrativeEvent, RelationshipEntry, TargetType};
use serde_json::Value;

/// Reduce a `"<anything>(<term>)"` label to `term`. Other strings pass
/// through unchanged.
///
/// Full-width parentheses are treated like ASCII ones. Idempotent.
pub fn extract_english(label: &str) -> String {
    let normalized = label.trim().replace('（', "(").replace('）', ")");
    if let Some(body) = normalized.strip_suffix(')') {
        if let Some(open) = body.rfind('(') {
            let inner = body[open + 1..].trim();
            if !inner.is_empty() && !inner.contains('(') {
                return inner.to_string();
            }
        }
    }
    label.to_string()
}

/// How an event's relationships can be represented in flat-field schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipMode {
    Single,
    Multi,
}

/// The three legacy flat relationship fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FlatRelationship {
    pub relationship_level1: String,
    pub relationship_level2: String,
    pub sentiment: String,
}

impl FlatRelationship {
    pub fn from_entry(entry: &RelationshipEntry) -> Self {
        Self {
            relationship_level1: extract_english(&entry.relationship_level1),
            relationship_level2: entry.relationship_level2.clone(),
            sentiment: entry.sentiment.clone(),
        }
    }
}

/// Result of forward reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub mode: RelationshipMode,
    pub entries: Vec<RelationshipEntry>,
}

impl Reconciled {
    /// Flat fields carrying the first entry, or empty fields if there is none.
    pub fn first_flat(&self) -> FlatRelationship {
        self.entries
            .first()
            .map(FlatRelationship::from_entry)
            .unwrap_or_default()
    }

    pub fn is_multi(&self) -> bool {
        self.mode == RelationshipMode::Multi
    }
}

/// Decide the emission mode for an event and the entries it carries.
///
/// Multi mode applies to character-targeted events with more than one
/// agent, target, or relationship entry, and to any event whose only entry
/// names participants other than its first agent and target. A multi-mode
/// event without entries gets exactly one, built from its first agent and
/// target; no agent × target cross product is ever generated. Single mode
/// keeps only the first entry.
pub fn reconcile(event: &NarrativeEvent) -> Reconciled {
    let crowded = event.target_type == TargetType::Character
        && (event.agents.len() > 1 || event.targets.len() > 1 || event.relationships.len() > 1);
    let displaced = match event.relationships.as_slice() {
        [only] => !flat_fields_suffice(event, only),
        _ => false,
    };
    let multi = crowded || displaced;

    let normalized = event.relationships.iter().map(normalize_entry);

    if multi {
        let mut entries: Vec<RelationshipEntry> = normalized.collect();
        if entries.is_empty() {
            entries.push(RelationshipEntry::new(
                event.agents.first().cloned().unwrap_or_default(),
                event.targets.first().cloned().unwrap_or_default(),
            ));
        }
        Reconciled {
            mode: RelationshipMode::Multi,
            entries,
        }
    } else {
        Reconciled {
            mode: RelationshipMode::Single,
            entries: normalized.take(1).collect(),
        }
    }
}

/// Whether flat fields plus the event's first agent and target rebuild
/// `entry`'s participants on read.
pub fn flat_fields_suffice(event: &NarrativeEvent, entry: &RelationshipEntry) -> bool {
    fn first(names: &[String]) -> &str {
        names.first().map(String::as_str).unwrap_or("")
    }
    entry.agent == first(&event.agents) && entry.target == first(&event.targets)
}

/// Apply label extraction to an entry's level-1 code.
pub fn normalize_entry(entry: &RelationshipEntry) -> RelationshipEntry {
    RelationshipEntry {
        relationship_level1: extract_english(&entry.relationship_level1),
        ..entry.clone()
    }
}

fn entry_from_object(obj: &Value) -> RelationshipEntry {
    RelationshipEntry {
        agent: str_field(obj, "agent").trim().to_string(),
        target: str_field(obj, "target").trim().to_string(),
        relationship_level1: extract_english(&str_field(obj, "relationship_level1")),
        relationship_level2: str_field(obj, "relationship_level2"),
        sentiment: str_field(obj, "sentiment"),
    }
}

fn entries_from(value: Option<&Value>) -> Vec<RelationshipEntry> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter(|item| item.is_object())
            .map(entry_from_object)
            .collect(),
        Some(obj @ Value::Object(_)) => vec![entry_from_object(obj)],
        _ => Vec::new(),
    }
}

/// Normalize whatever relationship data a raw event carries.
///
/// A non-empty list wins (`relationships`, then `relationship_multi`),
/// then a single `relationship` object. Otherwise the flat fields yield
/// one entry for the event's first agent and target, provided any of them
/// holds a value. An empty list never hides populated flat fields.
pub fn read_relationships(raw_event: &Value) -> Vec<RelationshipEntry> {
    for key in ["relationships", "relationship_multi", "relationship"] {
        let entries = entries_from(raw_event.get(key));
        if !entries.is_empty() {
            return entries;
        }
    }

    let flat = FlatRelationship {
        relationship_level1: extract_english(&str_field(raw_event, "relationship_level1")),
        relationship_level2: str_field(raw_event, "relationship_level2"),
        sentiment: str_field(raw_event, "sentiment"),
    };
    if flat == FlatRelationship::default() {
        return Vec::new();
    }

    let agents = str_list(raw_event.get("agents"));
    let targets = str_list(raw_event.get("targets"));
    vec![RelationshipEntry {
        agent: agents.into_iter().next().unwrap_or_default(),
        target: targets.into_iter().next().unwrap_or_default(),
        relationship_level1: flat.relationship_level1,
        relationship_level2: flat.relationship_level2,
        sentiment: flat.sentiment,
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EventType;
    use serde_json::json;

    #[test]
    fn extract_english_takes_parenthesized_term() {
        assert_eq!(extract_english("姐妹(sibling)"), "sibling");
        assert_eq!(extract_english("親屬（kinship）"), "kinship");
        assert_eq!(extract_english("sibling"), "sibling");
        assert_eq!(extract_english("a (b) c"), "a (b) c");
        assert_eq!(extract_english("()"), "()");
        assert_eq!(extract_english(""), "");
    }

    #[test]
    fn unmatched_labels_are_left_untouched() {
        assert_eq!(extract_english(" enemy "), " enemy ");
        assert_eq!(extract_english(" 夫妻(spouse) "), "spouse");
    }

    #[test]
    fn extract_english_is_idempotent() {
        for s in ["姐妹(sibling)", "x(y(z))", "plain", "(", "a)", "夫妻(spouse) ", "（）"] {
            let once = extract_english(s);
            assert_eq!(extract_english(&once), once, "input {:?}", s);
        }
    }

    #[test]
    fn multiple_agents_force_multi_mode() {
        let event = NarrativeEvent::new("e", EventType::Struggle)
            .with_agents(["A", "B"])
            .with_targets(["C"]);
        let r = reconcile(&event);
        assert_eq!(r.mode, RelationshipMode::Multi);
        assert_eq!(r.entries, vec![RelationshipEntry::new("A", "C")]);

        let with_many = event
            .with_relationship(RelationshipEntry::new("A", "C"))
            .with_relationship(RelationshipEntry::new("B", "C"));
        assert_eq!(reconcile(&with_many).mode, RelationshipMode::Multi);
    }

    #[test]
    fn object_targets_stay_single_and_truncate() {
        let mut event = NarrativeEvent::new("e", EventType::Other)
            .with_agents(["A", "B"])
            .with_relationship(RelationshipEntry::new("A", "").with_levels("owner", ""))
            .with_relationship(RelationshipEntry::new("B", "").with_levels("thief", ""));
        event.target_type = TargetType::Object;
        let r = reconcile(&event);
        assert_eq!(r.mode, RelationshipMode::Single);
        assert_eq!(r.entries.len(), 1);
        assert_eq!(r.first_flat().relationship_level1, "owner");
    }

    #[test]
    fn lone_entry_with_other_participants_is_multi() {
        let event = NarrativeEvent::new("e", EventType::Villainy)
            .with_targets(["Girl"])
            .with_relationship(
                RelationshipEntry::new("Tiger", "Girl").with_levels("enemy", ""),
            );
        let r = reconcile(&event);
        assert_eq!(r.mode, RelationshipMode::Multi);
        assert_eq!(r.entries[0].agent, "Tiger");

        let matching = NarrativeEvent::new("e", EventType::Villainy)
            .with_agents(["Tiger"])
            .with_targets(["Girl"])
            .with_relationship(RelationshipEntry::new("Tiger", "Girl"));
        assert_eq!(reconcile(&matching).mode, RelationshipMode::Single);
    }

    #[test]
    fn single_mode_without_entries_projects_empty_fields() {
        let event = NarrativeEvent::new("e", EventType::Other).with_agents(["A"]);
        let r = reconcile(&event);
        assert!(r.entries.is_empty());
        assert_eq!(r.first_flat(), FlatRelationship::default());
    }

    #[test]
    fn empty_list_falls_back_to_flat_fields() {
        let raw = json!({
            "relationship_level1": "姐妹(sibling)",
            "agents": ["X"],
            "targets": ["Y"],
            "relationship_multi": []
        });
        let entries = read_relationships(&raw);
        assert_eq!(
            entries,
            vec![RelationshipEntry::new("X", "Y").with_levels("sibling", "")]
        );
    }

    #[test]
    fn non_empty_list_wins_over_flat_fields() {
        let raw = json!({
            "relationship_level1": "enemy",
            "agents": ["X"],
            "targets": ["Y"],
            "relationship_multi": [
                {"agent": "X", "target": "Y", "relationship_level1": "夫妻(spouse)"}
            ]
        });
        let entries = read_relationships(&raw);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].relationship_level1, "spouse");
    }

    #[test]
    fn single_object_is_accepted() {
        let raw = json!({"relationship": {"agent": "X", "target": "Y", "sentiment": "hostile"}});
        let entries = read_relationships(&raw);
        assert_eq!(entries[0].sentiment, "hostile");
    }

    #[test]
    fn no_data_yields_no_entries() {
        let raw = json!({"agents": ["X"], "targets": ["Y"], "relationship_level1": ""});
        assert!(read_relationships(&raw).is_empty());
    }
}
