//! NarrativeEvent and its nested value types

use serde::{Deserialize, Serialize};

/// Half-open character interval `[start, end)` into the source text.
///
/// Offsets count Unicode scalar values, not bytes. Bounds are kept exactly
/// as read; clamping and validation happen at section derivation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSpan {
    pub start: i64,
    pub end: i64,
    #[serde(default)]
    pub text: String,
}

impl TextSpan {
    pub fn new(start: i64, end: i64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }
}

/// Closed set of narrative event kinds.
///
/// Values not in the set read as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    Villainy,
    Lack,
    Departure,
    Test,
    HelperGift,
    Guidance,
    Struggle,
    Victory,
    Pursuit,
    Rescue,
    Deception,
    Recognition,
    Transformation,
    Punishment,
    Wedding,
    Return,
    #[default]
    Other,
}

impl EventType {
    pub const ALL: [EventType; 17] = [
        EventType::Villainy,
        EventType::Lack,
        EventType::Departure,
        EventType::Test,
        EventType::HelperGift,
        EventType::Guidance,
        EventType::Struggle,
        EventType::Victory,
        EventType::Pursuit,
        EventType::Rescue,
        EventType::Deception,
        EventType::Recognition,
        EventType::Transformation,
        EventType::Punishment,
        EventType::Wedding,
        EventType::Return,
        EventType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Villainy => "VILLAINY",
            EventType::Lack => "LACK",
            EventType::Departure => "DEPARTURE",
            EventType::Test => "TEST",
            EventType::HelperGift => "HELPER_GIFT",
            EventType::Guidance => "GUIDANCE",
            EventType::Struggle => "STRUGGLE",
            EventType::Victory => "VICTORY",
            EventType::Pursuit => "PURSUIT",
            EventType::Rescue => "RESCUE",
            EventType::Deception => "DECEPTION",
            EventType::Recognition => "RECOGNITION",
            EventType::Transformation => "TRANSFORMATION",
            EventType::Punishment => "PUNISHMENT",
            EventType::Wedding => "WEDDING",
            EventType::Return => "RETURN",
            EventType::Other => "OTHER",
        }
    }

    /// Parse a persisted value. Case-insensitive; unknown values yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL.into_iter().find(|t| t.as_str() == upper)
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the event's targets are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    #[default]
    Character,
    Object,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::Character => "character",
            TargetType::Object => "object",
        }
    }

    /// Anything other than `"object"` is a character target.
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("object") {
            TargetType::Object
        } else {
            TargetType::Character
        }
    }
}

/// One agent → target relationship on a narrative event.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RelationshipEntry {
    #[serde(default)]
    pub agent: String,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub relationship_level1: String,
    #[serde(default)]
    pub relationship_level2: String,
    #[serde(default)]
    pub sentiment: String,
}

impl RelationshipEntry {
    pub fn new(agent: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            target: target.into(),
            ..Default::default()
        }
    }

    pub fn with_levels(mut self, level1: impl Into<String>, level2: impl Into<String>) -> Self {
        self.relationship_level1 = level1.into();
        self.relationship_level2 = level2.into();
        self
    }

    pub fn with_sentiment(mut self, sentiment: impl Into<String>) -> Self {
        self.sentiment = sentiment.into();
        self
    }
}

/// Nested action description. All five fields are always present.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActionLayer {
    #[serde(default)]
    pub category: String,
    #[serde(default, rename = "type")]
    pub action_type: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub function: String,
}

impl ActionLayer {
    pub fn is_empty(&self) -> bool {
        self.category.is_empty()
            && self.action_type.is_empty()
            && self.context.is_empty()
            && self.status.is_empty()
            && self.function.is_empty()
    }
}

/// A narrative event marked up by an annotator.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NarrativeEvent {
    /// Opaque, assigned once at creation. Empty until backfilled.
    pub id: String,
    pub text_span: Option<TextSpan>,
    pub event_type: EventType,
    pub description: String,
    /// Character names, deduplicated in first-seen order.
    pub agents: Vec<String>,
    pub targets: Vec<String>,
    pub target_type: TargetType,
    pub object_type: Option<String>,
    pub instrument: Option<String>,
    pub time_order: Option<i64>,
    pub relationships: Vec<RelationshipEntry>,
    pub action_layer: ActionLayer,
}

impl NarrativeEvent {
    pub fn new(id: impl Into<String>, event_type: EventType) -> Self {
        Self {
            id: id.into(),
            event_type,
            ..Default::default()
        }
    }

    pub fn with_span(mut self, span: TextSpan) -> Self {
        self.text_span = Some(span);
        self
    }

    pub fn with_agents<I, S>(mut self, agents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.agents = agents.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.targets = targets.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_time_order(mut self, order: i64) -> Self {
        self.time_order = Some(order);
        self
    }

    pub fn with_relationship(mut self, entry: RelationshipEntry) -> Self {
        self.relationships.push(entry);
        self
    }
}
