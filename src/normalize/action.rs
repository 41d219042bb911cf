//! Flat action fields ↔ nested action layer

use crate::json::{object, str_field};
use crate::model::ActionLayer;
use serde_json::{json, Map, Value};

/// Legacy flat keys, in layer field order.
pub const FLAT_ACTION_KEYS: [&str; 5] = [
    "action_category",
    "action_type",
    "action_context",
    "action_status",
    "narrative_function",
];

/// The five flat action fields used by v1/v2 events.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FlatAction {
    pub action_category: String,
    pub action_type: String,
    pub action_context: String,
    pub action_status: String,
    pub narrative_function: String,
}

impl FlatAction {
    /// Read flat fields off a raw event. Missing or null fields are empty.
    pub fn from_raw(raw_event: &Value) -> Self {
        Self {
            action_category: str_field(raw_event, "action_category"),
            action_type: str_field(raw_event, "action_type"),
            action_context: str_field(raw_event, "action_context"),
            action_status: str_field(raw_event, "action_status"),
            narrative_function: str_field(raw_event, "narrative_function"),
        }
    }

    /// Write all five fields into an event object.
    pub fn write_into(&self, obj: &mut Map<String, Value>) {
        obj.insert("action_category".into(), json!(self.action_category));
        obj.insert("action_type".into(), json!(self.action_type));
        obj.insert("action_context".into(), json!(self.action_context));
        obj.insert("action_status".into(), json!(self.action_status));
        obj.insert("narrative_function".into(), json!(self.narrative_function));
    }
}

pub fn encode(flat: &FlatAction) -> ActionLayer {
    ActionLayer {
        category: flat.action_category.clone(),
        action_type: flat.action_type.clone(),
        context: flat.action_context.clone(),
        status: flat.action_status.clone(),
        function: flat.narrative_function.clone(),
    }
}

pub fn decode(layer: &ActionLayer) -> FlatAction {
    FlatAction {
        action_category: layer.category.clone(),
        action_type: layer.action_type.clone(),
        action_context: layer.context.clone(),
        action_status: layer.status.clone(),
        narrative_function: layer.function.clone(),
    }
}

/// Read the action layer of a raw event in any version.
///
/// A nested `action_layer` takes precedence field by field; flat fields
/// fill whatever the nested layer leaves missing.
pub fn read_action_layer(raw_event: &Value) -> ActionLayer {
    let mut layer = encode(&FlatAction::from_raw(raw_event));
    let Some(nested) = object(raw_event, "action_layer") else {
        return layer;
    };
    let overlay = |target: &mut String, key: &str| {
        if nested.get(key).map_or(false, |v| !v.is_null()) {
            *target = str_field(nested, key);
        }
    };
    overlay(&mut layer.category, "category");
    overlay(&mut layer.action_type, "type");
    overlay(&mut layer.context, "context");
    overlay(&mut layer.status, "status");
    overlay(&mut layer.function, "function");
    layer
}

pub fn layer_to_value(layer: &ActionLayer) -> Value {
    json!({
        "category": layer.category,
        "type": layer.action_type,
        "context": layer.context,
        "status": layer.status,
        "function": layer.function,
    })
}
