//! Lenient accessors over `serde_json::Value`
//!
//! Persisted documents come from several generations of tooling. These
//! helpers read what is there and fall back to empty values for anything
//! missing or mistyped, never failing.

use serde_json::Value;

/// A string field. Numbers and booleans are stringified; anything else is empty.
pub(crate) fn str_field(obj: &Value, key: &str) -> String {
    obj.get(key).map(scalar_to_string).unwrap_or_default()
}

/// A string field that is absent when missing, null, or blank.
pub(crate) fn opt_str_field(obj: &Value, key: &str) -> Option<String> {
    let s = str_field(obj, key);
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

pub(crate) fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// A list of strings. A bare scalar becomes a one-element list; blank
/// entries are dropped and duplicates removed in first-seen order.
pub(crate) fn str_list(value: Option<&Value>) -> Vec<String> {
    let raw: Vec<String> = match value {
        Some(Value::Array(items)) => items.iter().map(scalar_to_string).collect(),
        Some(v @ (Value::String(_) | Value::Number(_))) => vec![scalar_to_string(v)],
        _ => Vec::new(),
    };
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for item in raw {
        let item = item.trim().to_string();
        if !item.is_empty() && !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

/// An integer. Integral floats and numeric strings are accepted.
pub(crate) fn as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

pub(crate) fn int_field(obj: &Value, key: &str) -> Option<i64> {
    obj.get(key).and_then(as_int)
}

/// The named child if it is an object.
pub(crate) fn object<'a>(obj: &'a Value, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| v.is_object())
}

/// The named child's array items, or nothing.
pub(crate) fn array<'a>(obj: &'a Value, key: &str) -> &'a [Value] {
    obj.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// A string → string map; non-string values are stringified, blanks kept.
pub(crate) fn str_map(value: Option<&Value>) -> Vec<(String, String)> {
    match value {
        Some(Value::Object(map)) => map
            .iter()
            .map(|(k, v)| (k.clone(), scalar_to_string(v)))
            .collect(),
        _ => Vec::new(),
    }
}
