//! Tolerant field accessors
//!
//! The same field arrives as a JSON number from the JSON API and as a
//! string from the XML one; these accessors accept both.

use crate::decode::extract_items;
use crate::types::{JsonObject, JsonValue};

/// String view of a scalar field; empty strings count as absent
pub(crate) fn string(obj: &JsonObject, key: &str) -> Option<String> {
    scalar_string(obj.get(key)?)
}

pub(crate) fn scalar_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub(crate) fn u32_field(obj: &JsonObject, key: &str) -> Option<u32> {
    match obj.get(key)? {
        JsonValue::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn u64_field(obj: &JsonObject, key: &str) -> Option<u64> {
    match obj.get(key)? {
        JsonValue::Number(n) => n.as_u64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn bool_field(obj: &JsonObject, key: &str) -> Option<bool> {
    match obj.get(key)? {
        JsonValue::Bool(b) => Some(*b),
        JsonValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        JsonValue::Number(n) => n.as_u64().map(|n| n != 0),
        _ => None,
    }
}

pub(crate) fn object<'a>(obj: &'a JsonObject, key: &str) -> Option<&'a JsonObject> {
    obj.get(key).and_then(JsonValue::as_object)
}

/// Object items of a collection block
pub(crate) fn objects(obj: &JsonObject, key: &str) -> Vec<JsonObject> {
    extract_items(obj.get(key))
        .into_iter()
        .filter_map(|item| match item {
            JsonValue::Object(map) => Some(map),
            _ => None,
        })
        .collect()
}

/// Items of a collection block, whatever their shape
pub(crate) fn values(obj: &JsonObject, key: &str) -> Vec<JsonValue> {
    extract_items(obj.get(key))
}

/// Text list from a block of strings or `{name|text}` objects
pub(crate) fn text_list(obj: &JsonObject, key: &str) -> Vec<String> {
    values(obj, key)
        .iter()
        .filter_map(|item| match item {
            JsonValue::Object(map) => string(map, "name")
                .or_else(|| string(map, "text"))
                .or_else(|| string(map, "date")),
            other => scalar_string(other),
        })
        .collect()
}
