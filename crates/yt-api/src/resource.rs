use std::collections::HashMap;

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("property path '{path}' conflicts with a non-object value at segment '{segment}'")]
    PathConflict { path: String, segment: String },
}

/// Convert a flat map of dotted property paths into the nested JSON body
/// the API expects. Properties with empty values are omitted entirely, so
/// callers can declare optional fields unconditionally.
pub fn build_resource(properties: &HashMap<String, String>) -> Result<Value, ResourceError> {
    let mut root = Map::new();
    for (path, value) in properties {
        insert_property(&mut root, path, value)?;
    }
    Ok(Value::Object(root))
}

fn insert_property(
    root: &mut Map<String, Value>,
    path: &str,
    value: &str,
) -> Result<(), ResourceError> {
    if value.is_empty() {
        return Ok(());
    }

    let segments: Vec<&str> = path.split('.').collect();

    let mut cursor = root;
    for segment in &segments[..segments.len() - 1] {
        cursor = cursor
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()
            .ok_or_else(|| ResourceError::PathConflict {
                path: path.to_string(),
                segment: segment.to_string(),
            })?;
    }

    let (key, coerced) = coerce(segments[segments.len() - 1], value);
    cursor.insert(key, coerced);
    Ok(())
}

/// Terminal-segment coercion rules, checked in order: `[]` list suffix,
/// `|int` integer suffix, boolean literals, raw string.
fn coerce(key: &str, value: &str) -> (String, Value) {
    if let Some(name) = key.strip_suffix("[]") {
        let items: Vec<Value> = value.split(',').map(Value::from).collect();
        (name.to_string(), Value::Array(items))
    } else if key.len() > 4 && key.ends_with("|int") {
        let name = &key[..key.len() - 4];
        let number = value.parse::<i64>().unwrap_or_else(|_| {
            eprintln!("Warning: property '{name}' expected an integer, got '{value}'; using 0");
            0
        });
        (name.to_string(), Value::from(number))
    } else if value == "true" {
        (key.to_string(), Value::Bool(true))
    } else if value == "false" {
        (key.to_string(), Value::Bool(false))
    } else {
        (key.to_string(), Value::from(value))
    }
}
