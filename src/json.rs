//! Small accessors and mutators over untyped JSON documents.
//!
//! Migration transforms work on `serde_json::Value` trees whose shape is not
//! known in advance; these helpers keep the type checks in one place.

use serde_json::{Map, Value};

use crate::error::TransformError;

/// Human-readable JSON type name used in error messages.
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Unwrap a document into its top-level object map.
pub fn into_object(value: Value) -> Result<Map<String, Value>, TransformError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(TransformError::new(format!(
            "expected an object document, got {}",
            kind_name(&other)
        ))),
    }
}

/// Read the top-level string `version` field, if any.
pub fn version_field(value: &Value) -> Option<&str> {
    value.get("version").and_then(Value::as_str)
}

/// Keep only the string elements of an array value; anything else is empty.
pub fn string_items(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Get `key` as a mutable object, replacing a missing or non-object value
/// with an empty object first.
pub fn object_entry<'a>(map: &'a mut Map<String, Value>, key: &str) -> &'a mut Map<String, Value> {
    let slot = map
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    match slot {
        Value::Object(inner) => inner,
        _ => unreachable!("slot was just replaced with an object"),
    }
}

/// Get `key` as a mutable array if it is one.
pub fn array_mut<'a>(map: &'a mut Map<String, Value>, key: &str) -> Option<&'a mut Vec<Value>> {
    map.get_mut(key).and_then(Value::as_array_mut)
}

/// Insert `value` under `key` only when the key is absent.
pub fn insert_default(map: &mut Map<String, Value>, key: &str, value: Value) {
    map.entry(key.to_string()).or_insert(value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_name_covers_every_variant() {
        assert_eq!(kind_name(&json!(null)), "null");
        assert_eq!(kind_name(&json!(true)), "boolean");
        assert_eq!(kind_name(&json!(1.5)), "number");
        assert_eq!(kind_name(&json!("x")), "string");
        assert_eq!(kind_name(&json!([])), "array");
        assert_eq!(kind_name(&json!({})), "object");
    }

    #[test]
    fn into_object_rejects_non_objects() {
        let err = into_object(json!([1, 2])).unwrap_err();
        assert_eq!(err.to_string(), "expected an object document, got array");
        assert!(into_object(json!({"a": 1})).is_ok());
    }

    #[test]
    fn string_items_drops_non_strings() {
        let value = json!(["a", 1, null, "b", {"id": "c"}]);
        assert_eq!(string_items(Some(&value)), vec!["a", "b"]);
        assert!(string_items(Some(&json!("a"))).is_empty());
        assert!(string_items(None).is_empty());
    }

    #[test]
    fn object_entry_replaces_scalars() {
        let mut map = into_object(json!({"settings": 3})).unwrap();
        object_entry(&mut map, "settings").insert("theme".into(), json!("dark"));
        object_entry(&mut map, "fresh").insert("k".into(), json!(1));

        assert_eq!(
            Value::Object(map),
            json!({"settings": {"theme": "dark"}, "fresh": {"k": 1}})
        );
    }

    #[test]
    fn version_field_ignores_non_string_versions() {
        assert_eq!(version_field(&json!({"version": "v0.3.0"})), Some("v0.3.0"));
        assert_eq!(version_field(&json!({"version": 3})), None);
        assert_eq!(version_field(&json!({})), None);
    }
}
