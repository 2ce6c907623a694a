//! Response shapes accepted from the backend.
//!
//! List endpoints answer either with a bare JSON array or with an envelope
//! `{success, message, data, pagination}` carrying the array under `data`.
//! Single-record endpoints do the same with an object.

use serde_json::Value;

/// Always yields an array: bare arrays pass through, `{data: [...]}` is
/// unwrapped, anything else is empty.
pub fn normalize_collection(body: Value) -> Vec<Value> {
    match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Unwraps `{data: {...}}`; other bodies are returned as they are.
pub fn unwrap_record(body: Value) -> Value {
    match body {
        Value::Object(mut map) if matches!(map.get("data"), Some(Value::Object(_))) => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Human-readable message carried by an error body, if any.
pub fn error_message(body: &Value) -> Option<String> {
    ["message", "msg", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_array() {
        let items = normalize_collection(json!([{"id": 1}, {"id": 2}]));
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["id"], 1);
    }

    #[test]
    fn test_envelope() {
        let items = normalize_collection(json!({
            "success": true,
            "data": [{"id": "a"}],
            "pagination": {"page": 1, "limit": 1000}
        }));
        assert_eq!(items, vec![json!({"id": "a"})]);
    }

    #[test]
    fn test_anything_else_is_empty() {
        assert!(normalize_collection(json!({"data": {"id": 1}})).is_empty());
        assert!(normalize_collection(json!({"items": []})).is_empty());
        assert!(normalize_collection(json!("oops")).is_empty());
        assert!(normalize_collection(Value::Null).is_empty());
    }

    #[test]
    fn test_unwrap_record() {
        assert_eq!(unwrap_record(json!({"success": true, "data": {"id": 1}})), json!({"id": 1}));
        assert_eq!(unwrap_record(json!({"id": 1, "data": "Date: x"})), json!({"id": 1, "data": "Date: x"}));
        assert_eq!(unwrap_record(Value::Null), Value::Null);
    }

    #[test]
    fn test_error_message() {
        assert_eq!(error_message(&json!({"msg": "Signup failed"})).as_deref(), Some("Signup failed"));
        assert_eq!(error_message(&json!({"message": "nope"})).as_deref(), Some("nope"));
        assert_eq!(error_message(&json!([1])), None);
    }
}
