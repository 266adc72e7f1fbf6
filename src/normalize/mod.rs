//! Normalizers from raw author values to canonical types.
//!
//! Each raw node is classified into a small tagged variant first
//! ([`RawPoint`], [`RawMessage`]) and every normalizer dispatches on that tag.
//! Alias resolution always runs before a normalizer reads an object.

pub mod header;
pub mod message;
pub mod point;
pub mod prompt;

use serde_json::{Map, Value};

use crate::error::BlueprintError;

pub use header::normalize_header;
pub use message::{normalize_messages, RawMessage};
pub use point::{normalize_points, RawPoint};
pub use prompt::normalize_prompt;

/// Field value, treating an explicit `null` as absent.
pub(crate) fn present<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object.get(key).filter(|value| !value.is_null())
}

/// Optional string field; any other non-null type is an error.
pub(crate) fn optional_string(
    object: &Map<String, Value>,
    key: &str,
    owner: &str,
) -> Result<Option<String>, BlueprintError> {
    match present(object, key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(invalid_field(owner, key, "a string")),
    }
}

/// Optional numeric field.
pub(crate) fn optional_number(
    object: &Map<String, Value>,
    key: &str,
    owner: &str,
) -> Result<Option<f64>, BlueprintError> {
    match present(object, key) {
        None => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .ok_or_else(|| invalid_field(owner, key, "a number")),
    }
}

/// An id written as a string or a bare number.
pub(crate) fn optional_id(
    object: &Map<String, Value>,
    owner: &str,
) -> Result<Option<String>, BlueprintError> {
    let id = match present(object, "id") {
        None => return Ok(None),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(_) => return Err(invalid_field(owner, "id", "a non-empty string")),
    };
    if id.is_empty() {
        return Err(invalid_field(owner, "id", "a non-empty string"));
    }
    Ok(Some(id))
}

pub(crate) fn invalid_field(owner: &str, field: &str, expected: &'static str) -> BlueprintError {
    BlueprintError::InvalidField {
        owner: owner.to_string(),
        field: field.to_string(),
        expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_null_is_absent() {
        let map = object(json!({"ideal": null}));
        assert_eq!(optional_string(&map, "ideal", "prompt 'p'").unwrap(), None);
    }

    #[test]
    fn test_wrong_type_names_owner_and_field() {
        let map = object(json!({"ideal": 3}));
        let err = optional_string(&map, "ideal", "prompt 'p1'").unwrap_err();
        assert_eq!(err.to_string(), "Field 'ideal' in prompt 'p1' must be a string.");
    }

    #[test]
    fn test_numeric_id_is_stringified() {
        let map = object(json!({"id": 42}));
        assert_eq!(optional_id(&map, "prompt").unwrap(), Some("42".to_string()));

        let map = object(json!({"id": "  "}));
        assert!(optional_id(&map, "prompt").is_err());
    }
}
