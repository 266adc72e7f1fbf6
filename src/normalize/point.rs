//! Rubric point normalization.
//!
//! Accepted raw forms:
//!
//! | Raw entry                                   | Canonical point                          |
//! |---------------------------------------------|------------------------------------------|
//! | `"A point"`                                 | `{text, multiplier: 1.0}`                |
//! | `{contain: "x"}`                            | `{fn: contains, fnArgs: "x", multiplier}` |
//! | `{text: "B", weight: 3, citation: "c1"}`    | `{text, multiplier: 3, citation}`        |
//! | `{fn: "match", arg: "[0-9]+", weight: 0.5}` | `{fn: matches, fnArgs, multiplier: 0.5}` |
//! | `[entry, entry, ...]`                       | each entry, flattened in place           |

use serde_json::{Map, Value};

use crate::alias::{function_key, resolve_function, resolve_keys, AliasScope};
use crate::error::BlueprintError;
use crate::types::point::multiplier_in_range;
use crate::types::{Point, PointKind, DEFAULT_MULTIPLIER};
use crate::validate::type_name;

use super::present;

/// Raw rubric entry, classified by shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawPoint<'a> {
    /// Plain string: a text criterion.
    Text(&'a str),
    /// Nested list of entries.
    Group(&'a [Value]),
    /// Shorthand or full object.
    Object(&'a Map<String, Value>),
    /// Anything else.
    Invalid(&'a Value),
}

impl<'a> RawPoint<'a> {
    /// Classify a raw rubric entry.
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::String(text) => Self::Text(text),
            Value::Array(items) => Self::Group(items),
            Value::Object(object) => Self::Object(object),
            other => Self::Invalid(other),
        }
    }
}

/// Normalize a rubric list.
///
/// `prompt_id` is only used in error messages.
pub fn normalize_points(entries: &[Value], prompt_id: &str) -> Result<Vec<Point>, BlueprintError> {
    let mut points = Vec::with_capacity(entries.len());
    for entry in entries {
        normalize_entry(entry, prompt_id, &mut points)?;
    }
    Ok(points)
}

fn normalize_entry(
    entry: &Value,
    prompt_id: &str,
    points: &mut Vec<Point>,
) -> Result<(), BlueprintError> {
    match RawPoint::classify(entry) {
        RawPoint::Text(text) => points.push(Point::text(text)),
        RawPoint::Group(items) => {
            for item in items {
                normalize_entry(item, prompt_id, points)?;
            }
        }
        RawPoint::Object(object) => points.push(normalize_object(object, prompt_id)?),
        RawPoint::Invalid(value) => {
            return Err(BlueprintError::InvalidPoint {
                prompt_id: prompt_id.to_string(),
                detail: format!(
                    "expected a string, a list or an object, found {}.",
                    type_name(value)
                ),
            })
        }
    }
    Ok(())
}

fn normalize_object(raw: &Map<String, Value>, prompt_id: &str) -> Result<Point, BlueprintError> {
    let object = resolve_keys(AliasScope::Point, raw)?;
    let invalid = |detail: &str| BlueprintError::InvalidPoint {
        prompt_id: prompt_id.to_string(),
        detail: detail.to_string(),
    };

    let mut functions: Vec<(String, Value)> = Vec::new();
    if let Some(name) = present(&object, "fn") {
        let name = name.as_str().ok_or_else(|| invalid("'fn' must be a string."))?;
        let args = object.get("fnArgs").cloned().unwrap_or(Value::Null);
        functions.push((resolve_function(name).to_string(), args));
    } else if object.contains_key("fnArgs") {
        return Err(invalid("'fnArgs' requires 'fn'."));
    }
    for (key, value) in &object {
        if let Some(name) = function_key(key) {
            functions.push((name.to_string(), value.clone()));
        }
    }

    let text = match present(&object, "text") {
        None => None,
        Some(Value::String(text)) => Some(text.clone()),
        Some(_) => return Err(invalid("'text' must be a string.")),
    };

    let kind = match (text, functions.len()) {
        (Some(_), n) if n > 0 => {
            return Err(BlueprintError::TextAndFunction {
                function: functions.swap_remove(0).0,
            })
        }
        (Some(text), _) => PointKind::Text { text },
        (None, 0) => return Err(BlueprintError::EmptyPoint),
        (None, 1) => {
            let (function, args) = functions.swap_remove(0);
            PointKind::Function { function, args }
        }
        (None, _) => {
            return Err(BlueprintError::MultipleFunctions {
                first: functions[0].0.clone(),
                second: functions[1].0.clone(),
            })
        }
    };

    let citation = match present(&object, "citation") {
        None => None,
        Some(Value::String(citation)) => Some(citation.clone()),
        Some(_) => return Err(invalid("'citation' must be a string.")),
    };

    Ok(Point {
        kind,
        multiplier: resolve_multiplier(present(&object, "multiplier"), prompt_id)?,
        citation,
    })
}

fn resolve_multiplier(value: Option<&Value>, prompt_id: &str) -> Result<f64, BlueprintError> {
    let value = match value {
        None => return Ok(DEFAULT_MULTIPLIER),
        Some(value) => value,
    };
    match value.as_f64() {
        Some(multiplier) if multiplier_in_range(multiplier) => Ok(multiplier),
        _ => Err(BlueprintError::MultiplierOutOfRange {
            value: match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            },
            prompt_id: prompt_id.to_string(),
        }),
    }
}
