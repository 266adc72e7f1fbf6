//! Prompt normalization.

use serde_json::{Map, Value};
use tracing::trace;

use crate::alias::{resolve_keys, AliasScope};
use crate::error::BlueprintError;
use crate::fingerprint::generate_prompt_id;
use crate::types::{Point, Prompt, PromptInput};

use super::message::normalize_messages;
use super::point::normalize_points;
use super::{invalid_field, optional_id, optional_number, optional_string, present};

/// Normalize one raw prompt entry.
///
/// `index` is the entry's position in the prompt stream. Until an id is
/// known, errors name the prompt `index-<n>`.
pub fn normalize_prompt(raw: &Value, index: usize) -> Result<Prompt, BlueprintError> {
    let object = match raw {
        Value::Object(object) => resolve_keys(AliasScope::Prompt, object)?,
        _ => return Err(BlueprintError::InvalidPrompt { index }),
    };

    let explicit_id = optional_id(&object, &format!("prompt at index {}", index))?;
    let label = explicit_id
        .clone()
        .unwrap_or_else(|| format!("index-{}", index));
    let owner = format!("prompt '{}'", label);

    let input = prompt_input(&object, &label, &owner)?;
    let ideal = optional_string(&object, "ideal", &owner)?;
    let should = rubric(&object, "should", &label, &owner)?;
    let should_not = rubric(&object, "should_not", &label, &owner)?;

    let id = match explicit_id {
        Some(id) => id,
        None => {
            let id = generate_prompt_id(&input, ideal.as_deref(), &should, &should_not);
            trace!(index, id = %id, "Generated prompt id");
            id
        }
    };

    Ok(Prompt {
        id,
        input,
        ideal,
        description: optional_string(&object, "description", &owner)?,
        citation: optional_string(&object, "citation", &owner)?,
        system: optional_string(&object, "system", &owner)?,
        should,
        should_not,
        weight: optional_number(&object, "weight", &owner)?,
    })
}

fn prompt_input(
    object: &Map<String, Value>,
    label: &str,
    owner: &str,
) -> Result<PromptInput, BlueprintError> {
    match (present(object, "promptText"), present(object, "messages")) {
        (Some(_), Some(_)) => Err(BlueprintError::PromptInputConflict {
            prompt_id: label.to_string(),
        }),
        (None, None) => Err(BlueprintError::MissingPromptInput {
            prompt_id: label.to_string(),
        }),
        (Some(Value::String(text)), None) => Ok(PromptInput::Text(text.clone())),
        (Some(_), None) => Err(invalid_field(owner, "promptText", "a string")),
        (None, Some(Value::Array(entries))) if !entries.is_empty() => {
            Ok(PromptInput::Messages(normalize_messages(entries, label)?))
        }
        (None, Some(_)) => Err(invalid_field(owner, "messages", "a non-empty list")),
    }
}

fn rubric(
    object: &Map<String, Value>,
    key: &str,
    label: &str,
    owner: &str,
) -> Result<Vec<Point>, BlueprintError> {
    match present(object, key) {
        None => Ok(Vec::new()),
        Some(Value::Array(entries)) => normalize_points(entries, label),
        Some(_) => Err(invalid_field(owner, key, "a list")),
    }
}
