//! Conversation message normalization.

use serde_json::{Map, Value};

use crate::alias::message_shorthand_role;
use crate::error::BlueprintError;
use crate::types::{Message, Role};

/// Raw message entry, classified by shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawMessage<'a> {
    /// `{role, content}`.
    Full {
        /// Raw role value.
        role: &'a Value,
        /// Raw content value.
        content: &'a Value,
    },
    /// `{user: "..."}` and friends.
    Shorthand {
        /// Role named by the single key.
        role: Role,
        /// Raw content value.
        content: &'a Value,
    },
    /// An object matching neither form.
    Malformed,
    /// Not an object at all.
    NotAnObject(&'a Value),
}

impl<'a> RawMessage<'a> {
    /// Classify a raw message entry.
    pub fn classify(value: &'a Value) -> Self {
        let object = match value {
            Value::Object(object) => object,
            other => return Self::NotAnObject(other),
        };
        if let (Some(role), Some(content)) = (object.get("role"), object.get("content")) {
            return Self::Full { role, content };
        }
        Self::classify_shorthand(object)
    }

    fn classify_shorthand(object: &'a Map<String, Value>) -> Self {
        let mut entries = object.iter();
        match (entries.next(), entries.next()) {
            (Some((key, content)), None) => match message_shorthand_role(key) {
                Some(role) => Self::Shorthand { role, content },
                None => Self::Malformed,
            },
            _ => Self::Malformed,
        }
    }
}

/// Normalize a message list, preserving order.
pub fn normalize_messages(
    entries: &[Value],
    prompt_id: &str,
) -> Result<Vec<Message>, BlueprintError> {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| normalize_message(entry, index, prompt_id))
        .collect()
}

fn normalize_message(entry: &Value, index: usize, prompt_id: &str) -> Result<Message, BlueprintError> {
    let invalid = |detail: String| BlueprintError::InvalidMessage {
        prompt_id: prompt_id.to_string(),
        index,
        detail,
    };

    let (role, content) = match RawMessage::classify(entry) {
        RawMessage::Full { role, content } => {
            let name = role
                .as_str()
                .ok_or_else(|| invalid("'role' must be a string.".to_string()))?;
            let role = Role::from_str(name).ok_or_else(|| {
                invalid(format!(
                    "unknown role '{}'; expected 'system', 'user' or 'assistant'.",
                    name
                ))
            })?;
            (role, content)
        }
        RawMessage::Shorthand { role, content } => (role, content),
        RawMessage::Malformed => return Err(BlueprintError::MessageShorthand),
        RawMessage::NotAnObject(_) => {
            return Err(invalid("each message must be an object.".to_string()))
        }
    };

    let content = match content {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        _ => return Err(invalid("'content' must be a string or null.".to_string())),
    };

    Ok(Message { role, content })
}
