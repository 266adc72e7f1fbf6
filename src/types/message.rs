//! Conversation turn types for multi-turn prompts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instruction.
    System,
    /// User message.
    User,
    /// Assistant/AI response.
    Assistant,
}

impl Role {
    /// Parse role from string.
    ///
    /// Matching is case-insensitive and `ai` is accepted for `assistant`.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "system" => Some(Self::System),
            "user" => Some(Self::User),
            "assistant" | "ai" => Some(Self::Assistant),
            _ => None,
        }
    }

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::User
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single canonical conversation turn.
///
/// `content` may be `None` for a turn whose text is supplied later (for
/// example an assistant turn the model is expected to fill). The normalizer
/// does not enforce non-null content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Message {
    /// Author of the turn.
    pub role: Role,
    /// Turn text.
    pub content: Option<String>,
}

impl Message {
    /// Create a message with text content.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
        }
    }

    /// Create a message without content.
    pub fn empty(role: Role) -> Self {
        Self { role, content: None }
    }

    /// Shorthand for a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Shorthand for a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Shorthand for an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!(Role::from_str("user"), Some(Role::User));
        assert_eq!(Role::from_str("ASSISTANT"), Some(Role::Assistant));
        assert_eq!(Role::from_str("ai"), Some(Role::Assistant));
        assert_eq!(Role::from_str("tool"), None);
    }

    #[test]
    fn test_message_serializes_null_content() {
        let json = serde_json::to_value(Message::empty(Role::Assistant)).unwrap();
        assert_eq!(json, serde_json::json!({"role": "assistant", "content": null}));
    }

    #[test]
    fn test_message_round_trips_role_names() {
        let message: Message =
            serde_json::from_value(serde_json::json!({"role": "system", "content": "S"})).unwrap();
        assert_eq!(message, Message::system("S"));
    }
}
