//! Canonical prompt type.

use serde::{Deserialize, Serialize};

use super::message::Message;
use super::point::Point;

/// What is sent to the model: a single-turn text or a multi-turn conversation.
///
/// Serialized as a `promptText` or a `messages` field on the prompt, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PromptInput {
    /// Single-turn prompt text.
    #[serde(rename = "promptText")]
    Text(String),
    /// Ordered conversation turns.
    #[serde(rename = "messages")]
    Messages(Vec<Message>),
}

impl PromptInput {
    /// Prompt text, if single-turn.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Messages(_) => None,
        }
    }

    /// Conversation turns, if multi-turn.
    pub fn messages(&self) -> Option<&[Message]> {
        match self {
            Self::Messages(messages) => Some(messages),
            Self::Text(_) => None,
        }
    }
}

/// A canonical prompt with its rubric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    /// Unique id within the blueprint (generated when the author omits it).
    pub id: String,
    /// Prompt text or messages.
    #[serde(flatten)]
    pub input: PromptInput,
    /// Reference answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ideal: Option<String>,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Source reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation: Option<String>,
    /// System prompt override for this prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Positive rubric.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub should: Vec<Point>,
    /// Negative rubric.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub should_not: Vec<Point>,
    /// Prompt-level score multiplier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl Prompt {
    /// Create a prompt with no rubric or optional fields.
    pub fn new(id: impl Into<String>, input: PromptInput) -> Self {
        Self {
            id: id.into(),
            input,
            ideal: None,
            description: None,
            citation: None,
            system: None,
            should: Vec::new(),
            should_not: Vec::new(),
            weight: None,
        }
    }

    /// Prompt text, if single-turn.
    pub fn prompt_text(&self) -> Option<&str> {
        self.input.text()
    }

    /// Conversation turns, if multi-turn.
    pub fn messages(&self) -> Option<&[Message]> {
        self.input.messages()
    }

    /// Whether the id was derived from content rather than written by the author.
    pub fn has_generated_id(&self) -> bool {
        crate::fingerprint::is_generated_id(&self.id)
    }

    /// Total number of rubric points.
    pub fn point_count(&self) -> usize {
        self.should.len() + self.should_not.len()
    }
}
