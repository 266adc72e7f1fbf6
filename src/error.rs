//! Error taxonomy for blueprint parsing.
//!
//! Every failure is synchronous and deterministic: the same input always
//! yields the same error. Messages name the offending value and, where one is
//! resolvable, the owning prompt id.

use crate::alias::AliasScope;
use crate::reader::Syntax;
use crate::validate::{SchemaMode, SchemaViolation};

/// Error returned by [`crate::parse_and_normalize`] and its building blocks.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BlueprintError {
    /// The text is not valid YAML/JSON.
    #[error("Failed to parse {syntax} blueprint: {message}.")]
    Syntax {
        /// Syntax the text was read as.
        syntax: Syntax,
        /// Underlying reader message.
        message: String,
    },

    /// No non-empty document was found.
    #[error("Blueprint is empty.")]
    Empty,

    /// The document tree matches none of the accepted blueprint shapes.
    #[error("{0}")]
    Structure(String),

    /// An object carries two keys that resolve to the same canonical name.
    #[error("{scope} cannot define both '{first}' and '{second}' (both mean '{canonical}').")]
    AliasConflict {
        /// Where the object sits.
        scope: AliasScope,
        /// Canonical field name.
        canonical: String,
        /// First key as written.
        first: String,
        /// Second key as written.
        second: String,
    },

    /// A point has both `text` and a function.
    #[error("Point cannot have both 'text' and a function ('{function}') defined.")]
    TextAndFunction {
        /// The function name found alongside `text`.
        function: String,
    },

    /// A point names more than one function.
    #[error("Point cannot have more than one function defined ('{first}' and '{second}').")]
    MultipleFunctions {
        /// First function name.
        first: String,
        /// Second function name.
        second: String,
    },

    /// A point object has neither text nor a function.
    #[error("Point object must have 'text', 'fn', or an idiomatic function name.")]
    EmptyPoint,

    /// A point multiplier is not a number in `[0.1, 10]`.
    #[error(
        "Point multiplier must be a number between 0.1 and 10. Found {value}. Prompt ID: '{prompt_id}'."
    )]
    MultiplierOutOfRange {
        /// The offending value as written.
        value: String,
        /// Owning prompt.
        prompt_id: String,
    },

    /// A rubric entry has an unusable shape or field type.
    #[error("Invalid point in prompt '{prompt_id}': {detail}")]
    InvalidPoint {
        /// Owning prompt.
        prompt_id: String,
        /// What is wrong.
        detail: String,
    },

    /// A shorthand message object does not have exactly one role key.
    #[error(
        "Each message in the shorthand format must have exactly one key (e.g., 'user', 'assistant', 'ai', 'system')."
    )]
    MessageShorthand,

    /// A message has an unusable role or content.
    #[error("Invalid message at index {index} in prompt '{prompt_id}': {detail}")]
    InvalidMessage {
        /// Owning prompt.
        prompt_id: String,
        /// Position in `messages`.
        index: usize,
        /// What is wrong.
        detail: String,
    },

    /// A prompt has both `promptText` and `messages`.
    #[error("Prompt '{prompt_id}' cannot have both 'promptText' and 'messages'.")]
    PromptInputConflict {
        /// Offending prompt.
        prompt_id: String,
    },

    /// A prompt has neither `promptText` nor `messages`.
    #[error("Prompt '{prompt_id}' must contain 'promptText' or 'messages'.")]
    MissingPromptInput {
        /// Offending prompt.
        prompt_id: String,
    },

    /// A prompt entry is not an object.
    #[error("Prompt at index {index} is not a valid object.")]
    InvalidPrompt {
        /// Position in the prompt stream.
        index: usize,
    },

    /// A prompt or header field has the wrong type.
    #[error("Field '{field}' in {owner} must be {expected}.")]
    InvalidField {
        /// `prompt 'id'` or `the blueprint header`.
        owner: String,
        /// Field name.
        field: String,
        /// Expected type, e.g. `a string`.
        expected: &'static str,
    },

    /// Schema validation found one or more violations.
    #[error("Blueprint failed {mode} schema validation: {}", join_violations(.violations))]
    Schema {
        /// Which schema was applied.
        mode: SchemaMode,
        /// Every violation found.
        violations: Vec<SchemaViolation>,
    },
}

fn join_violations(violations: &[SchemaViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl BlueprintError {
    /// Wrap a reader error.
    pub fn syntax(syntax: Syntax, error: impl std::fmt::Display) -> Self {
        Self::Syntax {
            syntax,
            message: error.to_string(),
        }
    }

    /// Stable machine-readable error code.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Syntax { .. } => "SYNTAX_ERROR",
            Self::Empty => "EMPTY_BLUEPRINT",
            Self::Structure(_) => "STRUCTURE_ERROR",
            Self::AliasConflict { .. } => "ALIAS_CONFLICT",
            Self::TextAndFunction { .. } | Self::MultipleFunctions { .. } => "POINT_CONFLICT",
            Self::EmptyPoint => "EMPTY_POINT",
            Self::MultiplierOutOfRange { .. } => "MULTIPLIER_OUT_OF_RANGE",
            Self::InvalidPoint { .. } => "INVALID_POINT",
            Self::MessageShorthand => "MESSAGE_SHORTHAND",
            Self::InvalidMessage { .. } => "INVALID_MESSAGE",
            Self::PromptInputConflict { .. } => "PROMPT_INPUT_CONFLICT",
            Self::MissingPromptInput { .. } => "MISSING_PROMPT_INPUT",
            Self::InvalidPrompt { .. } => "INVALID_PROMPT",
            Self::InvalidField { .. } => "INVALID_FIELD",
            Self::Schema { .. } => "SCHEMA_VIOLATION",
        }
    }

    /// Schema violations carried by this error (empty for other kinds).
    pub fn violations(&self) -> &[SchemaViolation] {
        match self {
            Self::Schema { violations, .. } => violations,
            _ => &[],
        }
    }
}
