//! Canonical blueprint and header types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::prompt::Prompt;
use crate::canonical::canonical_hash_hex;

/// Reference to a model: a plain id or a provider-specific config object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModelRef {
    /// Model id such as `openai:gpt-4o`.
    Id(String),
    /// Model configuration object.
    Config(Map<String, Value>),
}

impl ModelRef {
    /// The model id, when given as a plain string or an `id` field.
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Id(id) => Some(id),
            Self::Config(config) => config.get("id").and_then(Value::as_str),
        }
    }
}

/// Blueprint-level fields. All optional; a prompts-only blueprint has none.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlueprintHeader {
    /// Advisory id. Deprecated: identity is assigned at deployment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// What the blueprint evaluates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Ordered set of tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Models to evaluate, as ids or config objects.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub models: Vec<ModelRef>,
    /// Single system prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// System prompt variants; `None` entries mean "no system prompt".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub systems: Option<Vec<Option<String>>>,
    /// Single sampling temperature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Temperature sweep.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperatures: Option<Vec<f64>>,
    /// Tool definitions, passed through verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Value>>,
    /// Shared point functions, by name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point_defs: Option<Map<String, Value>>,
    /// Shared context available to every prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    /// Author name or author object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Value>,
    /// Source references.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<Vec<Value>>,
    /// Blueprint-level citation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation: Option<String>,
    /// Requested parallelism for downstream runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<u32>,
    /// Evaluator settings, passed through verbatim.
    #[serde(
        rename = "evaluationConfig",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub evaluation_config: Option<Value>,
    /// Header keys this crate does not model, kept verbatim.
    #[serde(flatten, default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl BlueprintHeader {
    /// Whether no header field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Whether `name` is a shared point function declared in `point_defs`.
    pub fn defines_point_function(&self, name: &str) -> bool {
        self.point_defs
            .as_ref()
            .map(|defs| defs.contains_key(name))
            .unwrap_or(false)
    }
}

/// The canonical blueprint every downstream stage consumes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalBlueprint {
    /// Blueprint-level fields.
    #[serde(flatten)]
    pub header: BlueprintHeader,
    /// Prompts in document order.
    pub prompts: Vec<Prompt>,
}

impl CanonicalBlueprint {
    /// Create a blueprint from its parts.
    pub fn new(header: BlueprintHeader, prompts: Vec<Prompt>) -> Self {
        Self { header, prompts }
    }

    /// Look up a prompt by id.
    pub fn prompt(&self, id: &str) -> Option<&Prompt> {
        self.prompts.iter().find(|p| p.id == id)
    }

    /// Prompt ids in document order.
    pub fn prompt_ids(&self) -> Vec<&str> {
        self.prompts.iter().map(|p| p.id.as_str()).collect()
    }

    /// Number of prompts.
    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    /// Whether the blueprint has no prompts.
    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    /// Hash of the fully-resolved blueprint, as 16 hex characters.
    ///
    /// Storage collaborators key persisted blueprints on this value.
    pub fn content_hash(&self) -> String {
        canonical_hash_hex(self)
    }
}
