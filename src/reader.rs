//! Document reader: raw text to language-neutral value trees.
//!
//! Both syntaxes produce `serde_json::Value` documents so every later stage
//! works on one tree type. YAML streams may hold several documents separated
//! by `---`; JSON input may hold several concatenated top-level values.
//!
//! YAML is read into `serde_yaml::Value` first and then lowered. JSON numbers
//! cannot hold `.inf` or `.nan`, so non-finite floats are lowered to their
//! YAML spelling as strings; numeric fields then reject them by value instead
//! of seeing a null.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::fmt;

use crate::error::BlueprintError;

/// Serialization syntax of a blueprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Syntax {
    /// YAML, possibly multi-document.
    Yaml,
    /// JSON.
    Json,
}

impl Syntax {
    /// Parse a syntax tag (`yaml`, `yml` or `json`, any case).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Lowercase tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
        }
    }
}

impl Default for Syntax {
    fn default() -> Self {
        Self::Yaml
    }
}

impl fmt::Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yaml => write!(f, "YAML"),
            Self::Json => write!(f, "JSON"),
        }
    }
}

/// Read every top-level document in `text`.
///
/// Null documents (an empty file, a trailing `---`) are dropped. Fails with
/// [`BlueprintError::Empty`] when nothing remains.
pub fn read_documents(text: &str, syntax: Syntax) -> Result<Vec<Value>, BlueprintError> {
    let mut documents = Vec::new();

    match syntax {
        Syntax::Yaml => {
            for document in serde_yaml::Deserializer::from_str(text) {
                let yaml = serde_yaml::Value::deserialize(document)
                    .map_err(|e| BlueprintError::syntax(syntax, e))?;
                let value = lower_yaml(yaml).map_err(|e| BlueprintError::syntax(syntax, e))?;
                if !value.is_null() {
                    documents.push(value);
                }
            }
        }
        Syntax::Json => {
            let stream = serde_json::Deserializer::from_str(text).into_iter::<Value>();
            for value in stream {
                let value = value.map_err(|e| BlueprintError::syntax(syntax, e))?;
                if !value.is_null() {
                    documents.push(value);
                }
            }
        }
    }

    if documents.is_empty() {
        return Err(BlueprintError::Empty);
    }
    Ok(documents)
}

/// Lower a YAML tree into a JSON tree.
///
/// Mapping keys must be scalars; numbers and booleans become their text.
/// Tags are dropped in favour of the tagged value.
fn lower_yaml(value: serde_yaml::Value) -> Result<Value, String> {
    use serde_yaml::Value as Yaml;

    Ok(match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => lower_number(&n),
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(items.into_iter().map(lower_yaml).collect::<Result<_, _>>()?),
        Yaml::Mapping(mapping) => {
            let mut object = Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                object.insert(lower_key(key)?, lower_yaml(value)?);
            }
            Value::Object(object)
        }
        Yaml::Tagged(tagged) => lower_yaml(tagged.value)?,
    })
}

fn lower_number(n: &serde_yaml::Number) -> Value {
    if let Some(i) = n.as_i64() {
        return Value::from(i);
    }
    if let Some(u) = n.as_u64() {
        return Value::from(u);
    }
    match n.as_f64() {
        Some(f) if f.is_nan() => Value::String(".nan".to_string()),
        Some(f) if f.is_infinite() => {
            Value::String(if f > 0.0 { ".inf" } else { "-.inf" }.to_string())
        }
        Some(f) => serde_json::Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        None => Value::Null,
    }
}

fn lower_key(key: serde_yaml::Value) -> Result<String, String> {
    use serde_yaml::Value as Yaml;

    match key {
        Yaml::String(s) => Ok(s),
        Yaml::Bool(b) => Ok(b.to_string()),
        Yaml::Number(n) => Ok(n.to_string()),
        Yaml::Null => Ok("null".to_string()),
        Yaml::Tagged(tagged) => lower_key(tagged.value),
        Yaml::Sequence(_) | Yaml::Mapping(_) => Err("mapping keys must be scalars".to_string()),
    }
}

/// Strip a markdown code fence wrapped around the whole text.
///
/// Generated blueprints often arrive as ```` ```yaml ... ``` ````. Text that
/// does not start with a fence is returned unchanged.
pub fn strip_code_fences(text: &str) -> Cow<'_, str> {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return Cow::Borrowed(text);
    }

    let mut lines: Vec<&str> = trimmed.lines().collect();
    lines.remove(0);
    if lines.last().map(|l| l.trim() == "```").unwrap_or(false) {
        lines.pop();
    }
    Cow::Owned(lines.join("\n"))
}
