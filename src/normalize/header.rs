//! Blueprint header normalization.

use serde_json::{Map, Value};
use tracing::warn;

use crate::alias::{resolve_keys, AliasScope};
use crate::error::BlueprintError;
use crate::types::{BlueprintHeader, ModelRef};

use super::invalid_field;

const OWNER: &str = "the blueprint header";

/// Normalize a raw header object.
///
/// Keys this crate does not model are kept verbatim in
/// [`BlueprintHeader::extra`]; rejecting them is the authoring schema's job.
pub fn normalize_header(raw: &Map<String, Value>) -> Result<BlueprintHeader, BlueprintError> {
    let object = resolve_keys(AliasScope::Header, raw)?;
    let mut header = BlueprintHeader::default();

    for (key, value) in &object {
        if value.is_null() {
            continue;
        }
        match key.as_str() {
            "id" => {
                let id = match value {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    _ => return Err(invalid_field(OWNER, key, "a string")),
                };
                warn!(
                    blueprint_id = %id,
                    "Blueprint header 'id' is deprecated; the value is kept but identity is assigned at deployment"
                );
                header.id = Some(id);
            }
            "title" => header.title = Some(string(value, key)?),
            "description" => header.description = Some(string(value, key)?),
            "citation" => header.citation = Some(string(value, key)?),
            "tags" => header.tags = tags(value)?,
            "models" => header.models = models(value)?,
            "system" => match value {
                Value::String(system) => header.system = Some(system.clone()),
                Value::Array(variants) => {
                    if object.get("systems").map(|v| !v.is_null()).unwrap_or(false) {
                        return Err(BlueprintError::AliasConflict {
                            scope: AliasScope::Header,
                            canonical: "systems".to_string(),
                            first: "system".to_string(),
                            second: "systems".to_string(),
                        });
                    }
                    header.systems = Some(systems(variants, key)?);
                }
                _ => return Err(invalid_field(OWNER, key, "a string or a list of strings")),
            },
            "systems" => match value {
                Value::Array(variants) => header.systems = Some(systems(variants, key)?),
                _ => return Err(invalid_field(OWNER, key, "a list of strings")),
            },
            "temperature" => header.temperature = Some(number(value, key)?),
            "temperatures" => {
                let items = list(value, key, "a list of numbers")?;
                header.temperatures = Some(
                    items
                        .iter()
                        .map(|t| t.as_f64().ok_or_else(|| invalid_field(OWNER, key, "a list of numbers")))
                        .collect::<Result<_, _>>()?,
                );
            }
            "tools" => header.tools = Some(list(value, key, "a list")?.to_vec()),
            "references" => header.references = Some(list(value, key, "a list")?.to_vec()),
            "point_defs" => match value {
                Value::Object(defs) => header.point_defs = Some(defs.clone()),
                _ => return Err(invalid_field(OWNER, key, "an object")),
            },
            "concurrency" => {
                header.concurrency = Some(
                    value
                        .as_u64()
                        .and_then(|n| u32::try_from(n).ok())
                        .ok_or_else(|| invalid_field(OWNER, key, "a non-negative integer"))?,
                )
            }
            "context" => header.context = Some(value.clone()),
            "author" => header.author = Some(value.clone()),
            "evaluationConfig" => header.evaluation_config = Some(value.clone()),
            _ => {
                header.extra.insert(key.clone(), value.clone());
            }
        }
    }

    Ok(header)
}

fn string(value: &Value, key: &str) -> Result<String, BlueprintError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| invalid_field(OWNER, key, "a string"))
}

fn number(value: &Value, key: &str) -> Result<f64, BlueprintError> {
    value
        .as_f64()
        .ok_or_else(|| invalid_field(OWNER, key, "a number"))
}

fn list<'a>(value: &'a Value, key: &str, expected: &'static str) -> Result<&'a [Value], BlueprintError> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| invalid_field(OWNER, key, expected))
}

/// Tags as an ordered set: first occurrence wins.
fn tags(value: &Value) -> Result<Vec<String>, BlueprintError> {
    let mut tags: Vec<String> = Vec::new();
    for tag in list(value, "tags", "a list of strings")? {
        let tag = tag
            .as_str()
            .ok_or_else(|| invalid_field(OWNER, "tags", "a list of strings"))?;
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    Ok(tags)
}

fn models(value: &Value) -> Result<Vec<ModelRef>, BlueprintError> {
    const EXPECTED: &str = "a list of model ids or model objects";
    list(value, "models", EXPECTED)?
        .iter()
        .map(|model| match model {
            Value::String(id) => Ok(ModelRef::Id(id.clone())),
            Value::Object(config) => Ok(ModelRef::Config(config.clone())),
            _ => Err(invalid_field(OWNER, "models", EXPECTED)),
        })
        .collect()
}

fn systems(variants: &[Value], key: &str) -> Result<Vec<Option<String>>, BlueprintError> {
    variants
        .iter()
        .map(|variant| match variant {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s.clone())),
            _ => Err(invalid_field(OWNER, key, "a list of strings or nulls")),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn header(raw: Value) -> Result<BlueprintHeader, BlueprintError> {
        normalize_header(raw.as_object().unwrap())
    }

    #[test]
    fn test_documented_header() {
        let normalized = header(json!({"id": "x", "models": ["a"]})).unwrap();
        assert_eq!(normalized.id.as_deref(), Some("x"));
        assert_eq!(normalized.models, vec![ModelRef::Id("a".to_string())]);
    }

    #[test]
    fn test_tags_are_deduplicated_in_order() {
        let normalized = header(json!({"tags": ["b", "a", "b", "c", "a"]})).unwrap();
        assert_eq!(normalized.tags, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_array_system_moves_to_systems() {
        let normalized = header(json!({"system": ["You are terse.", null]})).unwrap();
        assert_eq!(normalized.system, None);
        assert_eq!(
            normalized.systems,
            Some(vec![Some("You are terse.".to_string()), None])
        );
    }

    #[test]
    fn test_array_system_conflicts_with_systems() {
        let err = header(json!({"system": ["a"], "systems": ["b"]})).unwrap_err();
        assert_eq!(err.kind(), "ALIAS_CONFLICT");
    }

    #[test]
    fn test_unknown_keys_are_kept() {
        let normalized = header(json!({"title": "T", "owner": "team-a"})).unwrap();
        assert_eq!(normalized.extra.get("owner"), Some(&json!("team-a")));
    }

    #[test]
    fn test_field_types() {
        assert!(header(json!({"title": 3})).is_err());
        assert!(header(json!({"temperatures": [0.0, "hot"]})).is_err());
        assert!(header(json!({"concurrency": -1})).is_err());
        let err = header(json!({"models": [1]})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Field 'models' in the blueprint header must be a list of model ids or model objects."
        );
    }

    #[test]
    fn test_model_config_objects() {
        let normalized = header(json!({"models": [{"id": "m", "temperature": 0.2}]})).unwrap();
        assert_eq!(normalized.models[0].id(), Some("m"));
    }
}
