//! Authoring schema: type checks over raw author input.
//!
//! Runs after shape classification and before normalization. It checks value
//! types only. Conditions with a dedicated error (point conflicts, multiplier
//! range, message shorthand, prompt input exclusivity) are left to the
//! normalizers so their exact messages surface.

use serde_json::{Map, Value};

use crate::alias::{canonical_key, AliasScope, HEADER_FIELDS};
use crate::shape::BlueprintShape;

use super::{type_name, SchemaMode, ValidationReport};

/// Check a classified blueprint against the authoring schema.
///
/// With `allow_unknown_header_keys` false, header keys outside the canonical
/// header field list are violations.
pub fn validate_authoring(shape: &BlueprintShape, allow_unknown_header_keys: bool) -> ValidationReport {
    let mut report = ValidationReport::new(SchemaMode::Authoring);

    let header = shape.header();
    if let Some(header) = header {
        check_header(header, allow_unknown_header_keys, &mut report);
    }

    let prompts = shape.prompts();
    if prompts.is_empty() && header.map(Map::is_empty).unwrap_or(true) {
        report.push("/", "Blueprint must contain at least one prompt or config header.");
    }

    for (index, prompt) in prompts.iter().enumerate() {
        let path = format!("/prompts/{}", index);
        match prompt {
            Value::Object(prompt) => check_prompt(prompt, &path, &mut report),
            _ => report.push(path, format!("Prompt at index {} is not a valid object.", index)),
        }
    }

    report
}

fn expect(report: &mut ValidationReport, path: &str, value: &Value, expected: &str, ok: bool) {
    if !ok {
        report.push(path, format!("must be {}, found {}", expected, type_name(value)));
    }
}

fn is_list_of(value: &Value, item: impl Fn(&Value) -> bool) -> bool {
    value.as_array().map(|items| items.iter().all(item)).unwrap_or(false)
}

fn check_header(header: &Map<String, Value>, allow_unknown: bool, report: &mut ValidationReport) {
    for (key, value) in header {
        if value.is_null() {
            continue;
        }
        let path = format!("/{}", key);
        match key.as_str() {
            "id" => expect(report, &path, value, "a string", value.is_string() || value.is_number()),
            "title" | "description" | "citation" => {
                expect(report, &path, value, "a string", value.is_string())
            }
            "tags" => expect(report, &path, value, "a list of strings", is_list_of(value, Value::is_string)),
            "models" => expect(
                report,
                &path,
                value,
                "a list of model ids or model objects",
                is_list_of(value, |m| m.is_string() || m.is_object()),
            ),
            "system" => expect(
                report,
                &path,
                value,
                "a string or a list of strings",
                value.is_string() || is_list_of(value, |s| s.is_string() || s.is_null()),
            ),
            "systems" => expect(
                report,
                &path,
                value,
                "a list of strings",
                is_list_of(value, |s| s.is_string() || s.is_null()),
            ),
            "temperature" => expect(report, &path, value, "a number", value.is_number()),
            "temperatures" => expect(report, &path, value, "a list of numbers", is_list_of(value, Value::is_number)),
            "tools" | "references" => expect(report, &path, value, "a list", value.is_array()),
            "point_defs" => expect(report, &path, value, "an object", value.is_object()),
            "concurrency" => expect(report, &path, value, "a non-negative integer", value.is_u64()),
            _ if !allow_unknown && !HEADER_FIELDS.contains(&key.as_str()) => {
                report.push(path, format!("unknown header field '{}'", key));
            }
            _ => {}
        }
    }
}

fn check_prompt(prompt: &Map<String, Value>, path: &str, report: &mut ValidationReport) {
    for (key, value) in prompt {
        if value.is_null() {
            continue;
        }
        let field_path = format!("{}/{}", path, key);
        match canonical_key(AliasScope::Prompt, key).as_ref() {
            "id" => expect(report, &field_path, value, "a string", value.is_string() || value.is_number()),
            "promptText" | "ideal" | "description" | "citation" | "system" => {
                expect(report, &field_path, value, "a string", value.is_string())
            }
            "messages" => match value.as_array() {
                Some(messages) if !messages.is_empty() => {
                    for (index, message) in messages.iter().enumerate() {
                        let message_path = format!("{}/{}", field_path, index);
                        expect(report, &message_path, message, "an object", message.is_object());
                    }
                }
                _ => report.push(field_path, "must be a non-empty list of messages"),
            },
            "should" | "should_not" => match value.as_array() {
                Some(points) => check_points(points, &field_path, report),
                None => report.push(field_path, format!("rubric '{}' must be a list", key)),
            },
            "weight" => expect(report, &field_path, value, "a number", value.is_number()),
            _ => {}
        }
    }
}

fn check_points(points: &[Value], path: &str, report: &mut ValidationReport) {
    for (index, point) in points.iter().enumerate() {
        let point_path = format!("{}/{}", path, index);
        match point {
            Value::Array(group) => check_points(group, &point_path, report),
            Value::Object(point) => {
                for (key, value) in point {
                    if value.is_null() {
                        continue;
                    }
                    let field_path = format!("{}/{}", point_path, key);
                    match canonical_key(AliasScope::Point, key).as_ref() {
                        "text" | "citation" | "fn" => {
                            expect(report, &field_path, value, "a string", value.is_string())
                        }
                        _ => {}
                    }
                }
            }
            Value::String(_) => {}
            other => report.push(
                point_path,
                format!("must be a string, a list or an object, found {}", type_name(other)),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::classify;
    use serde_json::json;

    fn report(documents: Vec<Value>, allow_unknown: bool) -> ValidationReport {
        validate_authoring(&classify(documents).unwrap(), allow_unknown)
    }

    #[test]
    fn test_valid_authoring_document() {
        let report = report(
            vec![
                json!({"title": "T", "models": ["a", {"id": "b"}], "tags": ["x"]}),
                json!([{"prompt": "Q", "expect": ["A", {"contain": "x", "weight": 2}]}]),
            ],
            true,
        );
        assert!(report.is_valid(), "{:?}", report.violations);
    }

    #[test]
    fn test_violations_are_collected() {
        let report = report(
            vec![json!({
                "title": 3,
                "prompts": [
                    "not a prompt",
                    {"prompt": ["Q"], "should": "A"},
                    {"messages": []}
                ]
            })],
            true,
        );
        let paths: Vec<_> = report.violations.iter().map(|v| v.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["/title", "/prompts/0", "/prompts/1/prompt", "/prompts/1/should", "/prompts/2/messages"]
        );
    }

    #[test]
    fn test_range_is_left_to_the_normalizer() {
        let report = report(vec![json!([{"prompt": "Q", "should": [{"text": "A", "weight": 100}]}])], true);
        assert!(report.is_valid());
    }

    #[test]
    fn test_empty_blueprint() {
        let report = report(vec![json!([])], true);
        assert_eq!(
            report.violations[0].message,
            "Blueprint must contain at least one prompt or config header."
        );
    }

    #[test]
    fn test_unknown_header_keys_in_strict_mode() {
        let documents = vec![json!({"title": "T", "owner": "x"}), json!([{"prompt": "Q"}])];
        assert!(report(documents.clone(), true).is_valid());

        let strict = report(documents, false);
        assert_eq!(strict.violations.len(), 1);
        assert_eq!(strict.violations[0].path, "/owner");
    }
}
