//! Canonical schema: strict checks over the normalizer's output.
//!
//! Applied to the serialized JSON form so that a blueprint received from
//! elsewhere (for example a stored canonical document) can be checked the
//! same way as a freshly normalized one.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::alias::{canonical_key, is_function_alias, is_point_function, AliasScope, REGEX_FUNCTIONS};
use crate::fingerprint::is_generated_id;
use crate::types::point::multiplier_in_range;
use crate::types::CanonicalBlueprint;

use super::{type_name, SchemaMode, ValidationReport};

/// How regular-expression arguments of `matches`-family points are checked.
///
/// Blueprint patterns run on JavaScript-style engines, which accept
/// look-around and backreferences. `Balanced` only rejects patterns no such
/// engine accepts; `Compile` additionally requires the pattern to compile with
/// `regex-lite`, i.e. to be portable to linear-time engines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternCheck {
    /// Groups and character classes closed, no trailing escape.
    #[default]
    Balanced,
    /// `Balanced`, and the pattern compiles with `regex-lite`.
    Compile,
}

/// Check a canonical blueprint against the canonical schema.
pub fn validate_canonical(blueprint: &CanonicalBlueprint) -> ValidationReport {
    validate_canonical_with(blueprint, PatternCheck::default())
}

/// [`validate_canonical`] with an explicit pattern check.
pub fn validate_canonical_with(blueprint: &CanonicalBlueprint, patterns: PatternCheck) -> ValidationReport {
    match serde_json::to_value(blueprint) {
        Ok(value) => validate_canonical_value_with(&value, patterns),
        Err(e) => {
            let mut report = ValidationReport::new(SchemaMode::Canonical);
            report.push("/", format!("not serializable: {}", e));
            report
        }
    }
}

/// Check a JSON document against the canonical schema.
pub fn validate_canonical_value(value: &Value) -> ValidationReport {
    validate_canonical_value_with(value, PatternCheck::default())
}

/// [`validate_canonical_value`] with an explicit pattern check.
pub fn validate_canonical_value_with(value: &Value, patterns: PatternCheck) -> ValidationReport {
    let mut report = ValidationReport::new(SchemaMode::Canonical);

    let root = match value.as_object() {
        Some(root) => root,
        None => {
            report.push("/", format!("must be an object, found {}", type_name(value)));
            return report;
        }
    };

    check_temperatures(root, &mut report);

    let declared: HashSet<&str> = root
        .get("point_defs")
        .and_then(Value::as_object)
        .map(|defs| defs.keys().map(String::as_str).collect())
        .unwrap_or_default();

    let prompts = match root.get("prompts").and_then(Value::as_array) {
        Some(prompts) => prompts,
        None => {
            report.push("/prompts", "must be a list of prompts");
            return report;
        }
    };

    let mut seen_ids: HashSet<&str> = HashSet::new();
    for (index, prompt) in prompts.iter().enumerate() {
        let path = format!("/prompts/{}", index);
        let prompt = match prompt.as_object() {
            Some(prompt) => prompt,
            None => {
                report.push(path, "must be an object");
                continue;
            }
        };

        match prompt.get("id").and_then(Value::as_str) {
            Some(id) if !id.trim().is_empty() => {
                if !seen_ids.insert(id) {
                    let message = if is_generated_id(id) {
                        format!(
                            "duplicate prompt id '{}': generated from identical prompt content; give one of the prompts an explicit 'id'",
                            id
                        )
                    } else {
                        format!("duplicate prompt id '{}'", id)
                    };
                    report.push(format!("{}/id", path), message);
                }
            }
            _ => report.push(format!("{}/id", path), "must be a non-empty string"),
        }

        check_prompt(prompt, &path, &declared, patterns, &mut report);
    }

    report
}

fn check_temperatures(root: &Map<String, Value>, report: &mut ValidationReport) {
    let valid = |t: &Value| t.as_f64().map(|t| t.is_finite() && t >= 0.0).unwrap_or(false);

    if let Some(temperature) = root.get("temperature") {
        if !valid(temperature) {
            report.push("/temperature", "must be a finite number >= 0");
        }
    }
    if let Some(temperatures) = root.get("temperatures") {
        match temperatures.as_array() {
            Some(items) => {
                for (index, t) in items.iter().enumerate() {
                    if !valid(t) {
                        report.push(format!("/temperatures/{}", index), "must be a finite number >= 0");
                    }
                }
            }
            None => report.push("/temperatures", "must be a list of numbers"),
        }
    }
}

fn check_aliases(object: &Map<String, Value>, scope: AliasScope, path: &str, report: &mut ValidationReport) {
    for key in object.keys() {
        let canonical = canonical_key(scope, key);
        if canonical != key.as_str() {
            report.push(
                format!("{}/{}", path, key),
                format!("alias '{}' is not allowed; use '{}'", key, canonical),
            );
        }
    }
}

fn check_prompt(
    prompt: &Map<String, Value>,
    path: &str,
    declared: &HashSet<&str>,
    patterns: PatternCheck,
    report: &mut ValidationReport,
) {
    check_aliases(prompt, AliasScope::Prompt, path, report);

    match (prompt.get("promptText"), prompt.get("messages")) {
        (Some(Value::String(_)), None) => {}
        (None, Some(Value::Array(messages))) => check_messages(messages, &format!("{}/messages", path), report),
        (Some(_), Some(_)) => report.push(path, "must not have both 'promptText' and 'messages'"),
        (None, None) => report.push(path, "must have 'promptText' or 'messages'"),
        (Some(_), None) => report.push(format!("{}/promptText", path), "must be a string"),
        (None, Some(_)) => report.push(format!("{}/messages", path), "must be a list"),
    }

    for key in ["ideal", "description", "citation", "system"] {
        if let Some(value) = prompt.get(key) {
            if !value.is_string() {
                report.push(format!("{}/{}", path, key), "must be a string");
            }
        }
    }

    if let Some(weight) = prompt.get("weight") {
        if !weight.as_f64().map(|w| w.is_finite() && w > 0.0).unwrap_or(false) {
            report.push(format!("{}/weight", path), "must be a finite number > 0");
        }
    }

    for key in ["should", "should_not"] {
        let rubric_path = format!("{}/{}", path, key);
        match prompt.get(key) {
            None => {}
            Some(Value::Array(points)) => {
                for (index, point) in points.iter().enumerate() {
                    let point_path = format!("{}/{}", rubric_path, index);
                    match point.as_object() {
                        Some(point) => check_point(point, &point_path, declared, patterns, report),
                        None => report.push(point_path, "must be a point object"),
                    }
                }
            }
            Some(_) => report.push(rubric_path, "must be a list"),
        }
    }
}

fn check_messages(messages: &[Value], path: &str, report: &mut ValidationReport) {
    if messages.is_empty() {
        report.push(path, "must not be empty");
    }
    for (index, message) in messages.iter().enumerate() {
        let message_path = format!("{}/{}", path, index);
        let role = message.get("role").and_then(Value::as_str);
        if !matches!(role, Some("system" | "user" | "assistant")) {
            report.push(format!("{}/role", message_path), "must be 'system', 'user' or 'assistant'");
        }
        match message.get("content") {
            Some(Value::String(_)) | Some(Value::Null) => {}
            _ => report.push(format!("{}/content", message_path), "must be a string or null"),
        }
    }
}

fn check_point(
    point: &Map<String, Value>,
    path: &str,
    declared: &HashSet<&str>,
    patterns: PatternCheck,
    report: &mut ValidationReport,
) {
    check_aliases(point, AliasScope::Point, path, report);

    match (point.get("text"), point.get("fn")) {
        (Some(Value::String(_)), None) => {}
        (None, Some(Value::String(name))) => {
            let known = is_point_function(name) && !is_function_alias(name);
            if !known && !declared.contains(name.as_str()) {
                report.push(format!("{}/fn", path), format!("unknown point function '{}'", name));
            }
            if REGEX_FUNCTIONS.contains(&name.as_str()) {
                check_patterns(point.get("fnArgs"), &format!("{}/fnArgs", path), patterns, report);
            }
        }
        (Some(_), Some(_)) => report.push(path, "must not have both 'text' and 'fn'"),
        (None, None) => report.push(path, "must have 'text' or 'fn'"),
        _ => report.push(path, "'text' and 'fn' must be strings"),
    }

    match point.get("multiplier").and_then(Value::as_f64) {
        Some(multiplier) if multiplier_in_range(multiplier) => {}
        _ => report.push(format!("{}/multiplier", path), "must be a number between 0.1 and 10"),
    }

    if let Some(citation) = point.get("citation") {
        if !citation.is_string() {
            report.push(format!("{}/citation", path), "must be a string");
        }
    }
}

fn check_patterns(args: Option<&Value>, path: &str, check: PatternCheck, report: &mut ValidationReport) {
    let patterns: Vec<&Value> = match args {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(value) => vec![value],
        None => Vec::new(),
    };
    if patterns.is_empty() {
        report.push(path, "must provide at least one regular expression");
    }
    for pattern in patterns {
        match pattern.as_str() {
            Some(pattern) => {
                let problem = match (unbalanced(pattern), check) {
                    (Some(problem), _) => Some(problem.to_string()),
                    (None, PatternCheck::Compile) => regex_lite::Regex::new(pattern).err().map(|e| e.to_string()),
                    (None, PatternCheck::Balanced) => None,
                };
                if let Some(problem) = problem {
                    report.push(path, format!("invalid regular expression '{}': {}", pattern, problem));
                }
            }
            None => report.push(path, "regular expressions must be strings"),
        }
    }
}

/// Structural defects every regex dialect rejects.
fn unbalanced(pattern: &str) -> Option<&'static str> {
    let mut depth = 0usize;
    let mut in_class = false;
    let mut chars = pattern.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if chars.next().is_none() {
                    return Some("trailing backslash");
                }
            }
            ']' if in_class => in_class = false,
            _ if in_class => {}
            '[' => in_class = true,
            '(' => depth += 1,
            ')' => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return Some("unmatched ')'"),
            },
            _ => {}
        }
    }

    if in_class {
        Some("unclosed character class")
    } else if depth > 0 {
        Some("unclosed group")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Message, Point, Prompt, PromptInput};
    use serde_json::json;

    fn blueprint(prompts: Vec<Prompt>) -> CanonicalBlueprint {
        CanonicalBlueprint::new(Default::default(), prompts)
    }

    fn text_prompt(id: &str) -> Prompt {
        Prompt::new(id, PromptInput::Text("Q".to_string()))
    }

    #[test]
    fn test_valid_canonical_blueprint() {
        let mut prompt = text_prompt("p1");
        prompt.should = vec![
            Point::text("A"),
            Point::function("matches", json!("[0-9]+")).with_multiplier(0.5),
        ];
        let mut conversation = Prompt::new(
            "p2",
            PromptInput::Messages(vec![Message::system("S"), Message::user("hi")]),
        );
        conversation.weight = Some(2.0);

        let report = validate_canonical(&blueprint(vec![prompt, conversation]));
        assert!(report.is_valid(), "{:?}", report.violations);
    }

    #[test]
    fn test_duplicate_ids() {
        let report = validate_canonical(&blueprint(vec![text_prompt("p1"), text_prompt("p1")]));
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].message, "duplicate prompt id 'p1'");
    }

    #[test]
    fn test_aliases_rejected() {
        let report = validate_canonical_value(&json!({
            "prompts": [{"id": "p1", "prompt": "Q", "promptText": "Q",
                         "should": [{"text": "A", "weight": 2, "multiplier": 2}]}]
        }));
        let messages: Vec<_> = report.violations.iter().map(|v| v.message.as_str()).collect();
        assert!(messages.contains(&"alias 'prompt' is not allowed; use 'promptText'"));
        assert!(messages.contains(&"alias 'weight' is not allowed; use 'multiplier'"));
    }

    #[test]
    fn test_unknown_function_unless_declared() {
        let doc = |point_defs: Value| {
            json!({
                "point_defs": point_defs,
                "prompts": [{"id": "p1", "promptText": "Q",
                             "should": [{"fn": "has_citation", "fnArgs": null, "multiplier": 1.0}]}]
            })
        };
        assert!(!validate_canonical_value(&doc(json!({}))).is_valid());
        assert!(validate_canonical_value(&doc(json!({"has_citation": "return 1;"}))).is_valid());
    }

    #[test]
    fn test_singular_function_name_rejected() {
        let report = validate_canonical_value(&json!({
            "prompts": [{"id": "p1", "promptText": "Q",
                         "should": [{"fn": "contain", "fnArgs": "x", "multiplier": 1.0}]}]
        }));
        assert!(!report.is_valid());
    }

    #[test]
    fn test_invalid_regex() {
        let mut prompt = text_prompt("p1");
        prompt.should = vec![Point::function("matches_all_of", json!(["ok", "(unclosed"]))];
        let report = validate_canonical(&blueprint(vec![prompt]));
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].path, "/prompts/0/should/0/fnArgs");
        assert_eq!(
            report.violations[0].message,
            "invalid regular expression '(unclosed': unclosed group"
        );
    }

    #[test]
    fn test_lookaround_and_backreferences_pass_balanced_check() {
        let mut prompt = text_prompt("p1");
        prompt.should = vec![
            Point::function("matches", json!(r"^(?=.*\d)\w+$")),
            Point::function("imatch", json!(r"(\w)\1")),
            Point::function("matches_all_of", json!([r"foo(?!bar)", r"(?<=a)b", r"[(]x"])),
        ];
        let bp = blueprint(vec![prompt]);

        let report = validate_canonical(&bp);
        assert!(report.is_valid(), "{:?}", report.violations);

        let compiled = validate_canonical_with(&bp, PatternCheck::Compile);
        assert!(!compiled.is_valid());
    }

    #[test]
    fn test_unbalanced_patterns() {
        assert_eq!(unbalanced(r"a(b)c"), None);
        assert_eq!(unbalanced(r"\(literal"), None);
        assert_eq!(unbalanced(r"[)]"), None);
        assert_eq!(unbalanced(r"a)"), Some("unmatched ')'"));
        assert_eq!(unbalanced(r"[abc"), Some("unclosed character class"));
        assert_eq!(unbalanced("abc\\"), Some("trailing backslash"));
    }

    #[test]
    fn test_duplicate_generated_ids_explain_cause() {
        let id = crate::fingerprint::generate_prompt_id(&PromptInput::Text("Q".to_string()), None, &[], &[]);
        let report = validate_canonical(&blueprint(vec![text_prompt(&id), text_prompt(&id)]));
        assert_eq!(report.violations.len(), 1);
        assert!(report.violations[0].message.starts_with(&format!("duplicate prompt id '{}'", id)));
        assert!(report.violations[0].message.contains("identical prompt content"));
    }

    #[test]
    fn test_ranges() {
        let mut prompt = text_prompt("p1");
        prompt.weight = Some(0.0);
        prompt.should = vec![Point::text("A").with_multiplier(20.0)];
        let mut bp = blueprint(vec![prompt]);
        bp.header.temperatures = Some(vec![0.0, -1.0]);

        let paths: Vec<_> = validate_canonical(&bp)
            .violations
            .into_iter()
            .map(|v| v.path)
            .collect();
        assert_eq!(
            paths,
            vec!["/temperatures/1", "/prompts/0/weight", "/prompts/0/should/0/multiplier"]
        );
    }

    #[test]
    fn test_bad_role() {
        let report = validate_canonical_value(&json!({
            "prompts": [{"id": "p1", "messages": [{"role": "ai", "content": "x"}]}]
        }));
        assert_eq!(report.violations[0].path, "/prompts/0/messages/0/role");
    }
}
