//! Golden tests for the blueprint parser.
//!
//! These tests pin the documented scenarios, shape independence, alias
//! transparency and the exact rejection messages.

use blueprint_kernel::{
    is_generated_id, parse_and_normalize, BlueprintError, BlueprintParser, CanonicalBlueprint,
    Message, ParserConfig, Prompt, Role, Syntax,
};
use serde_json::{json, Value};

// ─────────────────────────────────────────────────────────────────────────────
// Test Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn yaml(text: &str) -> CanonicalBlueprint {
    parse_and_normalize(text, Syntax::Yaml).unwrap()
}

fn yaml_err(text: &str) -> BlueprintError {
    parse_and_normalize(text, Syntax::Yaml).unwrap_err()
}

fn prompts_json(blueprint: &CanonicalBlueprint) -> Value {
    serde_json::to_value(&blueprint.prompts).unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// Documented Scenarios
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_header_and_prompt_stream() {
    let blueprint = yaml("id: x\nmodels: [a]\n---\n- id: p1\n  prompt: \"Q\"");

    assert_eq!(
        serde_json::to_value(&blueprint).unwrap(),
        json!({
            "id": "x",
            "models": ["a"],
            "prompts": [{"id": "p1", "promptText": "Q"}]
        })
    );
}

#[test]
fn test_prompts_only_stream() {
    let blueprint = yaml("id: p1\nprompt: Q1\n---\nid: p2\nprompt: Q2\n---\nprompt: Q3\n");

    assert!(blueprint.header.is_empty());
    assert_eq!(blueprint.len(), 3);
    assert_eq!(blueprint.prompts[0].id, "p1");
    assert_eq!(blueprint.prompts[1].id, "p2");
    assert!(blueprint.prompts[2].id.starts_with("hash-"));
    assert!(is_generated_id(&blueprint.prompts[2].id));
    assert_eq!(blueprint.prompts[2].prompt_text(), Some("Q3"));
}

#[test]
fn test_point_forms() {
    let blueprint = yaml(
        r#"
- id: p1
  prompt: Q
  should:
    - A point
    - contain: x
    - text: B
      weight: 3
      citation: c1
    - fn: match
      arg: "[0-9]+"
      weight: 0.5
"#,
    );

    assert_eq!(
        serde_json::to_value(&blueprint.prompts[0].should).unwrap(),
        json!([
            {"text": "A point", "multiplier": 1.0},
            {"fn": "contains", "fnArgs": "x", "multiplier": 1.0},
            {"text": "B", "multiplier": 3.0, "citation": "c1"},
            {"fn": "matches", "fnArgs": "[0-9]+", "multiplier": 0.5}
        ])
    );
}

#[test]
fn test_message_shorthand() {
    let blueprint = yaml(
        r#"
- id: chat
  messages:
    - system: S
    - user: hi
    - ai: hello
    - user: bye
"#,
    );

    let messages = blueprint.prompts[0].messages().unwrap();
    let roles: Vec<Role> = messages.iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant, Role::User]);
    assert_eq!(
        messages,
        &[
            Message::system("S"),
            Message::user("hi"),
            Message::assistant("hello"),
            Message::user("bye"),
        ][..]
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Shape Independence
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_shape_independence() {
    let header_and_stream = "title: T\n---\n- id: p1\n  prompt: Q\n  should: [x]\n- prompt: R\n";
    let stream_only = "id: p1\nprompt: Q\nshould: [x]\n---\nprompt: R\n";
    let prompts_key = "title: T\nprompts:\n  - id: p1\n    prompt: Q\n    should: [x]\n  - prompt: R\n";
    let single_array = "- id: p1\n  prompt: Q\n  should: [x]\n- prompt: R\n";

    let expected = prompts_json(&yaml(single_array));
    for text in [header_and_stream, stream_only, prompts_key] {
        assert_eq!(prompts_json(&yaml(text)), expected, "shape: {text:?}");
    }

    let json_text = r#"[{"id": "p1", "promptText": "Q", "should": ["x"]}, {"promptText": "R"}]"#;
    let from_json = parse_and_normalize(json_text, Syntax::Json).unwrap();
    assert_eq!(prompts_json(&from_json), expected);
}

#[test]
fn test_json_header_and_stream() {
    let text = r#"{"title": "T"} [{"id": "p1", "prompt": "Q"}]"#;
    let blueprint = parse_and_normalize(text, Syntax::Json).unwrap();
    assert_eq!(blueprint.header.title.as_deref(), Some("T"));
    assert_eq!(blueprint.prompt_ids(), vec!["p1"]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Alias Transparency
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_rubric_aliases_are_interchangeable() {
    let expected = yaml("- id: p1\n  prompt: Q\n  should: [A]\n").prompts;
    for alias in ["expect", "expects", "expectations", "points"] {
        let text = format!("- id: p1\n  prompt: Q\n  {}: [A]\n", alias);
        assert_eq!(yaml(&text).prompts, expected, "alias: {alias}");
    }
}

#[test]
fn test_weight_and_multiplier_are_interchangeable() {
    let a = yaml("- id: p1\n  prompt: Q\n  should:\n    - text: A\n      weight: 2\n");
    let b = yaml("- id: p1\n  prompt: Q\n  should:\n    - text: A\n      multiplier: 2\n");
    assert_eq!(a.prompts, b.prompts);
}

#[test]
fn test_generated_ids_survive_re_encoding() {
    let from_yaml = yaml("- prompt: Q\n  idealResponse: A\n  expect:\n    - contain: x\n      weight: 2\n");
    let from_json = parse_and_normalize(
        r#"[{"promptText": "Q", "ideal": "A", "should": [{"fn": "contains", "fnArgs": "x", "multiplier": 2.0}]}]"#,
        Syntax::Json,
    )
    .unwrap();

    assert_eq!(from_yaml.prompts[0].id, from_json.prompts[0].id);
    assert_eq!(from_yaml.content_hash(), from_json.content_hash());
}

#[test]
fn test_generated_ids_differ_with_content() {
    let blueprint = yaml("- prompt: Q\n- prompt: Q\n  should: [A]\n- prompt: Q\n  ideal: I\n");
    let ids: Vec<&str> = blueprint.prompt_ids();
    assert_ne!(ids[0], ids[1]);
    assert_ne!(ids[0], ids[2]);
    assert_ne!(ids[1], ids[2]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Rejection Laws
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_text_and_function_rejected() {
    let err = yaml_err("- id: p1\n  prompt: Q\n  should:\n    - text: A\n      contains: x\n");
    assert_eq!(
        err.to_string(),
        "Point cannot have both 'text' and a function ('contains') defined."
    );
}

#[test]
fn test_multiplier_100_rejected() {
    let err = yaml_err("- id: p7\n  prompt: Q\n  should:\n    - text: A\n      weight: 100\n");
    assert_eq!(
        err.to_string(),
        "Point multiplier must be a number between 0.1 and 10. Found 100. Prompt ID: 'p7'."
    );
}

#[test]
fn test_non_finite_multipliers_rejected() {
    for (written, shown) in [(".inf", ".inf"), ("-.inf", "-.inf"), (".nan", ".nan"), (".NaN", ".nan")] {
        let text = format!("- id: p1\n  prompt: Q\n  should:\n    - text: A\n      weight: {}\n", written);
        let err = yaml_err(&text);
        assert_eq!(err.kind(), "MULTIPLIER_OUT_OF_RANGE", "weight: {written}");
        assert_eq!(
            err.to_string(),
            format!(
                "Point multiplier must be a number between 0.1 and 10. Found {}. Prompt ID: 'p1'.",
                shown
            )
        );
    }
}

#[test]
fn test_non_finite_prompt_weight_rejected() {
    let text = "- id: p1\n  prompt: Q\n  weight: .inf\n";
    assert_eq!(yaml_err(text).kind(), "SCHEMA_VIOLATION");

    let err = BlueprintParser::new(ParserConfig::lenient())
        .parse(text, Syntax::Yaml)
        .unwrap_err();
    assert_eq!(err.kind(), "INVALID_FIELD");
}

#[test]
fn test_engine_specific_regex_features_accepted() {
    let blueprint = yaml(
        r#"
- id: p1
  prompt: Q
  should:
    - match: '^(?=.*\d)\w+$'
    - match: '(\w)'
  should_not:
    - match: 'foo(?!bar)'
"#,
    );
    assert_eq!(blueprint.prompts[0].point_count(), 3);

    let err = yaml_err("- id: p1
  prompt: Q
  should:
    - match: 'a(b'
");
    assert_eq!(err.kind(), "SCHEMA_VIOLATION");
}

#[test]
fn test_identical_prompts_without_ids_explain_duplicate() {
    let err = yaml_err("- prompt: Q
- prompt: Q
");
    assert_eq!(err.kind(), "SCHEMA_VIOLATION");
    assert_eq!(err.violations().len(), 1);
    assert!(err.violations()[0].message.contains("identical prompt content"));
    assert!(err.violations()[0].message.contains("explicit 'id'"));
}

#[test]
fn test_two_key_message_shorthand_rejected() {
    let err = yaml_err("- id: p1\n  messages:\n    - user: hi\n      assistant: hello\n");
    assert_eq!(
        err.to_string(),
        "Each message in the shorthand format must have exactly one key (e.g., 'user', 'assistant', 'ai', 'system')."
    );
}

#[test]
fn test_point_without_criterion_rejected() {
    let err = yaml_err("- id: p1\n  prompt: Q\n  should:\n    - weight: 2\n");
    assert_eq!(
        err.to_string(),
        "Point object must have 'text', 'fn', or an idiomatic function name."
    );
}

#[test]
fn test_prompt_input_exclusivity() {
    let both = yaml_err("- id: p1\n  prompt: Q\n  messages:\n    - user: hi\n");
    assert_eq!(both.kind(), "PROMPT_INPUT_CONFLICT");

    let neither = yaml_err("- id: p1\n  should: [A]\n");
    assert_eq!(neither.kind(), "MISSING_PROMPT_INPUT");
}

#[test]
fn test_ambiguous_single_object() {
    let err = yaml_err("id: p1\nprompt: Q\n");
    assert_eq!(
        err.to_string(),
        "Invalid blueprint structure: a single document must be an array of prompts, or an object with a 'prompts' key."
    );
}

#[test]
fn test_syntax_errors_are_wrapped() {
    let err = yaml_err("- id: p1\n  prompt: [unclosed\n");
    assert!(err.to_string().starts_with("Failed to parse YAML blueprint: "));

    let err = parse_and_normalize("[{\"id\": }]", Syntax::Json).unwrap_err();
    assert!(err.to_string().starts_with("Failed to parse JSON blueprint: "));
}

#[test]
fn test_empty_blueprint() {
    assert_eq!(yaml_err(""), BlueprintError::Empty);
    assert_eq!(yaml_err("---\n---\n"), BlueprintError::Empty);
}

#[test]
fn test_errors_are_deterministic() {
    let text = "- id: p1\n  prompt: Q\n  should:\n    - contains: x\n      ends_with: y\n";
    assert_eq!(yaml_err(text), yaml_err(text));
}

// ─────────────────────────────────────────────────────────────────────────────
// Header
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_full_header() {
    let blueprint = yaml(
        r#"
title: Capitals
description: Geography recall
tags: [geo, geo, recall]
models:
  - openai:gpt-4o
  - id: local
    temperature: 0
system: [null, "Be terse."]
temperatures: [0.0, 0.7]
concurrency: 4
point_defs:
  mentions_capital: "return /Paris/.test(r)"
---
- id: fr
  prompt: Capital of France?
  should:
    - $mentions_capital: null
    - icontains: paris
"#,
    );

    let header = &blueprint.header;
    assert_eq!(header.tags, vec!["geo", "recall"]);
    assert_eq!(header.models.len(), 2);
    assert_eq!(header.systems, Some(vec![None, Some("Be terse.".to_string())]));
    assert_eq!(header.temperatures, Some(vec![0.0, 0.7]));
    assert_eq!(header.concurrency, Some(4));
    assert!(header.defines_point_function("mentions_capital"));

    let prompt: &Prompt = blueprint.prompt("fr").unwrap();
    assert_eq!(prompt.should[0].function_name(), Some("mentions_capital"));
    assert_eq!(prompt.should[1].function_name(), Some("icontains"));
}

#[test]
fn test_strict_mode_rejects_unknown_header_keys() {
    let text = "title: T\nowner: team\n---\n- id: p1\n  prompt: Q\n";
    assert!(parse_and_normalize(text, Syntax::Yaml).is_ok());

    let err = BlueprintParser::new(ParserConfig::strict())
        .parse(text, Syntax::Yaml)
        .unwrap_err();
    assert_eq!(err.kind(), "SCHEMA_VIOLATION");
    assert_eq!(err.violations().len(), 1);
}
