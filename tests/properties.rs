//! Property tests for parser laws.
//!
//! - Alias spellings never change the normalized prompt
//! - Generated ids are stable across syntaxes and distinct across content
//! - Canonical output re-parses to itself
//! - Out-of-range multipliers always fail

use blueprint_kernel::{normalize_text, parse_and_normalize, Syntax};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

// -- Strategy helpers --

fn arb_text() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9 ,.?]{0,24}"
}

fn arb_multiplier() -> impl Strategy<Value = f64> {
    (1u32..=100).prop_map(|k| k as f64 / 10.0)
}

fn arb_rubric_key() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("should"),
        Just("expect"),
        Just("expects"),
        Just("expectations"),
        Just("points"),
    ]
}

fn arb_weight_key() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("weight"), Just("multiplier")]
}

fn arb_function_alias() -> impl Strategy<Value = (&'static str, &'static str)> {
    prop_oneof![
        Just(("contain", "contains")),
        Just(("icontain", "icontains")),
        Just(("match", "matches")),
        Just(("match_all_of", "matches_all_of")),
        Just(("start_with", "starts_with")),
        Just(("end_with", "ends_with")),
        Just(("$contains", "contains")),
        Just(("contains", "contains")),
        Just(("imatch", "imatch")),
        Just(("word_count_between", "word_count_between")),
    ]
}

fn prompt_with(
    prompt_key: &str,
    rubric_key: &str,
    weight_key: &str,
    text: &str,
    point: &str,
    multiplier: f64,
) -> Value {
    let mut point_object = Map::new();
    point_object.insert("text".to_string(), json!(point));
    point_object.insert(weight_key.to_string(), json!(multiplier));

    let mut prompt = Map::new();
    prompt.insert(prompt_key.to_string(), json!(text));
    prompt.insert(rubric_key.to_string(), json!([point, Value::Object(point_object)]));
    Value::Array(vec![Value::Object(prompt)])
}

fn parse_json(value: &Value) -> blueprint_kernel::CanonicalBlueprint {
    parse_and_normalize(&value.to_string(), Syntax::Json).unwrap()
}

proptest! {
    #[test]
    fn alias_spelling_is_transparent(
        text in arb_text(),
        point in arb_text(),
        multiplier in arb_multiplier(),
        prompt_key in prop_oneof![Just("prompt"), Just("promptText")],
        rubric_key in arb_rubric_key(),
        weight_key in arb_weight_key(),
    ) {
        let canonical = parse_json(&prompt_with("promptText", "should", "multiplier", &text, &point, multiplier));
        let aliased = parse_json(&prompt_with(prompt_key, rubric_key, weight_key, &text, &point, multiplier));
        prop_assert_eq!(canonical.prompts, aliased.prompts);
    }

    #[test]
    fn generated_ids_match_across_syntaxes(
        text in arb_text(),
        point in arb_text(),
        multiplier in arb_multiplier(),
    ) {
        let document = prompt_with("prompt", "expect", "weight", &text, &point, multiplier);
        let from_json = parse_json(&document);

        let yaml_text = serde_yaml::to_string(&document).unwrap();
        let from_yaml = parse_and_normalize(&yaml_text, Syntax::Yaml).unwrap();

        prop_assert_eq!(&from_json.prompts[0].id, &from_yaml.prompts[0].id);
        prop_assert_eq!(from_json.content_hash(), from_yaml.content_hash());
    }

    #[test]
    fn generated_ids_distinguish_content(a in arb_text(), b in arb_text()) {
        prop_assume!(normalize_text(&a) != normalize_text(&b));
        let blueprint = parse_json(&json!([{"prompt": a}, {"prompt": b}]));
        prop_assert_ne!(&blueprint.prompts[0].id, &blueprint.prompts[1].id);
    }

    #[test]
    fn function_shorthand_resolves((alias, canonical) in arb_function_alias(), arg in arb_text()) {
        let blueprint = parse_json(&json!([{"id": "p1", "prompt": "Q", "should": [{alias: arg}]}]));
        prop_assert_eq!(blueprint.prompts[0].should[0].function_name(), Some(canonical));
    }

    #[test]
    fn canonical_output_reparses_to_itself(
        text in arb_text(),
        point in arb_text(),
        multiplier in arb_multiplier(),
    ) {
        let first = parse_json(&prompt_with("prompt", "points", "weight", &text, &point, multiplier));
        let canonical_json = serde_json::to_value(&first).unwrap();
        let second = parse_json(&canonical_json);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn out_of_range_multiplier_always_fails(multiplier in 10.001f64..10_000.0, id in "[a-z]{1,8}") {
        let err = parse_and_normalize(
            &json!([{"id": id, "prompt": "Q", "should": [{"text": "A", "weight": multiplier}]}]).to_string(),
            Syntax::Json,
        )
        .unwrap_err();
        prop_assert_eq!(err.kind(), "MULTIPLIER_OUT_OF_RANGE");
        let expected_suffix = format!("Prompt ID: '{}'.", id);
        prop_assert!(err.to_string().ends_with(&expected_suffix));
    }
}
