//! Alias resolution for author-facing field and function names.
//!
//! ## Tables
//!
//! | Scope  | Alias                                              | Canonical    |
//! |--------|----------------------------------------------------|--------------|
//! | Prompt | `prompt`                                           | `promptText` |
//! | Prompt | `idealResponse`                                    | `ideal`      |
//! | Prompt | `expect`, `expects`, `expectations`, `points`      | `should`     |
//! | Point  | `weight`                                           | `multiplier` |
//! | Point  | `arg`                                              | `fnArgs`     |
//! | Point  | `contain`, `match`, `match_all_of`, ... (singular) | plural form  |
//!
//! The header scope has no renaming aliases.
//!
//! Tables are `static` slices: loaded with the binary, read-only, and shared
//! by every caller without locking. Resolution is idempotent.

use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::BlueprintError;
use crate::types::Role;

/// Object namespace an alias table applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AliasScope {
    /// Blueprint header fields.
    Header,
    /// Prompt fields.
    Prompt,
    /// Rubric point fields and function shorthand keys.
    Point,
}

impl fmt::Display for AliasScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header => write!(f, "Blueprint header"),
            Self::Prompt => write!(f, "Prompt"),
            Self::Point => write!(f, "Point"),
        }
    }
}

static PROMPT_ALIASES: &[(&str, &str)] = &[
    ("prompt", "promptText"),
    ("idealResponse", "ideal"),
    ("expect", "should"),
    ("expects", "should"),
    ("expectations", "should"),
    ("points", "should"),
];

static POINT_ALIASES: &[(&str, &str)] = &[("weight", "multiplier"), ("arg", "fnArgs")];

static FUNCTION_ALIASES: &[(&str, &str)] = &[
    ("contain", "contains"),
    ("icontain", "icontains"),
    ("contain_any_of", "contains_any_of"),
    ("icontain_any_of", "icontains_any_of"),
    ("contain_all_of", "contains_all_of"),
    ("icontain_all_of", "icontains_all_of"),
    ("contain_at_least_n_of", "contains_at_least_n_of"),
    ("icontain_at_least_n_of", "icontains_at_least_n_of"),
    ("start_with", "starts_with"),
    ("end_with", "ends_with"),
    ("match", "matches"),
    ("match_all_of", "matches_all_of"),
    ("imatch_all_of", "imatches_all_of"),
];

/// Canonical names of the built-in point functions.
pub static POINT_FUNCTIONS: &[&str] = &[
    "contains",
    "icontains",
    "contains_any_of",
    "icontains_any_of",
    "contains_all_of",
    "icontains_all_of",
    "contains_at_least_n_of",
    "icontains_at_least_n_of",
    "starts_with",
    "ends_with",
    "matches",
    "imatch",
    "imatches",
    "matches_all_of",
    "imatches_all_of",
    "word_count_between",
    "is_json",
    "js",
];

/// Functions whose arguments are regular expressions.
pub static REGEX_FUNCTIONS: &[&str] = &["matches", "imatch", "imatches", "matches_all_of", "imatches_all_of"];

/// Canonical point fields that are not function names.
pub static POINT_FIELDS: &[&str] = &["text", "fn", "fnArgs", "multiplier", "citation"];

/// Canonical prompt fields whose presence marks an object as a prompt.
static PROMPT_CONTENT_FIELDS: &[&str] = &["promptText", "messages", "ideal", "should", "should_not"];

/// Canonical header fields.
pub static HEADER_FIELDS: &[&str] = &[
    "id",
    "title",
    "description",
    "tags",
    "models",
    "system",
    "systems",
    "temperature",
    "temperatures",
    "tools",
    "point_defs",
    "context",
    "author",
    "references",
    "citation",
    "concurrency",
    "evaluationConfig",
];

/// Keys accepted by the shorthand message form.
static MESSAGE_SHORTHAND_KEYS: &[(&str, Role)] = &[
    ("system", Role::System),
    ("user", Role::User),
    ("assistant", Role::Assistant),
    ("ai", Role::Assistant),
];

fn lookup(table: &'static [(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(alias, _)| *alias == key).map(|(_, canonical)| *canonical)
}

/// Resolve a point function name to its canonical spelling.
///
/// Strips a leading `$` and pluralizes singular forms. Names that are neither
/// aliases nor built-ins pass through unchanged (they may name a shared
/// function from `point_defs`).
pub fn resolve_function(name: &str) -> &str {
    let bare = name.strip_prefix('$').unwrap_or(name);
    lookup(FUNCTION_ALIASES, bare).unwrap_or(bare)
}

/// Whether `name` is a built-in point function (after resolution).
pub fn is_point_function(name: &str) -> bool {
    POINT_FUNCTIONS.contains(&resolve_function(name))
}

/// Whether `name` is an alias (not canonical) for a built-in function.
pub fn is_function_alias(name: &str) -> bool {
    name.starts_with('$') || lookup(FUNCTION_ALIASES, name).is_some()
}

/// Function name carried by a point key, if the key is function shorthand.
///
/// Built-in names and their aliases are recognized as is; any other name is
/// recognized only with an explicit `$` prefix.
pub fn function_key(key: &str) -> Option<&str> {
    if POINT_FIELDS.contains(&key) {
        return None;
    }
    if is_point_function(key) || key.starts_with('$') {
        Some(resolve_function(key))
    } else {
        None
    }
}

/// Canonical name of `key` within `scope`.
pub fn canonical_key(scope: AliasScope, key: &str) -> Cow<'_, str> {
    match scope {
        AliasScope::Header => Cow::Borrowed(key),
        AliasScope::Prompt => Cow::Borrowed(lookup(PROMPT_ALIASES, key).unwrap_or(key)),
        AliasScope::Point => {
            if let Some(canonical) = lookup(POINT_ALIASES, key) {
                return Cow::Borrowed(canonical);
            }
            match function_key(key) {
                // Unknown `$name` keeps its prefix so it is still read as a function.
                Some(name) if !is_point_function(name) => Cow::Owned(format!("${}", name)),
                Some(name) => Cow::Borrowed(name),
                None => Cow::Borrowed(key),
            }
        }
    }
}

/// Whether `key` is an alias (rather than a canonical name) within `scope`.
pub fn is_alias(scope: AliasScope, key: &str) -> bool {
    canonical_key(scope, key) != key
}

/// Rewrite every key of `object` to its canonical name.
///
/// Fails when two keys resolve to the same canonical name.
pub fn resolve_keys(
    scope: AliasScope,
    object: &Map<String, Value>,
) -> Result<Map<String, Value>, BlueprintError> {
    let mut resolved = Map::new();
    let mut written_as: BTreeMap<String, &str> = BTreeMap::new();

    for (key, value) in object {
        let canonical = canonical_key(scope, key).into_owned();
        if let Some(previous) = written_as.insert(canonical.clone(), key.as_str()) {
            return Err(BlueprintError::AliasConflict {
                scope,
                canonical,
                first: previous.to_string(),
                second: key.clone(),
            });
        }
        resolved.insert(canonical, value.clone());
    }

    Ok(resolved)
}

/// Whether `object` looks like a prompt (carries any prompt content key or alias).
pub fn is_prompt_shaped(object: &Map<String, Value>) -> bool {
    object
        .keys()
        .any(|key| PROMPT_CONTENT_FIELDS.contains(&canonical_key(AliasScope::Prompt, key).as_ref()))
}

/// Role named by a shorthand message key.
pub fn message_shorthand_role(key: &str) -> Option<Role> {
    MESSAGE_SHORTHAND_KEYS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, role)| *role)
}
