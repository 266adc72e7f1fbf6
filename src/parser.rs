//! Blueprint parser: the public entry point.
//!
//! The parser composes the pipeline stages:
//!
//! ```text
//! text ─▶ strip fences ─▶ read ─▶ classify ─▶ authoring gate
//!      ─▶ header + prompts ─▶ canonical gate ─▶ CanonicalBlueprint
//! ```
//!
//! Parsing is a pure function of `(text, syntax, config)`. A parser holds only
//! its immutable config and may be shared freely across threads.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::canonical::canonical_hash_hex;
use crate::error::BlueprintError;
use crate::normalize::{normalize_header, normalize_prompt};
use crate::reader::{read_documents, strip_code_fences, Syntax};
use crate::shape::classify;
use crate::types::{BlueprintHeader, CanonicalBlueprint};
use crate::validate::{validate_authoring, validate_canonical_with, PatternCheck};
use crate::PARSER_CONFIG_VERSION;

/// Parser configuration.
///
/// ## Presets
///
/// | Preset      | Input gate | Output gate | Unknown header keys | Regex arguments |
/// |-------------|------------|-------------|---------------------|-----------------|
/// | `default()` | yes        | yes         | kept                | balanced        |
/// | `lenient()` | no         | no          | kept                | unchecked       |
/// | `strict()`  | yes        | yes         | rejected            | compiled        |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Config version identifier.
    pub version: String,
    /// Run the authoring schema on raw input.
    pub validate_input: bool,
    /// Run the canonical schema on the result.
    pub validate_output: bool,
    /// Strip a markdown code fence around the whole text.
    pub strip_code_fences: bool,
    /// Accept header keys outside the canonical header field list.
    pub allow_unknown_header_keys: bool,
    /// How the output gate checks `matches`-family patterns.
    pub pattern_check: PatternCheck,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            version: PARSER_CONFIG_VERSION.to_string(),
            validate_input: true,
            validate_output: true,
            strip_code_fences: true,
            allow_unknown_header_keys: true,
            pattern_check: PatternCheck::Balanced,
        }
    }
}

impl ParserConfig {
    /// Skip both schema gates. The normalizers still enforce every documented error.
    pub fn lenient() -> Self {
        Self {
            validate_input: false,
            validate_output: false,
            ..Self::default()
        }
    }

    /// Reject unknown header keys and require patterns that compile with `regex-lite`.
    pub fn strict() -> Self {
        Self {
            allow_unknown_header_keys: false,
            pattern_check: PatternCheck::Compile,
            ..Self::default()
        }
    }

    /// Preset by name: `default`, `lenient` or `strict`.
    pub fn from_mode(mode: &str) -> Option<Self> {
        match mode.trim().to_lowercase().as_str() {
            "default" => Some(Self::default()),
            "lenient" => Some(Self::lenient()),
            "strict" => Some(Self::strict()),
            _ => None,
        }
    }

    /// Hash of the config parameters (16 hex characters).
    pub fn params_hash(&self) -> String {
        canonical_hash_hex(self)
    }
}

/// Parses author text into canonical blueprints.
#[derive(Debug, Clone, Default)]
pub struct BlueprintParser {
    config: ParserConfig,
}

impl BlueprintParser {
    /// Create a parser with `config`.
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    /// The parser's config.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse and normalize `text` written in `syntax`.
    pub fn parse(&self, text: &str, syntax: Syntax) -> Result<CanonicalBlueprint, BlueprintError> {
        let text = if self.config.strip_code_fences {
            strip_code_fences(text)
        } else {
            text.into()
        };

        let documents = read_documents(&text, syntax)?;
        let document_count = documents.len();
        let shape = classify(documents)?;
        debug!(
            syntax = syntax.as_str(),
            documents = document_count,
            shape = shape.name(),
            raw_prompts = shape.prompts().len(),
            "Classified blueprint"
        );

        if self.config.validate_input {
            validate_authoring(&shape, self.config.allow_unknown_header_keys).into_result()?;
        }

        let (raw_header, raw_prompts) = shape.into_parts();
        let header = match raw_header {
            Some(raw) => normalize_header(&raw)?,
            None => BlueprintHeader::default(),
        };
        let prompts = raw_prompts
            .iter()
            .enumerate()
            .map(|(index, raw)| normalize_prompt(raw, index))
            .collect::<Result<Vec<_>, _>>()?;

        let blueprint = CanonicalBlueprint::new(header, prompts);

        if self.config.validate_output {
            validate_canonical_with(&blueprint, self.config.pattern_check).into_result()?;
        }

        debug!(
            prompts = blueprint.len(),
            generated_ids = blueprint.prompts.iter().filter(|p| p.has_generated_id()).count(),
            "Normalized blueprint"
        );
        Ok(blueprint)
    }
}

/// Parse and normalize `text` with the default config.
///
/// # Example
///
/// ```rust
/// use blueprint_kernel::{parse_and_normalize, Syntax};
///
/// let blueprint = parse_and_normalize("- id: p1\n  prompt: Q\n", Syntax::Yaml).unwrap();
/// assert_eq!(blueprint.prompt_ids(), vec!["p1"]);
/// ```
pub fn parse_and_normalize(text: &str, syntax: Syntax) -> Result<CanonicalBlueprint, BlueprintError> {
    BlueprintParser::default().parse(text, syntax)
}
