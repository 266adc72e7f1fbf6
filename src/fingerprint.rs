//! Content fingerprints and generated prompt ids.
//!
//! ## Purpose
//!
//! Prompts written without an `id` receive one derived from their normalized
//! content. The id must be:
//!
//! 1. **Deterministic**: same normalized content → same id, byte for byte
//! 2. **Encoding-independent**: YAML vs JSON, aliases vs canonical names,
//!    `weight` vs `multiplier`, CRLF vs LF all produce the same id
//! 3. **Content-sensitive**: any change to a fingerprinted field changes the id
//!
//! ## Fingerprint Specification
//!
//! ```text
//! id = "hash-" + hex(SHA256(canonical_json(fingerprint)))[0..12]
//! ```
//!
//! The fingerprint covers:
//! - prompt text, or the ordered `(role, content)` message list
//! - the ideal answer
//! - `should` points, then `should_not` points
//!
//! Text fields pass through [`normalize_text`]. Multipliers are quantized to
//! integers. The canonical encoding orders every object by key, function
//! arguments included.
//!
//! ## What Is NOT Included
//!
//! - Description, citation and system override of the prompt
//! - Prompt weight
//! - Anything from the blueprint header

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::types::{Point, PointKind, PromptInput, Role};

/// Version of the fingerprint specification.
///
/// Changes to this version change every generated id.
pub const FINGERPRINT_VERSION: &str = "1.0.0";

/// Prefix of generated prompt ids.
pub const GENERATED_ID_PREFIX: &str = "hash-";

/// Number of hex characters kept from the digest.
pub const GENERATED_ID_HEX_LEN: usize = 12;

/// Quantization factor for multipliers.
const MULTIPLIER_QUANTIZATION_FACTOR: f64 = 1_000_000.0;

/// Normalize text to canonical form.
///
/// Transformations applied:
/// 1. Normalize newlines: CRLF → LF, isolated CR → LF
/// 2. Trim leading and trailing whitespace
///
/// # Example
///
/// ```rust
/// use blueprint_kernel::fingerprint::normalize_text;
///
/// let text = "  Hello\r\nWorld  ";
/// assert_eq!(normalize_text(text), "Hello\nWorld");
/// ```
pub fn normalize_text(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    normalized.trim().to_string()
}

fn quantize_multiplier(value: f64) -> i64 {
    (value * MULTIPLIER_QUANTIZATION_FACTOR).round() as i64
}

#[derive(Serialize)]
enum InputFingerprint {
    Text(String),
    Messages(Vec<(Role, Option<String>)>),
}

#[derive(Serialize)]
struct PointFingerprint<'a> {
    text: Option<String>,
    function: Option<&'a str>,
    args: Value,
    multiplier: i64,
    citation: Option<&'a str>,
}

impl<'a> PointFingerprint<'a> {
    fn from_point(point: &'a Point) -> Self {
        let (text, function, args) = match &point.kind {
            PointKind::Text { text } => (Some(normalize_text(text)), None, Value::Null),
            PointKind::Function { function, args } => {
                (None, Some(function.as_str()), args.clone())
            }
        };
        Self {
            text,
            function,
            args,
            multiplier: quantize_multiplier(point.multiplier),
            citation: point.citation.as_deref(),
        }
    }
}

#[derive(Serialize)]
struct PromptFingerprint<'a> {
    version: &'static str,
    input: InputFingerprint,
    ideal: Option<String>,
    should: Vec<PointFingerprint<'a>>,
    should_not: Vec<PointFingerprint<'a>>,
}

/// Compute the full SHA-256 fingerprint of a prompt's normalized content.
///
/// Returned as a 64-character lowercase hex string.
pub fn compute_fingerprint(
    input: &PromptInput,
    ideal: Option<&str>,
    should: &[Point],
    should_not: &[Point],
) -> String {
    let input = match input {
        PromptInput::Text(text) => InputFingerprint::Text(normalize_text(text)),
        PromptInput::Messages(messages) => InputFingerprint::Messages(
            messages
                .iter()
                .map(|m| (m.role, m.content.as_deref().map(normalize_text)))
                .collect(),
        ),
    };
    let fingerprint = PromptFingerprint {
        version: FINGERPRINT_VERSION,
        input,
        ideal: ideal.map(normalize_text),
        should: should.iter().map(PointFingerprint::from_point).collect(),
        should_not: should_not.iter().map(PointFingerprint::from_point).collect(),
    };

    let mut hasher = Sha256::new();
    hasher.update(crate::canonical::to_canonical_bytes(&fingerprint));
    hex::encode(hasher.finalize())
}

/// Generate a prompt id (`hash-` + 12 hex characters) from normalized content.
pub fn generate_prompt_id(
    input: &PromptInput,
    ideal: Option<&str>,
    should: &[Point],
    should_not: &[Point],
) -> String {
    let digest = compute_fingerprint(input, ideal, should, should_not);
    format!("{}{}", GENERATED_ID_PREFIX, &digest[..GENERATED_ID_HEX_LEN])
}

/// Whether `id` has the shape of a generated id.
pub fn is_generated_id(id: &str) -> bool {
    id.strip_prefix(GENERATED_ID_PREFIX)
        .map(|hex| {
            hex.len() == GENERATED_ID_HEX_LEN
                && hex.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        })
        .unwrap_or(false)
}
