//! # blueprint-kernel
//!
//! Parsing and normalization of evaluation blueprints.
//!
//! Authors write blueprints loosely: YAML or JSON, four document layouts, and
//! many field-name aliases. Every downstream stage (response generation,
//! scoring, storage, UI) consumes one strict shape. This crate turns the
//! former into the latter, or fails with a precise, attributable error.
//!
//! ## Core Contract
//!
//! 1. `parse_and_normalize(text, syntax)` returns a [`CanonicalBlueprint`] or a [`BlueprintError`]
//! 2. Prompts without an id receive a content-derived `hash-<12 hex>` id
//! 3. The canonical blueprint carries a content hash for storage keys
//!
//! ## Architecture
//!
//! ```text
//! text → reader → shape → authoring gate → alias → point / message / prompt → canonical gate
//!                                                         ↓
//!                                                    fingerprint (ids)
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Same text + same syntax + same config → identical blueprint
//! - Semantically identical prompts → identical generated ids, across syntaxes, shapes and aliases
//! - No process-wide mutable state: alias tables are `static`, parsing needs no locking

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod alias;
pub mod cache;
pub mod canonical;
pub mod error;
pub mod fingerprint;
pub mod normalize;
pub mod parser;
pub mod reader;
pub mod shape;
pub mod types;
pub mod validate;

#[cfg(feature = "service")]
pub mod service;

// Re-exports
pub use types::{
    BlueprintHeader, CanonicalBlueprint, Message, ModelRef, Point, PointKind, Prompt,
    PromptInput, Role, DEFAULT_MULTIPLIER, MAX_MULTIPLIER, MIN_MULTIPLIER,
};
pub use error::BlueprintError;
pub use reader::{read_documents, strip_code_fences, Syntax};
pub use shape::{classify, BlueprintShape};
pub use alias::{resolve_function, resolve_keys, AliasScope};
pub use fingerprint::{compute_fingerprint, generate_prompt_id, is_generated_id, normalize_text};
pub use validate::{
    validate_authoring, validate_canonical, validate_canonical_value, validate_canonical_with,
    PatternCheck, SchemaMode, SchemaViolation, ValidationReport,
};
pub use parser::{parse_and_normalize, BlueprintParser, ParserConfig};
pub use cache::{CacheConfig, CacheStats, ParseCache, ParseOutcome};
pub use canonical::{canonical_hash, canonical_hash_hex, to_canonical_bytes};

// Service re-exports (when service feature is enabled)
#[cfg(feature = "service")]
pub use service::{create_router, ServiceState};

/// Schema version of the canonical blueprint.
/// Increment on breaking changes to any canonical type.
pub const BLUEPRINT_SCHEMA_VERSION: &str = "1.0.0";

/// Default parser config version identifier.
pub const PARSER_CONFIG_VERSION: &str = "blueprint_parser_v1";
