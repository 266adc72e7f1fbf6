//! Canonical JSON encoding and xxh64 hashes.
//!
//! Values are first lowered into a `serde_json::Value` tree. Its object map is
//! ordered by key, so maps that were filled in different orders (header
//! `extra` fields, function argument objects, model configs) encode to the
//! same bytes. Arrays keep their order; numbers keep serde_json's shortest
//! round-trip format.
//!
//! Used for [`CanonicalBlueprint::content_hash`](crate::CanonicalBlueprint::content_hash),
//! `ParserConfig::params_hash` and the id fingerprint input.

use serde::Serialize;
use serde_json::Value;
use xxhash_rust::xxh64::xxh64;

/// Seed shared by every canonical hash in this crate.
const HASH_SEED: u64 = 0;

/// Lower a value into its key-ordered JSON tree.
pub fn to_canonical_value<T: Serialize>(value: &T) -> Result<Value, serde_json::Error> {
    serde_json::to_value(value)
}

/// Canonical JSON bytes of a value.
///
/// All hashed types in this crate have string map keys, which is the only
/// way lowering can fail.
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Vec<u8> {
    let tree = to_canonical_value(value).expect("hashed types have string map keys");
    tree.to_string().into_bytes()
}

/// xxh64 of the canonical bytes.
pub fn canonical_hash<T: Serialize>(value: &T) -> u64 {
    xxh64(&to_canonical_bytes(value), HASH_SEED)
}

/// [`canonical_hash`] as 16 lowercase hex characters.
pub fn canonical_hash_hex<T: Serialize>(value: &T) -> String {
    format!("{:016x}", canonical_hash(value))
}
