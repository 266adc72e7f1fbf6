//! Service state management.
//!
//! Contains the ParserRegistry and shared service state.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::cache::{CacheConfig, CacheStats, ParseCache};
use crate::canonical::canonical_hash_hex;
use crate::parser::{BlueprintParser, ParserConfig};

/// Modes registered by default, in listing order.
pub const PARSER_MODES: [&str; 3] = ["default", "lenient", "strict"];

/// Reference to a registered parser mode.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParserRef {
    /// Mode name (e.g. "strict").
    pub mode: String,
    /// xxHash64 of the canonical parser config JSON.
    pub params_hash: String,
}

/// Cached parsers, one per mode.
///
/// Built once at startup; read-only afterwards.
#[derive(Clone)]
pub struct ParserRegistry {
    parsers: BTreeMap<String, (ParserRef, ParseCache)>,
    default_mode: String,
    registry_fingerprint: String,
}

impl ParserRegistry {
    /// Register every preset mode, each with its own cache.
    ///
    /// Falls back to `default` when `default_mode` is not a known mode.
    pub fn with_defaults(default_mode: &str, cache_config: CacheConfig) -> Self {
        let mut parsers = BTreeMap::new();
        for mode in PARSER_MODES {
            if let Some(config) = ParserConfig::from_mode(mode) {
                let parser_ref = ParserRef {
                    mode: mode.to_string(),
                    params_hash: config.params_hash(),
                };
                let cache = ParseCache::new(BlueprintParser::new(config), cache_config.clone());
                parsers.insert(mode.to_string(), (parser_ref, cache));
            }
        }

        let default_mode = default_mode.trim().to_lowercase();
        let default_mode = if parsers.contains_key(&default_mode) {
            default_mode
        } else {
            tracing::warn!(mode = %default_mode, "Unknown parser mode, using 'default'");
            "default".to_string()
        };

        let refs: Vec<&ParserRef> = parsers.values().map(|(r, _)| r).collect();
        let registry_fingerprint = canonical_hash_hex(&refs);

        Self {
            parsers,
            default_mode,
            registry_fingerprint,
        }
    }

    /// Resolve a mode (or the default mode when `None`).
    pub fn resolve(&self, mode: Option<&str>) -> Option<(&ParserRef, &ParseCache)> {
        let mode = match mode {
            Some(mode) => mode.trim().to_lowercase(),
            None => self.default_mode.clone(),
        };
        self.parsers.get(&mode).map(|(r, cache)| (r, cache))
    }

    /// Name of the mode used when a request names none.
    pub fn default_mode(&self) -> &str {
        &self.default_mode
    }

    /// Get all registered parser references.
    pub fn list(&self) -> Vec<ParserRef> {
        self.parsers.values().map(|(r, _)| r.clone()).collect()
    }

    /// Combined cache statistics across every mode.
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.parsers
            .values()
            .filter_map(|(_, cache)| cache.stats())
            .reduce(|a, b| CacheStats {
                len: a.len + b.len,
                cap: a.cap + b.cap,
            })
    }

    /// Get the registry fingerprint.
    pub fn fingerprint(&self) -> &str {
        &self.registry_fingerprint
    }

    /// Get the number of registered modes.
    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::with_defaults("default", CacheConfig::default())
    }
}

/// Shared service state.
#[derive(Clone, Default)]
pub struct ServiceState {
    /// Parsers available to requests.
    pub registry: Arc<ParserRegistry>,
}

impl ServiceState {
    /// Create service state around a registry.
    pub fn new(registry: ParserRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Create service state from environment variables.
    ///
    /// Reads `BLUEPRINT_PARSER_MODE` (default `default`) and
    /// `BLUEPRINT_CACHE_SIZE` (default 1000, `0` disables caching).
    pub fn from_env() -> Self {
        let mode = std::env::var("BLUEPRINT_PARSER_MODE").unwrap_or_else(|_| "default".to_string());
        let cache_config = match std::env::var("BLUEPRINT_CACHE_SIZE") {
            Ok(size) => match size.parse::<usize>() {
                Ok(max_entries) => CacheConfig {
                    max_entries,
                    enabled: max_entries > 0,
                },
                Err(_) => {
                    tracing::warn!(value = %size, "Invalid BLUEPRINT_CACHE_SIZE, using default");
                    CacheConfig::default()
                }
            },
            Err(_) => CacheConfig::default(),
        };

        Self::new(ParserRegistry::with_defaults(&mode, cache_config))
    }
}
