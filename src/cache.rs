//! Memoized parsing for live-validation traffic.
//!
//! An authoring UI re-submits the same text many times while a user edits.
//! `ParseCache` wraps a [`BlueprintParser`] with an LRU of parse outcomes.
//! Failures are cached too: parsing is deterministic, so a failed input fails
//! the same way next time.
//!
//! ## Cache Key Design
//!
//! The key is an xxh64 over everything that affects the outcome:
//! - syntax tag
//! - parser config `params_hash`
//! - crate schema version
//! - the raw text
//!
//! Any config change therefore results in a cache miss.

use lru::LruCache;
use parking_lot::RwLock;
use std::hash::Hasher;
use std::num::NonZeroUsize;
use std::sync::Arc;
use xxhash_rust::xxh64::Xxh64;

use crate::error::BlueprintError;
use crate::parser::BlueprintParser;
use crate::reader::Syntax;
use crate::types::CanonicalBlueprint;
use crate::BLUEPRINT_SCHEMA_VERSION;

/// Configuration for the parse cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries in the cache. Zero disables caching.
    pub max_entries: usize,
    /// Whether to enable the cache.
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1_000,
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ParseCacheKey(u64);

impl ParseCacheKey {
    fn compute(syntax: Syntax, params_hash: &str, text: &str) -> Self {
        let mut hasher = Xxh64::new(0);
        hasher.write(syntax.as_str().as_bytes());
        hasher.write(params_hash.as_bytes());
        hasher.write(BLUEPRINT_SCHEMA_VERSION.as_bytes());
        hasher.write(text.as_bytes());
        Self(hasher.finish())
    }
}

/// Result of a cached parse.
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    /// The parse result.
    pub result: Result<CanonicalBlueprint, BlueprintError>,
    /// Whether this result came from cache.
    pub cache_hit: bool,
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Current number of entries in the cache.
    pub len: usize,
    /// Maximum capacity of the cache.
    pub cap: usize,
}

type OutcomeCache = LruCache<ParseCacheKey, Result<CanonicalBlueprint, BlueprintError>>;

/// A blueprint parser with an LRU of recent outcomes.
///
/// Cheap to share: clones share one cache.
#[derive(Clone)]
pub struct ParseCache {
    parser: BlueprintParser,
    params_hash: String,
    cache: Option<Arc<RwLock<OutcomeCache>>>,
}

impl ParseCache {
    /// Create a cache around `parser`.
    pub fn new(parser: BlueprintParser, config: CacheConfig) -> Self {
        let cache = NonZeroUsize::new(config.max_entries)
            .filter(|_| config.enabled)
            .map(|size| Arc::new(RwLock::new(LruCache::new(size))));
        let params_hash = parser.config().params_hash();
        Self {
            parser,
            params_hash,
            cache,
        }
    }

    /// The wrapped parser.
    pub fn parser(&self) -> &BlueprintParser {
        &self.parser
    }

    /// Parse `text`, serving a cached outcome when one exists.
    pub fn parse(&self, text: &str, syntax: Syntax) -> ParseOutcome {
        let cache = match &self.cache {
            Some(cache) => cache,
            None => {
                return ParseOutcome {
                    result: self.parser.parse(text, syntax),
                    cache_hit: false,
                }
            }
        };

        let key = ParseCacheKey::compute(syntax, &self.params_hash, text);
        if let Some(result) = cache.read().peek(&key) {
            return ParseOutcome {
                result: result.clone(),
                cache_hit: true,
            };
        }

        let result = self.parser.parse(text, syntax);
        cache.write().put(key, result.clone());
        ParseOutcome {
            result,
            cache_hit: false,
        }
    }

    /// Cache statistics, or `None` when caching is disabled.
    pub fn stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(|cache| {
            let cache = cache.read();
            CacheStats {
                len: cache.len(),
                cap: cache.cap().get(),
            }
        })
    }

    /// Drop every cached outcome.
    pub fn clear(&self) {
        if let Some(cache) = &self.cache {
            cache.write().clear();
        }
    }
}
