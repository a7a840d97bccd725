//! Per-session response and enrichment caches.

use std::num::NonZeroUsize;

use lru::LruCache;
use serde_json::{Map, Value};

use crate::r#type::Suggestion;

const DEFAULT_CAPACITY: usize = 100;

/// Sorted `key=json` pairs joined with `&`.
pub fn build_cache_key(params: &Map<String, Value>) -> String {
    let mut keys: Vec<&String> = params.keys().collect();
    keys.sort();
    keys.iter()
        .map(|key| format!("{}={}", key, params[key.as_str()]))
        .collect::<Vec<_>>()
        .join("&")
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
}

#[derive(Debug)]
pub struct SuggestionsCache {
    responses: LruCache<String, Vec<Suggestion>>,
    enrichments: LruCache<String, Suggestion>,
    bad_queries: LruCache<String, ()>,
    hits: u64,
    misses: u64,
}

impl SuggestionsCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .or_else(|| NonZeroUsize::new(DEFAULT_CAPACITY))
            .unwrap_or(NonZeroUsize::MIN);
        SuggestionsCache {
            responses: LruCache::new(capacity),
            enrichments: LruCache::new(capacity),
            bad_queries: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    pub fn response(&mut self, key: &str) -> Option<Vec<Suggestion>> {
        match self.responses.get(key) {
            Some(suggestions) => {
                self.hits += 1;
                Some(suggestions.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn put_response(&mut self, key: String, suggestions: Vec<Suggestion>) {
        self.responses.put(key, suggestions);
    }

    /// Swaps in the enriched version of the suggestion whose value is the query.
    pub fn inject_enrichment(&self, query: &str, suggestions: &mut [Suggestion]) {
        if let Some(enriched) = self.enrichments.peek(query) {
            for suggestion in suggestions.iter_mut().filter(|s| s.value == query) {
                *suggestion = enriched.clone();
            }
        }
    }

    pub fn enrichment(&mut self, query: &str) -> Option<Suggestion> {
        self.enrichments.get(query).cloned()
    }

    pub fn put_enrichment(&mut self, query: &str, suggestion: Suggestion) {
        self.enrichments.put(query.to_string(), suggestion);
    }

    /// A query is bad if it extends one that returned nothing.
    pub fn is_bad_query(&self, query: &str) -> bool {
        self.bad_queries.iter().any(|(bad, _)| query.starts_with(bad.as_str()))
    }

    /// Queries already covered by a shorter bad one are not stored.
    pub fn add_bad_query(&mut self, query: &str) {
        if !self.is_bad_query(query) {
            self.bad_queries.put(query.to_string(), ());
        }
    }

    pub fn clear(&mut self) {
        self.responses.clear();
        self.enrichments.clear();
        self.bad_queries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        let total = self.hits + self.misses;
        let hit_rate = if total > 0 {
            self.hits as f64 / total as f64
        } else {
            0.0
        };
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            hit_rate,
        }
    }
}

impl Default for SuggestionsCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
