//! Request-scoped memoization for expensive tree walks.
//!
//! [`TransientCache`] is a single-level memo map living as long as the
//! repository that owns it. There is no TTL and no eviction; the cache is
//! meant for one execution context and dies with it. Hit, miss, and insert
//! counters are tracked for observability.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Build a cache identifier from a namespace and its input parts.
///
/// The identifier is the SHA-256 hex digest over the concatenated inputs, so
/// arbitrarily long filter clauses collapse into fixed-size keys.
#[must_use]
pub fn cache_key(namespace: &str, parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(namespace.as_bytes());
    for part in parts {
        hasher.update(part.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

/// In-process cache for page id lists.
#[derive(Debug, Default)]
pub struct TransientCache {
    entries: Mutex<HashMap<String, Vec<i64>>>,
    stats: CacheStats,
}

#[derive(Debug, Default)]
struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
}

/// Point-in-time view of cache activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStatsSnapshot {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that fell through to the database.
    pub misses: u64,
    /// Values stored.
    pub inserts: u64,
    /// Entries currently held.
    pub entries: usize,
}

impl TransientCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a previously stored id list.
    pub fn get(&self, key: &str) -> Option<Vec<i64>> {
        let entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match entries.get(key) {
            Some(value) => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                debug!(key, "transient cache hit");
                Some(value.clone())
            },
            None => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                None
            },
        }
    }

    /// Store an id list under the given key, replacing any previous value.
    pub fn set(&self, key: String, value: Vec<i64>) {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        entries.insert(key, value);
        self.stats.inserts.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot the hit, miss, and insert counters.
    pub fn stats(&self) -> CacheStatsSnapshot {
        let entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        CacheStatsSnapshot {
            hits: self.stats.hits.load(Ordering::Relaxed),
            misses: self.stats.misses.load(Ordering::Relaxed),
            inserts: self.stats.inserts.load(Ordering::Relaxed),
            entries,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_roundtrip() {
        let cache = TransientCache::new();
        assert_eq!(cache.get("k"), None);

        cache.set("k".to_string(), vec![1, 2, 3]);
        assert_eq!(cache.get("k"), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_stats_accounting() {
        let cache = TransientCache::new();
        cache.get("a");
        cache.set("a".to_string(), vec![7]);
        cache.get("a");
        cache.get("a");

        let stats = cache.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.inserts, 1);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn test_set_replaces() {
        let cache = TransientCache::new();
        cache.set("a".to_string(), vec![1]);
        cache.set("a".to_string(), vec![2]);
        assert_eq!(cache.get("a"), Some(vec![2]));
        assert_eq!(cache.stats().entries, 1);
    }

    #[test]
    fn test_cache_key_is_stable_and_distinct() {
        let a = cache_key("pages", &["1", "no_search = 0"]);
        let b = cache_key("pages", &["1", "no_search = 0"]);
        let c = cache_key("pages", &["2", "no_search = 0"]);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }
}
