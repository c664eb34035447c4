//! Memoization of parsed trees.
//!
//! Tables evaluate the same filters against every visible row on every
//! render, so parsing once per distinct query pays off quickly. Entries are
//! grouped by [`ScopeId`] (one per table or view) and live until their scope
//! is torn down.

use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use tracing::trace;

/// Owner of a group of cache entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopeId(String);

impl ScopeId {
    /// Creates a named scope.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The scope used when none is given.
    pub fn global() -> Self {
        Self("global".to_string())
    }

    /// The scope name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Counters describing a cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Entries currently held.
    pub entries: usize,
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that had to build.
    pub misses: u64,
}

impl CacheStats {
    /// Sums the counters of two caches.
    pub fn merge(self, other: CacheStats) -> CacheStats {
        CacheStats {
            entries: self.entries + other.entries,
            hits: self.hits + other.hits,
            misses: self.misses + other.misses,
        }
    }
}

/// A concurrent map from `(scope, key)` to a shared tree.
///
/// Two threads missing the same key at the same time may both build; the
/// first insert wins and both get the same `Arc`. Trees are pure values, so
/// the extra build only costs time.
#[derive(Debug)]
pub struct TreeCache<K, T>
where
    K: Eq + Hash,
{
    entries: DashMap<(ScopeId, K), Arc<T>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K, T> TreeCache<K, T>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns the cached tree for `key` in `scope`, building it on a miss.
    pub fn get_or_build(&self, scope: &ScopeId, key: K, build: impl FnOnce() -> T) -> Arc<T> {
        let entry_key = (scope.clone(), key);
        if let Some(tree) = self.entries.get(&entry_key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(scope = %scope, "tree cache hit");
            return Arc::clone(tree.value());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        trace!(scope = %scope, "tree cache miss");
        // Build without holding a shard lock.
        let built = Arc::new(build());
        let tree = self.entries.entry(entry_key).or_insert(built);
        Arc::clone(tree.value())
    }

    /// Drops every entry of `scope`, returning how many were removed.
    pub fn evict_scope(&self, scope: &ScopeId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(owner, _), _| owner != scope);
        let removed = before.saturating_sub(self.entries.len());
        trace!(scope = %scope, removed, "tree cache scope evicted");
        removed
    }

    /// Number of cached trees.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lookups answered from the cache.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Lookups that had to build.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// A snapshot of the counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits(),
            misses: self.misses(),
        }
    }

    /// Drops all entries. Counters are kept.
    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl<K, T> Default for TreeCache<K, T>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
