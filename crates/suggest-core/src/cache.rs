//! Bounded memoisation of recent lookups.
//!
//! Two LRU maps, one for `contains` and one for suggestion queries, keyed by
//! normalised arguments. Interior locking lets lookups populate the cache
//! through a shared reference; the owning index clears it on every mutation.

use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};

use lru::LruCache;

use crate::settings::settings;
use crate::types::Suggestion;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub contains_hits: u64,
    pub contains_misses: u64,
    pub suggest_hits: u64,
    pub suggest_misses: u64,
}

struct Inner {
    contains: LruCache<String, bool>,
    suggest: LruCache<(String, usize), Vec<Suggestion>>,
    stats: CacheStats,
}

pub struct QueryCache {
    inner: Mutex<Inner>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

fn capacity(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap_or(NonZeroUsize::MIN)
}

impl QueryCache {
    pub fn new() -> Self {
        let s = &settings().cache;
        Self::with_capacity(s.contains_capacity, s.suggest_capacity)
    }

    pub fn with_capacity(contains: usize, suggest: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                contains: LruCache::new(capacity(contains)),
                suggest: LruCache::new(capacity(suggest)),
                stats: CacheStats::default(),
            }),
        }
    }

    // A panic while holding the lock cannot leave the maps half-written in a
    // way that matters for a cache, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get_contains(&self, key: &str) -> Option<bool> {
        let mut inner = self.lock();
        let hit = inner.contains.get(key).copied();
        match hit {
            Some(_) => inner.stats.contains_hits += 1,
            None => inner.stats.contains_misses += 1,
        }
        hit
    }

    pub fn put_contains(&self, key: String, found: bool) {
        self.lock().contains.put(key, found);
    }

    pub fn get_suggest(&self, query: &str, max_suggestions: usize) -> Option<Vec<Suggestion>> {
        let mut inner = self.lock();
        let hit = inner
            .suggest
            .get(&(query.to_string(), max_suggestions))
            .cloned();
        match hit {
            Some(_) => inner.stats.suggest_hits += 1,
            None => inner.stats.suggest_misses += 1,
        }
        hit
    }

    pub fn put_suggest(&self, query: String, max_suggestions: usize, results: Vec<Suggestion>) {
        self.lock().suggest.put((query, max_suggestions), results);
    }

    /// Drop every memoised result. Counters are kept.
    pub fn invalidate(&self) {
        let mut inner = self.lock();
        inner.contains.clear();
        inner.suggest.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.lock().stats
    }

    /// (contains entries, suggest entries)
    pub fn sizes(&self) -> (usize, usize) {
        let inner = self.lock();
        (inner.contains.len(), inner.suggest.len())
    }
}
