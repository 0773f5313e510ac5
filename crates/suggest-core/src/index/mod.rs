//! The autocomplete index: trie, phrase frequencies and query cache behind
//! one API.
//!
//! Inserting a phrase indexes it under every key its segmentation yields;
//! each key remembers the canonical phrase so lookups through any key
//! surface the phrase itself. Every mutation clears the query cache.

mod persistence;
#[cfg(test)]
mod proptest_index;

pub use persistence::{LoadOutcome, LoadPolicy, PersistError};

use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, info};

use crate::cache::{CacheStats, QueryCache};
use crate::filter::is_valid_phrase;
use crate::frequency::FrequencyTable;
use crate::fuzzy::FuzzyMatcher;
use crate::planner::QueryPlanner;
use crate::segment::Segmenter;
use crate::settings::settings;
use crate::trie::{InsertOutcome, TrieStore};
use crate::types::{IndexStats, PhraseFrequency, Suggestion};
use crate::unicode::{char_len, normalize};

pub struct AutocompleteIndex {
    trie: TrieStore,
    frequencies: FrequencyTable,
    segmenter: Segmenter,
    cache: QueryCache,
}

impl Default for AutocompleteIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl AutocompleteIndex {
    pub fn new() -> Self {
        Self {
            trie: TrieStore::new(),
            frequencies: FrequencyTable::new(),
            segmenter: Segmenter::new(),
            cache: QueryCache::new(),
        }
    }

    pub(crate) fn from_parts(trie: TrieStore, frequencies: FrequencyTable) -> Self {
        Self {
            trie,
            frequencies,
            ..Self::new()
        }
    }

    /// Index `phrase` with weight `frequency`. Returns `false` when the
    /// phrase is empty or too long and nothing changed.
    pub fn insert(&mut self, phrase: &str, frequency: u64) -> bool {
        let canonical = normalize(phrase);
        if canonical.is_empty() || char_len(&canonical) > settings().index.max_phrase_chars {
            return false;
        }

        let keys = self.segmenter.segment(&canonical);
        let indexed = self.index_keys(&canonical, &keys, frequency);
        self.frequencies.add(&canonical, frequency);
        self.cache.invalidate();
        debug!(phrase = canonical.as_str(), keys = indexed, "insert");
        true
    }

    /// Point each of `keys` at `canonical`. The first key is the phrase's own
    /// spelling; later keys made only of stop-words would just add noise.
    /// Returns how many keys the trie took.
    fn index_keys(&mut self, canonical: &str, keys: &[String], frequency: u64) -> usize {
        let mut indexed = 0;
        for (i, key) in keys.iter().enumerate() {
            if i > 0 && !is_valid_phrase(key) {
                continue;
            }
            if self.trie.insert(key, canonical, frequency) != InsertOutcome::Rejected {
                indexed += 1;
            }
        }
        indexed
    }

    /// Insert each phrase once with weight 1. Returns how many were accepted.
    pub fn insert_batch<I, S>(&mut self, phrases: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        phrases
            .into_iter()
            .filter(|p| self.insert(p.as_ref(), 1))
            .count()
    }

    /// Ingest a text file with one query per line; blank lines are skipped.
    pub fn load_from_text_file(&mut self, path: &Path) -> io::Result<usize> {
        let content = fs::read_to_string(path)?;
        let count = self.insert_batch(content.lines().map(str::trim).filter(|l| !l.is_empty()));
        info!(path = %path.display(), count, "loaded queries from text file");
        Ok(count)
    }

    /// Whether `word` is an indexed key.
    pub fn contains(&self, word: &str) -> bool {
        let key = normalize(word);
        if let Some(found) = self.cache.get_contains(&key) {
            return found;
        }
        let found = self.trie.contains(&key);
        self.cache.put_contains(key, found);
        found
    }

    /// Ranked suggestions for a prefix or free-text query.
    pub fn suggest(&self, query: &str, max_suggestions: usize) -> Vec<Suggestion> {
        let query = normalize(query);
        if let Some(hit) = self.cache.get_suggest(&query, max_suggestions) {
            return hit;
        }
        let results = QueryPlanner::new(&self.trie, &self.frequencies, &self.segmenter)
            .smart_search(&query, max_suggestions);
        self.cache
            .put_suggest(query, max_suggestions, results.clone());
        results
    }

    /// Raw prefix enumeration, uncached and unranked.
    pub fn prefix_enumerate(&self, prefix: &str) -> Vec<Suggestion> {
        self.trie.prefix_enumerate(prefix)
    }

    /// Raw fuzzy search, uncached.
    pub fn fuzzy_search(&self, query: &str, max_distance: usize, limit: usize) -> Vec<Suggestion> {
        FuzzyMatcher::new(&self.trie).search(query, max_distance, limit)
    }

    /// Add `increment` to a known phrase and every key that points at it.
    /// Unknown phrases are ignored; returns whether anything changed.
    pub fn update_frequency(&mut self, phrase: &str, increment: u64) -> bool {
        let canonical = normalize(phrase);
        if !self.frequencies.contains(&canonical) {
            return false;
        }
        let keys = self.trie.update_frequency(&canonical, increment);
        self.frequencies.add(&canonical, increment);
        self.cache.invalidate();
        debug!(phrase = canonical.as_str(), keys, increment, "update_frequency");
        true
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            total_distinct_phrases: self.frequencies.len(),
            total_frequency: self.frequencies.total(),
            indexed_keys: self.trie.len(),
            node_count: self.trie.node_count(),
        }
    }

    pub fn top_phrases(&self, limit: usize) -> Vec<PhraseFrequency> {
        self.frequencies.top(limit)
    }

    pub fn frequency(&self, phrase: &str) -> Option<u64> {
        self.frequencies.get(&normalize(phrase))
    }

    pub fn clear_cache(&self) {
        self.cache.invalidate();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drop every phrase.
    pub fn clear(&mut self) {
        self.trie.clear();
        self.frequencies.clear();
        self.cache.invalidate();
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    pub fn trie(&self) -> &TrieStore {
        &self.trie
    }
}
