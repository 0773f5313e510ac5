//! Shared, path-bound autocomplete engine.
//!
//! Wraps one `AutocompleteIndex` (trie, frequency table and query cache) in
//! a single reader-writer lock. Lookups share the lock; inserts, frequency
//! updates, loads and saves take it exclusively.


use std::io;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use suggest_core::cache::CacheStats;
use suggest_core::settings::{settings, SettingsError};
use suggest_core::{
    AutocompleteIndex, IndexStats, LoadOutcome, LoadPolicy, PersistError, PhraseFrequency,
    Suggestion,
};
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("persistence error: {0}")]
    Persist(#[from] PersistError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid settings: {0}")]
    Settings(#[from] SettingsError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineStats {
    pub index: IndexStats,
    pub persistence_file: PathBuf,
}

pub struct SuggestEngine {
    index: RwLock<AutocompleteIndex>,
    path: PathBuf,
}

impl SuggestEngine {
    /// Empty engine bound to `path`; nothing is read until `load`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            index: RwLock::new(AutocompleteIndex::new()),
            path: path.into(),
        }
    }

    /// Engine bound to `path`, populated from the snapshot there if it is
    /// usable. Never fails: a missing or damaged snapshot yields an empty
    /// engine.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let engine = Self::new(path);
        engine.load();
        engine
    }

    /// Like `open`, but reports the load outcome and honours `policy`.
    pub fn open_with(
        path: impl Into<PathBuf>,
        policy: LoadPolicy,
    ) -> Result<(Self, LoadOutcome), EngineError> {
        let engine = Self::new(path);
        let outcome = engine.load_with(policy)?;
        Ok((engine, outcome))
    }

    // The index has no invariant a panicking writer can leave half-applied
    // that a reader could observe as unsafe, so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, AutocompleteIndex> {
        self.index.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, AutocompleteIndex> {
        self.index.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn insert(&self, phrase: &str, frequency: u64) -> bool {
        self.write().insert(phrase, frequency)
    }

    pub fn insert_batch<I, S>(&self, phrases: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.write().insert_batch(phrases)
    }

    /// Ingest a text file with one query per line.
    pub fn load_from_text_file(&self, path: &Path) -> Result<usize, EngineError> {
        Ok(self.write().load_from_text_file(path)?)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.read().contains(word)
    }

    /// Up to `default_max_suggestions` ranked suggestions.
    pub fn suggest(&self, query: &str) -> Vec<Suggestion> {
        self.suggest_n(query, settings().search.default_max_suggestions)
    }

    pub fn suggest_n(&self, query: &str, max_suggestions: usize) -> Vec<Suggestion> {
        self.read().suggest(query, max_suggestions)
    }

    pub fn update_frequency(&self, phrase: &str, increment: u64) -> bool {
        self.write().update_frequency(phrase, increment)
    }

    /// Write the snapshot to the engine's path. Failures are returned.
    pub fn save(&self) -> Result<(), EngineError> {
        let index = self.write();
        index.save_to(&self.path).map_err(|e| {
            warn!(path = %self.path.display(), error = %e, "failed to save index snapshot");
            EngineError::from(e)
        })
    }

    /// Replace the index with the snapshot at the engine's path, falling
    /// back to an empty index when the snapshot is unusable.
    pub fn load(&self) -> LoadOutcome {
        let outcome = self.write().load_from(&self.path, LoadPolicy::Lenient);
        match outcome {
            Ok(outcome) => outcome,
            // Lenient loads report problems through the outcome.
            Err(e) => LoadOutcome::Recovered(e),
        }
    }

    pub fn load_with(&self, policy: LoadPolicy) -> Result<LoadOutcome, EngineError> {
        let outcome = self.write().load_from(&self.path, policy)?;
        info!(path = %self.path.display(), ?policy, ?outcome, "load");
        Ok(outcome)
    }

    pub fn clear_cache(&self) {
        self.write().clear_cache();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.read().cache_stats()
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            index: self.read().stats(),
            persistence_file: self.path.clone(),
        }
    }

    pub fn top_phrases(&self, limit: usize) -> Vec<PhraseFrequency> {
        self.read().top_phrases(limit)
    }
}
