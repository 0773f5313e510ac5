//! Phrase-level popularity, counted once per canonical phrase no matter how
//! many trie keys point at it.

use std::collections::HashMap;

use crate::types::PhraseFrequency;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: HashMap<String, u64>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, phrase: &str, delta: u64) -> u64 {
        let count = self.counts.entry(phrase.to_string()).or_insert(0);
        *count = count.saturating_add(delta);
        *count
    }

    pub fn get(&self, phrase: &str) -> Option<u64> {
        self.counts.get(phrase).copied()
    }

    pub fn contains(&self, phrase: &str) -> bool {
        self.counts.contains_key(phrase)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.counts.values().fold(0u64, |acc, &f| acc.saturating_add(f))
    }

    /// Most frequent phrases first; equal counts ordered by phrase.
    pub fn top(&self, limit: usize) -> Vec<PhraseFrequency> {
        let mut all: Vec<(&String, &u64)> = self.counts.iter().collect();
        all.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        all.into_iter()
            .take(limit)
            .map(|(phrase, &frequency)| PhraseFrequency {
                phrase: phrase.clone(),
                frequency,
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(p, &f)| (p.as_str(), f))
    }

    pub fn clear(&mut self) {
        self.counts.clear();
    }
}

impl FromIterator<(String, u64)> for FrequencyTable {
    fn from_iter<T: IntoIterator<Item = (String, u64)>>(iter: T) -> Self {
        Self {
            counts: iter.into_iter().collect(),
        }
    }
}
