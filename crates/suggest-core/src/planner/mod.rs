//! Multi-strategy suggestion search.
//!
//! Runs exact prefix lookup, prefix lookup on the query's own segments and a
//! bounded fuzzy pass, then filters, deduplicates by canonical phrase and
//! ranks by match tier and phrase frequency. Prefix passes keep only the
//! best phrases while scanning, so large subtrees never truncate ranking.


use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use tracing::{debug, debug_span};

use crate::filter::is_valid_phrase;
use crate::frequency::FrequencyTable;
use crate::fuzzy::FuzzyMatcher;
use crate::segment::Segmenter;
use crate::settings::settings;
use crate::trie::{TrieNode, TrieStore};
use crate::types::{MatchType, Suggestion};
use crate::unicode::{char_len, normalize};

/// Queries shorter than this skip the fuzzy pass.
const FUZZY_MIN_QUERY_CHARS: usize = 3;

pub struct QueryPlanner<'a> {
    store: &'a TrieStore,
    frequencies: &'a FrequencyTable,
    segmenter: &'a Segmenter,
    max_distance: usize,
}

impl<'a> QueryPlanner<'a> {
    pub fn new(
        store: &'a TrieStore,
        frequencies: &'a FrequencyTable,
        segmenter: &'a Segmenter,
    ) -> Self {
        Self {
            store,
            frequencies,
            segmenter,
            max_distance: settings().search.fuzzy_max_distance,
        }
    }

    pub fn with_max_distance(mut self, max_distance: usize) -> Self {
        self.max_distance = max_distance;
        self
    }

    /// Ranked suggestions for `query`, at most `max_suggestions`, no two
    /// sharing a canonical phrase.
    pub fn smart_search(&self, query: &str, max_suggestions: usize) -> Vec<Suggestion> {
        let query = normalize(query);
        if max_suggestions == 0 || query.is_empty() || !is_valid_phrase(&query) {
            return Vec::new();
        }
        let _span = debug_span!("smart_search", query = query.as_str(), max_suggestions).entered();

        let mut raw = self.exact_hits(&query, max_suggestions);
        let exact_count = raw.len();

        let mut partial = self.partial_hits(&query, max_suggestions);
        let partial_count = partial.len();

        let fuzzy = if char_len(&query) >= FUZZY_MIN_QUERY_CHARS {
            FuzzyMatcher::new(self.store).search(&query, self.max_distance, max_suggestions)
        } else {
            Vec::new()
        };
        let fuzzy_count = fuzzy.len();

        // A sub-key hit the whole query also reaches within the edit budget
        // is the query naming that phrase with a typo.
        let typo_of: HashMap<&str, usize> = fuzzy
            .iter()
            .map(|hit| (hit.canonical_phrase.as_str(), hit.distance))
            .collect();
        let mut reclassified = 0;
        for hit in &mut partial {
            if let Some(&distance) = typo_of.get(hit.canonical_phrase.as_str()) {
                hit.match_type = MatchType::Fuzzy;
                hit.distance = distance;
                reclassified += 1;
            }
        }
        raw.extend(partial);
        raw.extend(fuzzy);

        for hit in &mut raw {
            if let Some(f) = self.frequencies.get(&hit.canonical_phrase) {
                hit.frequency = f;
            }
        }

        // Stable: among equal ranks the earlier pass wins.
        raw.sort_by(rank);

        let mut seen = HashSet::new();
        let results: Vec<Suggestion> = raw
            .into_iter()
            .filter(|hit| seen.insert(hit.canonical_phrase.clone()))
            .filter(|hit| is_valid_phrase(&hit.canonical_phrase))
            .take(max_suggestions)
            .collect();

        debug!(
            exact = exact_count,
            partial = partial_count,
            fuzzy = fuzzy_count,
            reclassified,
            returned = results.len()
        );
        results
    }

    /// Phrase-level popularity, falling back to the key's own weight.
    fn phrase_frequency(&self, node: &TrieNode) -> u64 {
        node.canonical_phrase()
            .and_then(|p| self.frequencies.get(p))
            .unwrap_or(node.frequency())
    }

    /// Best `limit` phrases under the query itself. Hits that came in through
    /// a derived key rather than the phrase's own spelling are partial.
    fn exact_hits(&self, query: &str, limit: usize) -> Vec<Suggestion> {
        let tier = |phrase: &str| {
            if phrase.starts_with(query) {
                MatchType::Exact
            } else {
                MatchType::Partial
            }
        };
        self.store
            .prefix_top(
                query,
                limit,
                |node| {
                    let phrase = node.canonical_phrase().unwrap_or_default();
                    (tier(phrase), Reverse(self.phrase_frequency(node)))
                },
                is_valid_phrase,
            )
            .into_iter()
            .filter_map(|id| {
                let phrase = self.store.node(id).canonical_phrase()?;
                self.store.suggestion_at(id, tier(phrase), 0)
            })
            .collect()
    }

    /// Prefix lookup on each segment of the query, half the budget apiece.
    fn partial_hits(&self, query: &str, max_suggestions: usize) -> Vec<Suggestion> {
        let keys = self.segmenter.segment(query);
        if keys.len() <= 1 {
            return Vec::new();
        }
        let budget = (max_suggestions / 2).max(1);

        let mut hits = Vec::new();
        for key in keys.iter().filter(|k| k.as_str() != query) {
            if !is_valid_phrase(key) {
                continue;
            }
            let found = self.store.prefix_top(
                key,
                budget,
                |node| Reverse(self.phrase_frequency(node)),
                is_valid_phrase,
            );
            hits.extend(
                found
                    .into_iter()
                    .filter_map(|id| self.store.suggestion_at(id, MatchType::Partial, 0)),
            );
        }
        hits
    }
}

/// Tier ascending, frequency descending, then distance and phrase so equal
/// scores come out in a fixed order.
fn rank(a: &Suggestion, b: &Suggestion) -> std::cmp::Ordering {
    a.match_type
        .priority()
        .cmp(&b.match_type.priority())
        .then(b.frequency.cmp(&a.frequency))
        .then(a.distance.cmp(&b.distance))
        .then_with(|| a.canonical_phrase.cmp(&b.canonical_phrase))
}
