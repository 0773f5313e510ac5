//! Bounded Levenshtein search run directly over trie nodes.
//!
//! Each stack frame carries one row of the edit-distance table for the
//! path spelled so far. A branch is dropped as soon as no cell of its row is
//! within budget. Once the whole query fits within budget at some node, the
//! subtree below it is collected as well, so a typo in the middle of a key
//! still surfaces longer completions ("pythn" → "python tutorial").

use tracing::{debug, debug_span};

use crate::filter::is_valid_phrase;
use crate::settings::settings;
use crate::trie::{NodeId, TrieStore, ROOT};
use crate::types::{MatchType, Suggestion};
use crate::unicode::normalize;

struct Frame {
    node: NodeId,
    /// `None` once the row can no longer improve the best distance.
    row: Option<Vec<usize>>,
    /// Smallest whole-query distance seen on the path to `node`.
    best: usize,
}

pub struct FuzzyMatcher<'a> {
    store: &'a TrieStore,
    max_visits: usize,
}

impl<'a> FuzzyMatcher<'a> {
    pub fn new(store: &'a TrieStore) -> Self {
        Self {
            store,
            max_visits: settings().search.fuzzy_max_visits,
        }
    }

    pub fn with_max_visits(mut self, max_visits: usize) -> Self {
        self.max_visits = max_visits;
        self
    }

    /// Terminals within `max_distance` edits of `query` (or of a prefix of
    /// the terminal's key), at most `limit × fuzzy_candidate_factor` of them,
    /// closest first.
    pub fn search(&self, query: &str, max_distance: usize, limit: usize) -> Vec<Suggestion> {
        let s = &settings().search;
        let query = normalize(query);
        if !is_valid_phrase(&query) {
            return Vec::new();
        }
        let max_distance = max_distance.min(s.fuzzy_distance_cap);
        let cap = limit.saturating_mul(s.fuzzy_candidate_factor);
        if cap == 0 {
            return Vec::new();
        }

        let _span = debug_span!("fuzzy_search", query = query.as_str(), max_distance, limit).entered();

        let target: Vec<char> = query.chars().collect();
        let n = target.len();
        let first_row: Vec<usize> = (0..=n).collect();
        let mut stack = vec![Frame {
            node: ROOT,
            best: first_row[n],
            row: Some(first_row),
        }];

        let mut hits: Vec<Suggestion> = Vec::new();
        let mut visits = 0usize;
        while let Some(frame) = stack.pop() {
            if visits >= self.max_visits || hits.len() >= cap {
                break;
            }
            visits += 1;

            let node = self.store.node(frame.node);
            if frame.best <= max_distance {
                if let Some(hit) =
                    self.store
                        .suggestion_at(frame.node, MatchType::Fuzzy, frame.best)
                {
                    hits.push(hit);
                }
            }

            for (c, child) in node.children().rev() {
                match &frame.row {
                    Some(row) => {
                        let next = next_row(row, &target, c);
                        let best = frame.best.min(next[n]);
                        let live = next.iter().min().is_some_and(|&m| m <= max_distance);
                        if live {
                            stack.push(Frame {
                                node: child,
                                row: Some(next),
                                best,
                            });
                        } else if best <= max_distance {
                            stack.push(Frame {
                                node: child,
                                row: None,
                                best,
                            });
                        }
                    }
                    None => stack.push(Frame {
                        node: child,
                        row: None,
                        best: frame.best,
                    }),
                }
            }
        }

        hits.sort_by(|a, b| {
            a.distance
                .cmp(&b.distance)
                .then(b.frequency.cmp(&a.frequency))
                .then_with(|| a.key.cmp(&b.key))
        });
        debug!(visits, hits = hits.len());
        hits
    }
}

/// One step of the Levenshtein table: the row for `prev`'s path extended by `c`.
fn next_row(prev: &[usize], target: &[char], c: char) -> Vec<usize> {
    let mut row = Vec::with_capacity(prev.len());
    row.push(prev[0] + 1);
    for i in 1..prev.len() {
        let insert = row[i - 1] + 1;
        let delete = prev[i] + 1;
        let substitute = prev[i - 1] + usize::from(target[i - 1] != c);
        row.push(insert.min(delete).min(substitute));
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(words: &[&str]) -> TrieStore {
        let mut store = TrieStore::new();
        for w in words {
            store.insert(w, w, 1);
        }
        store
    }

    fn phrases(hits: &[Suggestion]) -> Vec<&str> {
        hits.iter().map(|h| h.canonical_phrase.as_str()).collect()
    }

    #[test]
    fn test_next_row_matches_levenshtein() {
        let target: Vec<char> = "kitten".chars().collect();
        let mut row: Vec<usize> = (0..=target.len()).collect();
        for c in "sitting".chars() {
            row = next_row(&row, &target, c);
        }
        assert_eq!(row[target.len()], 3);
    }

    #[test]
    fn test_single_deletion() {
        let store = store_with(&["python", "java"]);
        let hits = FuzzyMatcher::new(&store).search("pythn", 1, 10);
        assert_eq!(phrases(&hits), vec!["python"]);
        assert_eq!(hits[0].distance, 1);
        assert_eq!(hits[0].match_type, MatchType::Fuzzy);
    }

    #[test]
    fn test_substitution_and_insertion() {
        let store = store_with(&["weather", "whether"]);
        let hits = FuzzyMatcher::new(&store).search("wether", 1, 10);
        let found = phrases(&hits);
        assert!(found.contains(&"weather"));
        assert!(found.contains(&"whether"));
    }

    #[test]
    fn test_extends_past_query_length() {
        let store = store_with(&["python tutorial", "pascal"]);
        let hits = FuzzyMatcher::new(&store).search("pythn", 1, 10);
        assert_eq!(phrases(&hits), vec!["python tutorial"]);
    }

    #[test]
    fn test_typo_inside_multi_word_key() {
        let store = store_with(&["python tutorial"]);
        let hits = FuzzyMatcher::new(&store).search("pythn tutorial", 1, 10);
        assert_eq!(phrases(&hits), vec!["python tutorial"]);
        assert_eq!(hits[0].distance, 1);
    }

    #[test]
    fn test_beyond_budget_pruned() {
        let store = store_with(&["python"]);
        assert!(FuzzyMatcher::new(&store).search("pxthxn", 1, 10).is_empty());
        assert_eq!(FuzzyMatcher::new(&store).search("pxthxn", 2, 10).len(), 1);
    }

    #[test]
    fn test_distance_clamped_to_cap() {
        let store = store_with(&["abcdefgh"]);
        let cap = settings().search.fuzzy_distance_cap;
        let far = "zzzzzzzz";
        assert!(FuzzyMatcher::new(&store).search(far, cap + 10, 10).is_empty());
    }

    #[test]
    fn test_invalid_query_rejected() {
        let store = store_with(&["the end", "in bloom"]);
        let matcher = FuzzyMatcher::new(&store);
        assert!(matcher.search("the", 1, 10).is_empty());
        assert!(matcher.search("i", 1, 10).is_empty());
        assert!(matcher.search("", 1, 10).is_empty());
    }

    #[test]
    fn test_candidate_cap() {
        let words: Vec<String> = (0..50).map(|i| format!("python{i:02}")).collect();
        let refs: Vec<&str> = words.iter().map(String::as_str).collect();
        let store = store_with(&refs);
        let hits = FuzzyMatcher::new(&store).search("pythn", 1, 2);
        assert_eq!(hits.len(), 2 * settings().search.fuzzy_candidate_factor);
    }

    #[test]
    fn test_visit_cap() {
        let store = store_with(&["python"]);
        let hits = FuzzyMatcher::new(&store)
            .with_max_visits(3)
            .search("pythn", 1, 10);
        assert!(hits.is_empty());
    }

    #[test]
    fn test_closest_first() {
        let store = store_with(&["python", "pythn"]);
        let hits = FuzzyMatcher::new(&store).search("pythn", 1, 10);
        assert_eq!(hits[0].canonical_phrase, "pythn");
        assert_eq!(hits[0].distance, 0);
    }
}
