//! Property-based tests for AutocompleteIndex.
//!
//! Generates random phrase sets and checks the structural guarantees of
//! insertion, prefix lookup, ranking output and snapshots.

use std::collections::{HashMap, HashSet};

use proptest::prelude::*;

use super::AutocompleteIndex;
use crate::filter::is_valid_phrase;
use crate::unicode::normalize;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn arb_word() -> impl Strategy<Value = String> {
    prop_oneof![
        6 => "[a-f]{2,6}",
        1 => prop::sample::select(vec!["机器", "学习", "人工智能", "数据", "编程"])
            .prop_map(str::to_string),
    ]
}

fn arb_phrase() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_word(), 1..4).prop_map(|words| words.join(" "))
}

fn arb_phrases() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(arb_phrase(), 1..20)
}

fn build(phrases: &[String]) -> AutocompleteIndex {
    let mut index = AutocompleteIndex::new();
    index.insert_batch(phrases);
    index
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn inserted_phrases_are_contained(phrases in arb_phrases()) {
        let index = build(&phrases);
        for p in &phrases {
            prop_assert!(index.contains(p), "missing {:?}", p);
        }
    }

    #[test]
    fn every_prefix_reaches_its_phrase(phrases in arb_phrases()) {
        let index = build(&phrases);
        for p in &phrases {
            let canonical = normalize(p);
            let chars: Vec<char> = canonical.chars().collect();
            for end in 1..=chars.len() {
                let prefix: String = chars[..end].iter().collect();
                let hits = index.prefix_enumerate(&prefix);
                prop_assert!(
                    hits.iter().any(|h| h.key == canonical),
                    "{:?} not under prefix {:?}", canonical, prefix
                );
            }
        }
    }

    #[test]
    fn frequencies_are_additive(phrases in arb_phrases()) {
        let index = build(&phrases);
        let mut expected: HashMap<String, u64> = HashMap::new();
        for p in &phrases {
            *expected.entry(normalize(p)).or_default() += 1;
        }
        for (phrase, count) in &expected {
            prop_assert_eq!(index.frequency(phrase), Some(*count));
        }
        let stats = index.stats();
        prop_assert_eq!(stats.total_distinct_phrases, expected.len());
        prop_assert_eq!(stats.total_frequency, phrases.len() as u64);
    }

    #[test]
    fn suggestions_are_unique_valid_and_bounded(
        phrases in arb_phrases(),
        query in arb_word(),
        max in 1usize..8,
    ) {
        let index = build(&phrases);
        let results = index.suggest(&query, max);
        prop_assert!(results.len() <= max);
        let mut seen = HashSet::new();
        for s in &results {
            prop_assert!(seen.insert(s.canonical_phrase.clone()), "duplicate {:?}", s.canonical_phrase);
            prop_assert!(is_valid_phrase(&s.canonical_phrase));
        }
        for pair in results.windows(2) {
            prop_assert!(pair[0].match_type.priority() <= pair[1].match_type.priority());
        }
    }

    #[test]
    fn snapshot_roundtrip_preserves_index(phrases in arb_phrases()) {
        let index = build(&phrases);
        let bytes = index.to_bytes().unwrap();
        let loaded = AutocompleteIndex::from_bytes(&bytes).unwrap();
        prop_assert_eq!(loaded.stats(), index.stats());
        prop_assert_eq!(loaded.top_phrases(usize::MAX), index.top_phrases(usize::MAX));
        for p in &phrases {
            prop_assert!(loaded.contains(p));
        }
        prop_assert_eq!(loaded.to_bytes().unwrap(), bytes);
    }
}
