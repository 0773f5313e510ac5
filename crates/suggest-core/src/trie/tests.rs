use super::*;

fn store_with(words: &[&str]) -> TrieStore {
    let mut store = TrieStore::new();
    for w in words {
        store.insert(w, w, 1);
    }
    store
}

#[test]
fn test_insert_and_contains() {
    let store = store_with(&["hello", "hello world", "help", "hero", "heroine"]);
    assert!(store.contains("hello"));
    assert!(store.contains("hero"));
    assert!(store.contains("Hello World"));
    assert!(!store.contains("hell"));
    assert!(!store.contains("xyz"));
    assert_eq!(store.len(), 5);
}

#[test]
fn test_empty_key_rejected() {
    let mut store = TrieStore::new();
    assert_eq!(store.insert("", "", 1), InsertOutcome::Rejected);
    assert_eq!(store.insert("   ", "x", 1), InsertOutcome::Rejected);
    assert!(store.is_empty());
    assert_eq!(store.node_count(), 1);
}

#[test]
fn test_overlong_key_rejected() {
    let mut store = TrieStore::new();
    let long = "a".repeat(settings().index.max_phrase_chars + 1);
    assert_eq!(store.insert(&long, &long, 1), InsertOutcome::Rejected);
    assert!(!store.contains(&long));
}

#[test]
fn test_repeat_insert_accumulates_frequency() {
    let mut store = TrieStore::new();
    assert_eq!(store.insert("python", "python", 2), InsertOutcome::Created);
    assert_eq!(store.insert("python", "python", 2), InsertOutcome::Updated);
    assert_eq!(store.insert("python", "python", 2), InsertOutcome::Updated);
    let id = store.find("python").unwrap();
    assert_eq!(store.node(id).frequency(), 6);
    assert_eq!(store.len(), 1);
}

#[test]
fn test_first_writer_keeps_canonical_phrase() {
    let mut store = TrieStore::new();
    store.insert("python", "python tutorial", 1);
    store.insert("python", "learn python", 1);
    let node = store.node(store.find("python").unwrap());
    assert_eq!(node.canonical_phrase(), Some("python tutorial"));
    assert_eq!(node.frequency(), 2);
}

#[test]
fn test_intermediate_nodes_not_terminal() {
    let store = store_with(&["heroine"]);
    let id = store.find("hero").unwrap();
    let node = store.node(id);
    assert!(!node.is_terminal());
    assert_eq!(node.frequency(), 0);
    assert_eq!(node.canonical_phrase(), None);
}

#[test]
fn test_prefix_enumerate() {
    let store = store_with(&["hello", "help", "hero", "python"]);
    let mut keys: Vec<String> = store
        .prefix_enumerate("he")
        .into_iter()
        .map(|s| s.key)
        .collect();
    keys.sort();
    assert_eq!(keys, vec!["hello", "help", "hero"]);
}

#[test]
fn test_prefix_enumerate_includes_prefix_itself() {
    let store = store_with(&["hero", "heroine"]);
    let keys: Vec<String> = store
        .prefix_enumerate("hero")
        .into_iter()
        .map(|s| s.key)
        .collect();
    assert_eq!(keys, vec!["hero", "heroine"]);
}

#[test]
fn test_prefix_enumerate_missing_path() {
    let store = store_with(&["hello"]);
    assert!(store.prefix_enumerate("xyz123").is_empty());
    assert!(store.prefix_enumerate("").is_empty());
}

#[test]
fn test_prefix_enumerate_is_complete() {
    let mut store = TrieStore::new();
    for i in 0..2000 {
        let w = format!("ab{i:04}");
        store.insert(&w, &w, 1);
    }
    store.insert("abzz", "abzz", 50);
    let hits = store.prefix_enumerate("ab");
    assert_eq!(hits.len(), 2001);
    assert!(hits.iter().any(|s| s.key == "abzz"));
}

fn top_keys(store: &TrieStore, ids: Vec<NodeId>) -> Vec<&str> {
    ids.into_iter()
        .filter_map(|id| store.node(id).indexed_key())
        .collect()
}

#[test]
fn test_prefix_top_ranks_whole_subtree() {
    let mut store = store_with(&["aa", "ab", "ac", "ad"]);
    store.insert("az", "az", 9);
    store.insert("ac", "ac", 4);
    let ids = store.prefix_top("a", 2, |n| std::cmp::Reverse(n.frequency()), |_| true);
    assert_eq!(top_keys(&store, ids), vec!["az", "ac"]);
    assert!(store.prefix_top("a", 0, |n| n.frequency(), |_| true).is_empty());
    assert!(store.prefix_top("q", 3, |n| n.frequency(), |_| true).is_empty());
}

#[test]
fn test_prefix_top_one_per_phrase() {
    let mut store = TrieStore::new();
    store.insert("data science", "data science", 1);
    store.insert("data", "data science", 1);
    store.insert("database", "database", 1);
    let ids = store.prefix_top("data", 5, |n| n.frequency(), |_| true);
    let phrases: Vec<&str> = ids
        .iter()
        .filter_map(|&id| store.node(id).canonical_phrase())
        .collect();
    assert_eq!(phrases.len(), 2);
    assert!(phrases.contains(&"data science"));
    assert!(phrases.contains(&"database"));
}

#[test]
fn test_prefix_top_skips_rejected_phrases() {
    let mut store = store_with(&["ba", "bb", "bc"]);
    store.insert("bb", "bb", 10);
    let mut asked = Vec::new();
    let ids = store.prefix_top(
        "b",
        2,
        |n| std::cmp::Reverse(n.frequency()),
        |p| {
            asked.push(p.to_string());
            p != "bb"
        },
    );
    assert_eq!(top_keys(&store, ids), vec!["ba", "bc"]);
    assert_eq!(asked, vec!["ba", "bb", "bc"]);
}

#[test]
fn test_special_characters() {
    let store = store_with(&["hello-world", "hello_world"]);
    assert_eq!(store.prefix_enumerate("hello").len(), 2);
}

#[test]
fn test_cjk_keys() {
    let store = store_with(&["机器学习", "机器人"]);
    assert!(store.contains("机器学习"));
    assert_eq!(store.prefix_enumerate("机器").len(), 2);
}

#[test]
fn test_update_frequency_by_phrase() {
    let mut store = TrieStore::new();
    store.insert("python tutorial", "python tutorial", 1);
    store.insert("tutorial", "python tutorial", 1);
    assert_eq!(store.update_frequency("Python Tutorial", 5), 2);
    for &id in store.terminals_for("python tutorial") {
        assert_eq!(store.node(id).frequency(), 6);
    }
}

#[test]
fn test_update_frequency_unknown_phrase() {
    let mut store = store_with(&["hello"]);
    assert_eq!(store.update_frequency("missing", 3), 0);
    assert_eq!(store.node(store.find("hello").unwrap()).frequency(), 1);
}

#[test]
fn test_from_nodes_rebuilds_reverse_index() {
    let mut store = TrieStore::new();
    store.insert("data science", "data science", 1);
    store.insert("science", "data science", 1);
    let rebuilt = TrieStore::from_nodes(store.nodes.clone());
    assert_eq!(rebuilt.len(), 2);
    assert_eq!(rebuilt.terminals_for("data science").len(), 2);
    assert!(rebuilt.contains("science"));
}

#[test]
fn test_clear() {
    let mut store = store_with(&["hello"]);
    store.clear();
    assert!(store.is_empty());
    assert!(!store.contains("hello"));
}

#[test]
fn test_own_spelling_reclaims_segment_key() {
    let mut store = TrieStore::new();
    store.insert("python tutorial", "best python tutorial", 1);
    store.insert("python tutorial", "python tutorial", 1);
    let node = store.node(store.find("python tutorial").unwrap());
    assert_eq!(node.canonical_phrase(), Some("python tutorial"));
    assert_eq!(node.frequency(), 2);
    assert!(store.terminals_for("best python tutorial").is_empty());
    assert_eq!(store.terminals_for("python tutorial").len(), 1);
    assert_eq!(store.len(), 1);
}
