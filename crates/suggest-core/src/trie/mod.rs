//! Arena-backed character trie.
//!
//! Nodes live in one `Vec` and refer to their children by index, so the
//! tree can be walked, flattened and rebuilt without recursion. Every
//! terminal records the key spelled by its path and the canonical phrase it
//! stands for; one phrase is usually reachable through several keys.

#[cfg(test)]
mod tests;

use std::collections::{BTreeMap, BinaryHeap, HashMap, HashSet};

use crate::settings::settings;
use crate::types::{MatchType, Suggestion};
use crate::unicode::{char_len, normalize};

pub type NodeId = u32;

pub const ROOT: NodeId = 0;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrieNode {
    pub(crate) children: BTreeMap<char, NodeId>,
    pub(crate) frequency: u64,
    pub(crate) indexed_key: Option<String>,
    pub(crate) canonical_phrase: Option<String>,
}

impl TrieNode {
    /// A node is terminal exactly when it carries a canonical phrase.
    pub fn is_terminal(&self) -> bool {
        self.canonical_phrase.is_some()
    }

    pub fn frequency(&self) -> u64 {
        self.frequency
    }

    pub fn indexed_key(&self) -> Option<&str> {
        self.indexed_key.as_deref()
    }

    pub fn canonical_phrase(&self) -> Option<&str> {
        self.canonical_phrase.as_deref()
    }

    pub fn child(&self, c: char) -> Option<NodeId> {
        self.children.get(&c).copied()
    }

    /// Children in code-point order.
    pub fn children(&self) -> impl DoubleEndedIterator<Item = (char, NodeId)> + '_ {
        self.children.iter().map(|(&c, &id)| (c, id))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new terminal was created.
    Created,
    /// The key already existed; its frequency grew.
    Updated,
    /// Empty, whitespace-only or over-long key.
    Rejected,
}

#[derive(Debug, Clone)]
pub struct TrieStore {
    nodes: Vec<TrieNode>,
    /// canonical phrase → terminals that point at it
    by_phrase: HashMap<String, Vec<NodeId>>,
    terminal_count: usize,
}

impl Default for TrieStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TrieStore {
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::default()],
            by_phrase: HashMap::new(),
            terminal_count: 0,
        }
    }

    /// Insert `key` as a terminal for `canonical_phrase`.
    ///
    /// An existing terminal keeps its first canonical phrase and only gains
    /// `weight`.
    pub fn insert(&mut self, key: &str, canonical_phrase: &str, weight: u64) -> InsertOutcome {
        let key = normalize(key);
        if key.is_empty() || char_len(&key) > settings().index.max_phrase_chars {
            return InsertOutcome::Rejected;
        }
        let canonical = normalize(canonical_phrase);
        let canonical = if canonical.is_empty() {
            key.clone()
        } else {
            canonical
        };

        let mut node = ROOT;
        for c in key.chars() {
            node = match self.nodes[node as usize].child(c) {
                Some(next) => next,
                None => self.push_child(node, c),
            };
        }

        let target = &mut self.nodes[node as usize];
        target.frequency = target.frequency.saturating_add(weight);
        if let Some(owner) = target.canonical_phrase.clone() {
            // A phrase's own spelling always belongs to it, even when an
            // earlier phrase claimed the key as one of its segments.
            if key == canonical && owner != canonical {
                target.canonical_phrase = Some(canonical.clone());
                self.reassign(node, &owner, canonical);
            }
            return InsertOutcome::Updated;
        }
        target.indexed_key = Some(key);
        target.canonical_phrase = Some(canonical.clone());
        self.terminal_count += 1;
        self.by_phrase.entry(canonical).or_default().push(node);
        InsertOutcome::Created
    }

    fn reassign(&mut self, node: NodeId, from: &str, to: String) {
        if let Some(ids) = self.by_phrase.get_mut(from) {
            ids.retain(|&id| id != node);
            if ids.is_empty() {
                self.by_phrase.remove(from);
            }
        }
        self.by_phrase.entry(to).or_default().push(node);
    }

    fn push_child(&mut self, parent: NodeId, c: char) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(TrieNode::default());
        self.nodes[parent as usize].children.insert(c, id);
        id
    }

    /// Exact terminal lookup.
    pub fn contains(&self, key: &str) -> bool {
        self.find(key)
            .is_some_and(|id| self.nodes[id as usize].is_terminal())
    }

    /// Node reached by spelling `key` from the root, terminal or not.
    pub fn find(&self, key: &str) -> Option<NodeId> {
        let key = normalize(key);
        if key.is_empty() {
            return None;
        }
        self.walk(ROOT, &key)
    }

    fn walk(&self, from: NodeId, path: &str) -> Option<NodeId> {
        path.chars()
            .try_fold(from, |node, c| self.nodes[node as usize].child(c))
    }

    pub fn node(&self, id: NodeId) -> &TrieNode {
        &self.nodes[id as usize]
    }

    /// Every terminal under `prefix`, tagged `Exact`. Callers that know the
    /// query decide whether a hit is really a partial match.
    pub fn prefix_enumerate(&self, prefix: &str) -> Vec<Suggestion> {
        let Some(start) = self.find(prefix) else {
            return Vec::new();
        };
        self.collect_terminals(start)
            .into_iter()
            .filter_map(|id| self.suggestion_at(id, MatchType::Exact, 0))
            .collect()
    }

    /// Pre-order terminal descendants of `start` (inclusive), children
    /// visited in code-point order.
    fn collect_terminals(&self, start: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id as usize];
            if node.is_terminal() {
                out.push(id);
            }
            stack.extend(node.children().rev().map(|(_, child)| child));
        }
        out
    }

    /// The `k` best terminals under `prefix`, at most one per canonical
    /// phrase, best first.
    ///
    /// `rank` orders candidates (smaller is better) and must depend only on
    /// the node's canonical phrase. `accept` is asked about a phrase only
    /// when it would make the cut; rejected phrases are never asked again.
    pub fn prefix_top<K, R, A>(&self, prefix: &str, k: usize, rank: R, mut accept: A) -> Vec<NodeId>
    where
        K: Ord,
        R: Fn(&TrieNode) -> K,
        A: FnMut(&str) -> bool,
    {
        let Some(start) = self.find(prefix) else {
            return Vec::new();
        };
        if k == 0 {
            return Vec::new();
        }

        // Max-heap on rank: the top is the weakest phrase currently kept.
        let mut heap: BinaryHeap<(K, &str, NodeId)> = BinaryHeap::new();
        let mut held: HashSet<&str> = HashSet::new();
        let mut rejected: HashSet<&str> = HashSet::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id as usize];
            stack.extend(node.children().rev().map(|(_, child)| child));
            let Some(phrase) = node.canonical_phrase() else {
                continue;
            };
            if held.contains(phrase) || rejected.contains(phrase) {
                continue;
            }
            let key = rank(node);
            if heap.len() >= k {
                if let Some((worst, worst_phrase, _)) = heap.peek() {
                    if (&key, phrase) >= (worst, *worst_phrase) {
                        continue;
                    }
                }
            }
            if !accept(phrase) {
                rejected.insert(phrase);
                continue;
            }
            heap.push((key, phrase, id));
            held.insert(phrase);
            if heap.len() > k {
                if let Some((_, evicted, _)) = heap.pop() {
                    held.remove(evicted);
                }
            }
        }
        heap.into_sorted_vec()
            .into_iter()
            .map(|(_, _, id)| id)
            .collect()
    }

    pub(crate) fn suggestion_at(
        &self,
        id: NodeId,
        match_type: MatchType,
        distance: usize,
    ) -> Option<Suggestion> {
        let node = &self.nodes[id as usize];
        Some(Suggestion {
            key: node.indexed_key.clone()?,
            canonical_phrase: node.canonical_phrase.clone()?,
            frequency: node.frequency,
            match_type,
            distance,
        })
    }

    /// Add `delta` to every terminal whose canonical phrase is `phrase`.
    /// Returns how many terminals changed; zero means the phrase is unknown.
    pub fn update_frequency(&mut self, phrase: &str, delta: u64) -> usize {
        let phrase = normalize(phrase);
        let Some(ids) = self.by_phrase.get(&phrase) else {
            return 0;
        };
        for &id in ids {
            let node = &mut self.nodes[id as usize];
            node.frequency = node.frequency.saturating_add(delta);
        }
        ids.len()
    }

    /// Terminals whose canonical phrase is `phrase`.
    pub fn terminals_for(&self, phrase: &str) -> &[NodeId] {
        self.by_phrase
            .get(&normalize(phrase))
            .map_or(&[], |ids| ids.as_slice())
    }

    /// Number of terminal nodes (distinct indexed keys).
    pub fn len(&self) -> usize {
        self.terminal_count
    }

    pub fn is_empty(&self) -> bool {
        self.terminal_count == 0
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Rebuild the derived indexes over an already-linked node arena.
    pub(crate) fn from_nodes(nodes: Vec<TrieNode>) -> Self {
        let mut by_phrase: HashMap<String, Vec<NodeId>> = HashMap::new();
        let mut terminal_count = 0;
        for (id, node) in nodes.iter().enumerate() {
            if let Some(phrase) = &node.canonical_phrase {
                terminal_count += 1;
                by_phrase.entry(phrase.clone()).or_default().push(id as NodeId);
            }
        }
        let nodes = if nodes.is_empty() {
            vec![TrieNode::default()]
        } else {
            nodes
        };
        Self {
            nodes,
            by_phrase,
            terminal_count,
        }
    }
}
