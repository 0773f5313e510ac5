use std::fmt;

/// How a suggestion relates to the query. Variant order is the ranking tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchType {
    /// The canonical phrase starts with the query.
    Exact,
    /// Reached through a segmented sub-key of the phrase or of the query.
    Partial,
    /// Within the edit-distance budget of the query.
    Fuzzy,
}

impl MatchType {
    pub fn priority(self) -> u8 {
        match self {
            MatchType::Exact => 0,
            MatchType::Partial => 1,
            MatchType::Fuzzy => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MatchType::Exact => "exact",
            MatchType::Partial => "partial",
            MatchType::Fuzzy => "fuzzy",
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    /// The trie key the hit was found under.
    pub key: String,
    pub canonical_phrase: String,
    pub frequency: u64,
    pub match_type: MatchType,
    pub distance: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseFrequency {
    pub phrase: String,
    pub frequency: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndexStats {
    pub total_distinct_phrases: usize,
    pub total_frequency: u64,
    /// Terminal trie nodes (one per distinct indexed key).
    pub indexed_keys: usize,
    pub node_count: usize,
}
