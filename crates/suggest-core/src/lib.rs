pub mod cache;
pub mod filter;
pub mod frequency;
pub mod fuzzy;
pub mod index;
pub mod planner;
pub mod segment;
pub mod settings;
pub mod trie;
pub mod types;
pub mod unicode;

pub use index::{AutocompleteIndex, LoadOutcome, LoadPolicy, PersistError};
pub use types::{IndexStats, MatchType, PhraseFrequency, Suggestion};
