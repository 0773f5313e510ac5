//! Validity filter for queries and suggestions.
//!
//! A heuristic, not linguistics: a phrase is rejected when it is too short,
//! is a stop-word, or consists only of stop-words.

use std::collections::HashSet;
use std::sync::OnceLock;

use crate::segment::tokenize;
use crate::settings::settings;
use crate::unicode::{char_len, normalize};

const STOP_WORDS: &[&str] = &[
    // English function words
    "a", "an", "the", "and", "or", "but", "if", "so", "as", "at", "by", "for", "from", "in",
    "into", "of", "on", "onto", "out", "over", "under", "up", "down", "to", "with", "again",
    "then", "than", "is", "am", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "do", "does", "did", "will", "would", "could", "should", "shall", "may", "might",
    "can", "must", "it", "its", "he", "she", "they", "we", "you", "i", "me", "him", "her",
    "them", "us", "my", "our", "your", "his", "their", "this", "that", "these", "those",
    "not", "no", "ing",
    // Chinese function words
    "的", "了", "在", "是", "我", "有", "和", "就", "不", "人", "都", "一", "也", "很",
    "到", "说", "要", "去", "你", "会", "着", "没有", "看", "好", "自己", "这", "那", "之",
    "与", "及", "等", "吗", "呢", "吧", "啊", "把", "被", "他", "她", "它", "们",
];

fn stop_words() -> &'static HashSet<&'static str> {
    static INSTANCE: OnceLock<HashSet<&'static str>> = OnceLock::new();
    INSTANCE.get_or_init(|| STOP_WORDS.iter().copied().collect())
}

pub fn is_stop_word(word: &str) -> bool {
    stop_words().contains(normalize(word).as_str())
}

/// Whether `phrase` is worth querying for or suggesting.
pub fn is_valid_phrase(phrase: &str) -> bool {
    let phrase = normalize(phrase);
    if char_len(&phrase) < settings().search.min_word_length {
        return false;
    }
    if stop_words().contains(phrase.as_str()) {
        return false;
    }
    let tokens = tokenize(&phrase);
    !tokens.is_empty() && !tokens.iter().all(|t| stop_words().contains(t.text.as_str()))
}
