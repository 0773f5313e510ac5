//! Phrase segmentation into indexable keys.
//!
//! A phrase is split into word tokens (whitespace for Latin text, jieba for
//! CJK runs), then every contiguous token window becomes a key. Long CJK
//! tokens additionally contribute short character windows, which recovers
//! sub-words the segmenter merged. All keys map back to the phrase they
//! came from; that mapping is kept by the caller.


use std::collections::HashSet;
use std::sync::OnceLock;

use jieba_rs::Jieba;

use crate::settings::settings;
use crate::unicode::{char_len, is_cjk, normalize};

fn jieba() -> &'static Jieba {
    static INSTANCE: OnceLock<Jieba> = OnceLock::new();
    INSTANCE.get_or_init(Jieba::new)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub cjk: bool,
    /// Whitespace separated this token from the previous one in the source.
    pub spaced: bool,
}

/// Split a phrase into word tokens after normalisation.
pub fn tokenize(phrase: &str) -> Vec<Token> {
    let phrase = normalize(phrase);
    let mut tokens = Vec::new();
    for (wi, word) in phrase.split(' ').enumerate() {
        let mut first = true;
        for (run, cjk) in script_runs(word) {
            let pieces: Vec<&str> = if cjk {
                jieba().cut(run, false)
            } else {
                vec![run]
            };
            for piece in pieces {
                let piece = piece.trim();
                if piece.is_empty() {
                    continue;
                }
                tokens.push(Token {
                    text: piece.to_string(),
                    cjk,
                    spaced: first && wi > 0,
                });
                first = false;
            }
        }
    }
    tokens
}

/// Maximal runs of CJK / non-CJK characters within one word.
fn script_runs(word: &str) -> Vec<(&str, bool)> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut current: Option<bool> = None;
    for (i, c) in word.char_indices() {
        let cjk = is_cjk(c);
        match current {
            Some(prev) if prev != cjk => {
                runs.push((&word[start..i], prev));
                start = i;
                current = Some(cjk);
            }
            None => current = Some(cjk),
            _ => {}
        }
    }
    if let Some(cjk) = current {
        runs.push((&word[start..], cjk));
    }
    runs
}

#[derive(Debug, Clone)]
pub struct Segmenter {
    min_key_chars: usize,
    window_min: usize,
    window_max: usize,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Segmenter {
    pub fn new() -> Self {
        let s = &settings().segment;
        Self {
            min_key_chars: s.min_key_chars,
            window_min: s.cjk_window_min,
            window_max: s.cjk_window_max,
        }
    }

    /// Index keys for `phrase`, deduplicated, full phrase first.
    ///
    /// Returns an empty list for an empty phrase.
    pub fn segment(&self, phrase: &str) -> Vec<String> {
        let full = normalize(phrase);
        if full.is_empty() {
            return Vec::new();
        }

        let mut seen = HashSet::new();
        let mut keys = Vec::new();
        let mut push = |key: String, keys: &mut Vec<String>| {
            if seen.insert(key.clone()) {
                keys.push(key);
            }
        };
        push(full.clone(), &mut keys);

        let tokens = tokenize(&full);
        for i in 0..tokens.len() {
            let mut key = String::new();
            for (j, token) in tokens.iter().enumerate().skip(i) {
                if j > i && token.spaced {
                    key.push(' ');
                }
                key.push_str(&token.text);
                if char_len(&key) >= self.min_key_chars {
                    push(key.clone(), &mut keys);
                }
            }
        }

        for token in tokens.iter().filter(|t| t.cjk) {
            let chars: Vec<char> = token.text.chars().collect();
            if chars.len() <= 2 {
                continue;
            }
            for size in self.window_min..=self.window_max.min(chars.len() - 1) {
                for window in chars.windows(size) {
                    let key: String = window.iter().collect();
                    if char_len(&key) >= self.min_key_chars {
                        push(key, &mut keys);
                    }
                }
            }
        }

        keys
    }
}
