//! Character-level Unicode classification and phrase normalisation.

/// CJK ideographs (unified block plus extensions A and B).
pub fn is_han(c: char) -> bool {
    ('\u{4E00}'..='\u{9FFF}').contains(&c)
        || ('\u{3400}'..='\u{4DBF}').contains(&c)
        || ('\u{20000}'..='\u{2A6DF}').contains(&c)
}

/// Scripts written without spaces between words: Han, kana and Hangul.
pub fn is_cjk(c: char) -> bool {
    is_han(c)
        || ('\u{3040}'..='\u{30FF}').contains(&c)
        || ('\u{AC00}'..='\u{D7AF}').contains(&c)
}

pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Trim, lower-case and collapse internal whitespace runs to a single space.
///
/// Every key and canonical phrase stored in the index passes through here,
/// so lookups and inserts agree on one spelling.
pub fn normalize(s: &str) -> String {
    let lower = s.trim().to_lowercase();
    let mut out = String::with_capacity(lower.len());
    for word in lower.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}
