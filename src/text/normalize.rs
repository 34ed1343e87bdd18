//! Text normalization shared by keyword extraction, soft dedup and search.
//!
//! Every downstream comparison works on the token stream produced here, so the
//! same headline with or without diacritics, punctuation or casing yields the
//! same tokens.
//!
//! # Steps
//!
//! 1. Unicode NFD decomposition, dropping combining marks (`é` → `e`)
//! 2. Lowercasing
//! 3. Every run of characters outside `[a-z0-9]` becomes a single space
//! 4. Whitespace split
//! 5. Tokens shorter than [`MIN_TOKEN_LEN`] are dropped
//! 6. Stop-words ([`STOP_WORDS`]) are dropped

use once_cell::sync::Lazy;
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Tokens shorter than this never carry signal.
pub const MIN_TOKEN_LEN: usize = 3;

/// English function words plus generic low-signal newsroom terms.
pub const STOP_WORDS: &[&str] = &[
    // function words
    "about", "after", "again", "against", "all", "also", "and", "any", "are", "around",
    "because", "been", "before", "being", "between", "both", "but", "can", "could", "did",
    "does", "doing", "down", "during", "each", "few", "for", "from", "further", "had", "has",
    "have", "having", "her", "here", "hers", "him", "his", "how", "into", "its", "just",
    "more", "most", "not", "now", "off", "once", "only", "other", "our", "ours", "out",
    "over", "own", "same", "she", "should", "some", "such", "than", "that", "the", "their",
    "them", "then", "there", "these", "they", "this", "those", "through", "too", "under",
    "until", "very", "was", "were", "what", "when", "where", "which", "while", "who", "whom",
    "why", "will", "with", "would", "you", "your", "yours", "amid", "says", "said", "per",
    "via", "new",
    // low-signal newsroom terms
    "today", "yesterday", "tomorrow", "photo", "photos", "video", "videos", "watch", "live",
    "update", "updates", "breaking", "news", "exclusive", "gallery", "opinion",
];

static STOP_WORD_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| STOP_WORDS.iter().copied().collect());

/// Returns `true` if `token` is in the stop-word list.
pub fn is_stop_word(token: &str) -> bool {
    STOP_WORD_SET.contains(token)
}

/// Strip diacritics and lowercase, keeping every other character as-is.
pub fn fold(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Normalize `text` into an ordered token sequence.
///
/// Order and repetition are preserved; callers that need a set collect into one.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(tokenize("Café prices SOAR, again!"), vec!["cafe", "prices", "soar"]);
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    let folded = fold(text);
    let mut spaced = String::with_capacity(folded.len());
    let mut pending_space = false;
    for c in folded.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            spaced.push(c);
            pending_space = false;
        } else if !pending_space {
            spaced.push(' ');
            pending_space = true;
        }
    }

    spaced
        .split_whitespace()
        .filter(|t| t.len() >= MIN_TOKEN_LEN)
        .filter(|t| !is_stop_word(t))
        .map(str::to_string)
        .collect()
}

/// Token stream re-joined with single spaces; the soft-dedup title key.
pub fn normalized_title(title: &str) -> String {
    tokenize(title).join(" ")
}
