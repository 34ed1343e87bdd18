//! Keyword extraction and the two stemming rules built on it.
//!
//! Two crude stemmers exist side by side and must not be merged:
//!
//! | Rule | Used for | Behavior |
//! |------|----------|----------|
//! | [`Stemmer::Suffix`] | search-index keywords on [`CanonicalRecord`](crate::models::CanonicalRecord) and queries | strips the first matching suffix from [`SUFFIXES`] |
//! | [`Stemmer::Length`] | story clustering | trims by token length |
//!
//! Index-time and query-time stemming must use the same rule, so the suffix
//! list and its ordering are part of the stored data format. Changing either
//! invalidates previously stored keyword sets.

use crate::text::normalize::tokenize;
use std::collections::BTreeSet;

/// Suffixes tried in order, longest first. The first one whose removal leaves
/// at least [`MIN_STEM_LEN`] characters wins.
pub const SUFFIXES: &[&str] = &["ing", "ies", "ers", "est", "ed", "es", "er", "ly", "s"];

/// Shortest stem the suffix rule may produce.
pub const MIN_STEM_LEN: usize = 3;

/// Which stemming rule to apply to each normalized token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stemmer {
    /// Suffix stripping for search keywords.
    Suffix,
    /// Length trimming for clustering keywords.
    Length,
}

impl Stemmer {
    /// Stem a single normalized token.
    pub fn stem(self, token: &str) -> String {
        match self {
            Stemmer::Suffix => stem_suffix(token),
            Stemmer::Length => stem_length(token),
        }
    }
}

fn stem_suffix(token: &str) -> String {
    for suffix in SUFFIXES {
        if let Some(stripped) = token.strip_suffix(suffix) {
            if stripped.len() >= MIN_STEM_LEN {
                return stripped.to_string();
            }
        }
    }
    token.to_string()
}

fn stem_length(token: &str) -> String {
    let len = token.chars().count();
    let keep = match len {
        0..=4 => len,
        5..=6 => len - 1,
        _ => len - 2,
    };
    token.chars().take(keep).collect()
}

/// Extract the keyword set for a title and optional summary.
///
/// The title is fed through twice ahead of the summary. The result is a set,
/// so the weighting has no effect on membership.
pub fn extract_keywords(title: &str, summary: Option<&str>, stemmer: Stemmer) -> BTreeSet<String> {
    let text = format!("{title} {title} {}", summary.unwrap_or_default());
    tokenize(&text)
        .into_iter()
        .map(|token| stemmer.stem(&token))
        .filter(|stem| !stem.is_empty())
        .collect()
}

/// Keywords stored on canonical records for search and autocomplete.
pub fn search_keywords(title: &str, summary: Option<&str>) -> BTreeSet<String> {
    extract_keywords(title, summary, Stemmer::Suffix)
}

/// Keywords compared by the story clusterer.
pub fn story_keywords(title: &str, summary: Option<&str>) -> BTreeSet<String> {
    extract_keywords(title, summary, Stemmer::Length)
}

/// Stem a free-text search query the same way records were indexed.
pub fn query_keywords(query: &str) -> BTreeSet<String> {
    tokenize(query)
        .into_iter()
        .map(|token| Stemmer::Suffix.stem(&token))
        .collect()
}
