//! Classifier seams: promotional-content detection and topic labeling.
//!
//! Both classifiers are external collaborators from the pipeline's point of
//! view. They are modeled as traits returning `Option`, where `None` means the
//! classifier had nothing to say (or failed). The pipeline treats that as
//! "not promotional" and "uncategorized" and never errors on it.
//!
//! Any closure `Fn(&RawRecord) -> Option<_>` implements the matching trait, so
//! callers can plug in a remote model or a test stub without a wrapper type.
//! [`KeywordPromoClassifier`] and [`KeywordTopicClassifier`] are the built-in
//! keyword heuristics used by the binary.

use crate::models::RawRecord;
use crate::text::normalize::{fold, tokenize};
use regex::Regex;
use std::collections::HashSet;
use tracing::warn;

/// Decides whether a record is an ad, sponsored post or deal roundup.
pub trait PromoClassifier {
    /// `Some(true)` excludes the record; `Some(false)` or `None` keeps it.
    fn is_promotional(&self, record: &RawRecord) -> Option<bool>;
}

/// Assigns a topic label to a record.
pub trait TopicClassifier {
    /// `None` leaves the record uncategorized.
    fn categorize(&self, record: &RawRecord) -> Option<String>;
}

impl<F> PromoClassifier for F
where
    F: Fn(&RawRecord) -> Option<bool>,
{
    fn is_promotional(&self, record: &RawRecord) -> Option<bool> {
        self(record)
    }
}

impl<F> TopicClassifier for F
where
    F: Fn(&RawRecord) -> Option<String>,
{
    fn categorize(&self, record: &RawRecord) -> Option<String> {
        self(record)
    }
}

/// Flags records whose title or summary contains a promotional marker phrase.
///
/// Markers match whole words only. A marker glued to a word by a hyphen
/// ("state-sponsored") is part of that word and does not match.
#[derive(Debug, Clone)]
pub struct KeywordPromoClassifier {
    markers: Vec<Regex>,
}

/// Anchor `marker` so it cannot start or end inside a word or hyphenated compound.
fn marker_pattern(marker: &str) -> String {
    let word_edge = |c: Option<char>| c.is_some_and(|c| c.is_alphanumeric());
    let lead = if word_edge(marker.chars().next()) { r"(?:^|[^\w-])" } else { "" };
    let trail = if word_edge(marker.chars().last()) { r"(?:[^\w-]|$)" } else { "" };
    format!("{lead}{}{trail}", regex::escape(marker))
}

impl KeywordPromoClassifier {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let markers = markers
            .into_iter()
            .filter_map(|m| {
                let folded = fold(m.as_ref().trim());
                match Regex::new(&marker_pattern(&folded)) {
                    Ok(re) => Some(re),
                    Err(e) => {
                        warn!(marker = %folded, error = %e, "Skipping unusable promotional marker");
                        None
                    }
                }
            })
            .collect();
        Self { markers }
    }
}

impl Default for KeywordPromoClassifier {
    fn default() -> Self {
        Self::new([
            "sponsored",
            "advertorial",
            "paid content",
            "partner content",
            "promo code",
            "discount code",
            "coupon",
            "% off",
            "best deals",
            "deal of the day",
            "shop now",
        ])
    }
}

impl PromoClassifier for KeywordPromoClassifier {
    fn is_promotional(&self, record: &RawRecord) -> Option<bool> {
        let text = fold(&format!(
            "{} {}",
            record.title,
            record.summary.as_deref().unwrap_or_default()
        ));
        Some(self.markers.iter().any(|m| m.is_match(&text)))
    }
}

/// Labels a record with the first category sharing a token with its title or summary.
#[derive(Debug, Clone)]
pub struct KeywordTopicClassifier {
    categories: Vec<(String, HashSet<String>)>,
}

impl KeywordTopicClassifier {
    /// Categories are tried in order; keywords are normalized the same way
    /// record text is.
    pub fn new(categories: Vec<(String, Vec<String>)>) -> Self {
        Self {
            categories: categories
                .into_iter()
                .map(|(label, words)| (label, words.iter().flat_map(|w| tokenize(w)).collect()))
                .collect(),
        }
    }
}

impl Default for KeywordTopicClassifier {
    fn default() -> Self {
        let table: &[(&str, &[&str])] = &[
            (
                "Politics & Governance",
                &["election", "council", "senate", "congress", "parliament", "minister", "president", "vote", "votes", "budget", "governor"],
            ),
            (
                "Conflict & Security",
                &["war", "military", "troops", "attack", "missile", "ceasefire", "police", "shooting"],
            ),
            (
                "Business & Economy",
                &["market", "markets", "stocks", "inflation", "economy", "tariff", "tariffs", "earnings", "bank", "prices"],
            ),
            (
                "Science & Technology",
                &["science", "research", "nasa", "space", "software", "tech", "chip", "chips", "startup"],
            ),
            (
                "Health",
                &["health", "hospital", "vaccine", "virus", "outbreak", "disease", "covid"],
            ),
            (
                "Environment & Disasters",
                &["fire", "wildfire", "flood", "floods", "storm", "hurricane", "earthquake", "climate"],
            ),
            (
                "Sports",
                &["match", "league", "championship", "tournament", "coach", "olympic", "olympics"],
            ),
        ];
        Self::new(
            table
                .iter()
                .map(|(label, words)| (label.to_string(), words.iter().map(|w| w.to_string()).collect()))
                .collect(),
        )
    }
}

impl TopicClassifier for KeywordTopicClassifier {
    fn categorize(&self, record: &RawRecord) -> Option<String> {
        let tokens: HashSet<String> = tokenize(&format!(
            "{} {}",
            record.title,
            record.summary.as_deref().unwrap_or_default()
        ))
        .into_iter()
        .collect();
        self.categories
            .iter()
            .find(|(_, words)| !words.is_disjoint(&tokens))
            .map(|(label, _)| label.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(title: &str, summary: Option<&str>) -> RawRecord {
        RawRecord {
            title: title.to_string(),
            link: "https://example.com/a".to_string(),
            source: "example".to_string(),
            published_at: None,
            summary: summary.map(str::to_string),
            image: None,
        }
    }

    #[test]
    fn test_promo_markers() {
        let classifier = KeywordPromoClassifier::default();
        assert_eq!(classifier.is_promotional(&raw("SPONSORED: the best mattress", None)), Some(true));
        assert_eq!(classifier.is_promotional(&raw("Laptops", Some("Get 40% off today"))), Some(true));
        assert_eq!(classifier.is_promotional(&raw("Fire breaks out downtown", None)), Some(false));
    }

    #[test]
    fn test_promo_markers_need_word_boundaries() {
        let classifier = KeywordPromoClassifier::default();
        assert_eq!(
            classifier.is_promotional(&raw("State-sponsored hackers breach ministry", None)),
            Some(false)
        );
        assert_eq!(
            classifier.is_promotional(&raw("UN-sponsored ceasefire talks resume", Some("Delegates arrive in Geneva"))),
            Some(false)
        );
        assert_eq!(classifier.is_promotional(&raw("Unsponsored riders finish the tour", None)), Some(false));
        assert_eq!(classifier.is_promotional(&raw("This post is sponsored by Acme", None)), Some(true));
        assert_eq!(classifier.is_promotional(&raw("(Sponsored) Travel picks", None)), Some(true));
    }

    #[test]
    fn test_promo_markers_ignore_diacritics() {
        let classifier = KeywordPromoClassifier::new(["promoție"]);
        assert_eq!(classifier.is_promotional(&raw("Promotie la televizoare", None)), Some(true));
    }

    #[test]
    fn test_topic_classifier() {
        let classifier = KeywordTopicClassifier::default();
        assert_eq!(
            classifier.categorize(&raw("City council votes on budget", None)).as_deref(),
            Some("Politics & Governance")
        );
        assert_eq!(
            classifier.categorize(&raw("Fire breaks out downtown", None)).as_deref(),
            Some("Environment & Disasters")
        );
        assert_eq!(classifier.categorize(&raw("Something else entirely", None)), None);
    }

    #[test]
    fn test_closures_implement_traits() {
        let never = |_: &RawRecord| -> Option<bool> { None };
        let label = |r: &RawRecord| -> Option<String> { Some(r.source.to_uppercase()) };
        assert_eq!(never.is_promotional(&raw("x", None)), None);
        assert_eq!(label.categorize(&raw("x", None)).as_deref(), Some("EXAMPLE"));
    }
}
