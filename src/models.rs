//! Data models flowing through the trending pipeline.
//!
//! This module defines the core data structures used throughout the application:
//! - [`RawRecord`]: A record as delivered by a feed or scraper
//! - [`CanonicalRecord`]: A raw record with its link key, keywords and resolved date
//! - [`StoryCluster`]: A transient group of records believed to cover one story
//! - [`TrendingStory`] / [`SupportingRecord`]: Ranked output for presentation
//! - [`TrendingPage`]: One edition of trending output, serialized to JSON and Markdown
//!
//! Output models serialize with camelCase field names so the presentation layer
//! can consume them unchanged.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// A news record as received from a feed or scrape.
///
/// Ephemeral and never mutated after creation. Loosely-typed feed output is
/// turned into this shape by [`crate::ingest::raw_record_from_value`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    /// Headline as published.
    pub title: String,
    /// Article URL.
    pub link: String,
    /// Outlet identifier (e.g. `"cnn"`).
    pub source: String,
    /// Publish timestamp in whatever format the feed used; may be absent or invalid.
    #[serde(default)]
    pub published_at: Option<String>,
    /// Optional free-text snippet.
    #[serde(default)]
    pub summary: Option<String>,
    /// Optional lead image URL.
    #[serde(default)]
    pub image: Option<String>,
}

/// A raw record with its storage identity, keywords and concrete publish time.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalRecord {
    pub title: String,
    pub link: String,
    pub source: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    /// Storage identity derived from `link` (see [`crate::link_key`]).
    pub link_key: String,
    /// Suffix-stemmed search keywords from title and summary.
    #[serde(default)]
    pub keywords: BTreeSet<String>,
    /// Publish time in epoch milliseconds; ingestion time when unparsable.
    pub published_at_ms: i64,
    /// Topic label from the topic classifier; `None` means uncategorized.
    #[serde(default)]
    pub category: Option<String>,
}

impl CanonicalRecord {
    /// Whether this record carries a usable lead image.
    pub fn has_image(&self) -> bool {
        self.image.as_deref().is_some_and(|s| !s.trim().is_empty())
    }
}

/// A group of records from (ideally) several outlets describing one story.
///
/// Rebuilt on every clustering pass and never persisted.
#[derive(Debug, Clone, Default)]
pub struct StoryCluster {
    /// Union of every member's clustering keywords; only ever grows.
    pub keywords: BTreeSet<String>,
    /// Members in insertion order, which is newest first.
    pub members: Vec<CanonicalRecord>,
}

impl StoryCluster {
    /// Number of distinct outlets among the members.
    pub fn distinct_source_count(&self) -> usize {
        self.members
            .iter()
            .map(|m| m.source.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Publish time of the newest member, or `None` for an empty cluster.
    pub fn newest_ms(&self) -> Option<i64> {
        self.members.iter().map(|m| m.published_at_ms).max()
    }

    /// Index of the member that should front this story.
    ///
    /// The first member (insertion order) with an image wins; otherwise the
    /// newest member, earliest in insertion order on ties.
    pub fn representative_index(&self) -> Option<usize> {
        if let Some(i) = self.members.iter().position(CanonicalRecord::has_image) {
            return Some(i);
        }
        let newest = self.newest_ms()?;
        self.members.iter().position(|m| m.published_at_ms == newest)
    }
}

/// A non-representative member of a trending story.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportingRecord {
    pub source: String,
    pub title: String,
    pub link: String,
    pub published_at_ms: i64,
}

impl From<&CanonicalRecord> for SupportingRecord {
    fn from(record: &CanonicalRecord) -> Self {
        Self {
            source: record.source.clone(),
            title: record.title.clone(),
            link: record.link.clone(),
            published_at_ms: record.published_at_ms,
        }
    }
}

/// A corroborated, recent story cluster ready for display.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingStory {
    pub representative: CanonicalRecord,
    pub supporting: Vec<SupportingRecord>,
    pub distinct_source_count: usize,
    pub newest_ms: i64,
    /// Category of the representative, if the topic classifier produced one.
    #[serde(default)]
    pub category: Option<String>,
    /// Keyword union of the underlying cluster.
    #[serde(default)]
    pub keywords: BTreeSet<String>,
}

/// One edition of trending output.
///
/// # Edition Naming
///
/// The `time_of_day` field categorizes editions as:
/// - `"morning"`: 00:00 - 08:00
/// - `"afternoon"`: 08:00 - 16:00
/// - `"evening"`: 16:00 - 24:00
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingPage {
    /// The date of publication in `YYYY-MM-DD` format.
    pub local_date: String,
    /// The time of day category: "morning", "afternoon", or "evening".
    pub time_of_day: String,
    /// The exact local time of publication.
    pub local_time: String,
    /// Reference time the pipeline ran against, epoch milliseconds.
    pub generated_at_ms: i64,
    /// Ranked stories, best first.
    pub stories: Vec<TrendingStory>,
}
