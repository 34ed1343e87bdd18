//! End-to-end pipeline: raw records in, canonical records and trending stories out.
//!
//! # Stages
//!
//! 1. **Filter**: records the promotional classifier flags are dropped
//! 2. **Canonicalize**: link key, search keywords, resolved date, topic label
//! 3. **Storage dedup**: one record per link key ([`dedup_by_link_key`])
//! 4. **Soft dedup**: one record per outlet and normalized title ([`soft_dedup`])
//! 5. **Cluster**: greedy cross-source story clustering ([`cluster_records`])
//! 6. **Select**: corroboration and recency gates, ranking ([`select_trending`])
//!
//! Stages 1–3 produce what the persistence layer upserts ([`Pipeline::prepare`]);
//! stages 4–6 run over the persisted pool ([`Pipeline::rank`]). Everything is
//! synchronous and side-effect free apart from logging; a bad record is
//! dropped from the stage it breaks, never the batch.

use crate::classify::{PromoClassifier, TopicClassifier};
use crate::cluster::cluster_records;
use crate::config::PipelineConfig;
use crate::dedup::{dedup_by_link_key, soft_dedup};
use crate::ingest::parse_published_at;
use crate::link_key::link_key;
use crate::models::{CanonicalRecord, RawRecord, TrendingStory};
use crate::text::keywords::search_keywords;
use crate::trending::select_trending;
use tracing::{debug, info, instrument, warn};

/// Pipeline wired to its configuration and classifiers.
#[derive(Debug)]
pub struct Pipeline<P, T> {
    config: PipelineConfig,
    promo: P,
    topic: T,
}

impl<P, T> Pipeline<P, T>
where
    P: PromoClassifier,
    T: TopicClassifier,
{
    pub fn new(config: PipelineConfig, promo: P, topic: T) -> Self {
        Self { config, promo, topic }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Turn one raw record into its canonical form.
    ///
    /// Returns `None` for records without a usable title or link.
    pub fn canonicalize(&self, raw: &RawRecord, now_ms: i64) -> Option<CanonicalRecord> {
        let title = raw.title.trim();
        let link = raw.link.trim();
        if title.is_empty() || link.is_empty() {
            warn!(source = %raw.source, link = %raw.link, "Dropping record without title or link");
            return None;
        }

        let parsed_ms = raw.published_at.as_deref().and_then(parse_published_at);
        if parsed_ms.is_none() {
            debug!(link, published_at = ?raw.published_at, "No usable publish date; using ingestion time");
        }

        Some(CanonicalRecord {
            title: title.to_string(),
            link: link.to_string(),
            source: raw.source.trim().to_string(),
            summary: raw.summary.clone(),
            image: raw.image.clone(),
            link_key: link_key(link, parsed_ms),
            keywords: search_keywords(title, raw.summary.as_deref()),
            published_at_ms: parsed_ms.unwrap_or(now_ms),
            category: self.topic.categorize(raw),
        })
    }

    /// Filter, canonicalize and storage-dedup a batch of raw records.
    #[instrument(level = "info", skip_all, fields(count = raw.len(), %now_ms))]
    pub fn prepare(&self, raw: &[RawRecord], now_ms: i64) -> Vec<CanonicalRecord> {
        let mut promotional = 0usize;
        let mut malformed = 0usize;
        let mut canonical = Vec::with_capacity(raw.len());

        for record in raw {
            if self.config.filter.exclude_promotional && self.promo.is_promotional(record) == Some(true) {
                promotional += 1;
                debug!(title = %record.title, source = %record.source, "Excluding promotional record");
                continue;
            }
            match self.canonicalize(record, now_ms) {
                Some(c) => canonical.push(c),
                None => malformed += 1,
            }
        }

        let records = dedup_by_link_key(canonical);
        info!(
            input = raw.len(),
            promotional,
            malformed,
            unique = records.len(),
            "Prepared canonical records"
        );
        records
    }

    /// Soft-dedup, cluster and select trending stories from a record pool.
    #[instrument(level = "info", skip_all, fields(count = records.len(), %now_ms))]
    pub fn rank(&self, records: Vec<CanonicalRecord>, now_ms: i64) -> Vec<TrendingStory> {
        let pool = soft_dedup(records);
        let clusters = cluster_records(pool, &self.config.cluster, now_ms);
        select_trending(clusters, &self.config.trending, now_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{KeywordPromoClassifier, KeywordTopicClassifier};

    const T: i64 = 1_746_532_800_000;

    fn raw(source: &str, title: &str, link: &str, published_ms: i64) -> RawRecord {
        RawRecord {
            title: title.to_string(),
            link: link.to_string(),
            source: source.to_string(),
            published_at: Some(published_ms.to_string()),
            summary: None,
            image: None,
        }
    }

    fn scenario() -> Vec<RawRecord> {
        vec![
            raw("A", "Fire breaks out downtown", "https://a.example/city/fire-breaks-out-downtown", T),
            raw("B", "Downtown fire reported", "https://b.example/news/downtown-fire-reported", T - 60_000),
            raw("C", "City council votes on budget", "https://c.example/politics/council-budget-vote", T),
        ]
    }

    struct Output {
        records: Vec<CanonicalRecord>,
        trending: Vec<TrendingStory>,
    }

    fn run_batch<P: PromoClassifier, Q: TopicClassifier>(p: &Pipeline<P, Q>, raw: &[RawRecord]) -> Output {
        let records = p.prepare(raw, T);
        let trending = p.rank(records.clone(), T);
        Output { records, trending }
    }

    fn pipeline(min_sources: usize) -> Pipeline<KeywordPromoClassifier, KeywordTopicClassifier> {
        let mut config = PipelineConfig::default();
        config.trending.min_sources = min_sources;
        Pipeline::new(config, KeywordPromoClassifier::default(), KeywordTopicClassifier::default())
    }

    #[test]
    fn test_scenario_clusters_fire_stories_only() {
        let p = pipeline(3);
        let records = p.prepare(&scenario(), T);
        assert_eq!(records.len(), 3);
        let clusters = cluster_records(records, &p.config().cluster, T);
        assert_eq!(clusters.len(), 2);
        let fire = clusters.iter().find(|c| c.members.len() == 2).unwrap();
        assert_eq!(fire.distinct_source_count(), 2);
        assert!(fire.keywords.contains("fire"));
        assert!(fire.members.iter().all(|m| m.source != "C"));
    }

    #[test]
    fn test_scenario_min_sources_three_is_empty() {
        let output = run_batch(&pipeline(3), &scenario());
        assert_eq!(output.records.len(), 3);
        assert!(output.trending.is_empty());
    }

    #[test]
    fn test_scenario_min_sources_two_picks_newer_fire_record() {
        let output = run_batch(&pipeline(2), &scenario());
        assert_eq!(output.trending.len(), 1);
        let story = &output.trending[0];
        assert_eq!(story.representative.source, "A");
        assert_eq!(story.distinct_source_count, 2);
        assert_eq!(story.newest_ms, T);
        assert_eq!(story.supporting.len(), 1);
        assert_eq!(story.supporting[0].source, "B");
        assert_eq!(story.category.as_deref(), Some("Environment & Disasters"));
    }

    #[test]
    fn test_refetch_variants_collapse() {
        let mut batch = scenario();
        batch.push(raw(
            "A",
            "Fire breaks out downtown",
            "https://www.a.example/city/fire-breaks-out-downtown/amp?utm_source=rss",
            T + 5_000,
        ));
        let records = pipeline(3).prepare(&batch, T + 5_000);
        assert_eq!(records.len(), 3);
        let a = records.iter().find(|r| r.source == "A").unwrap();
        assert_eq!(a.published_at_ms, T + 5_000);
    }

    #[test]
    fn test_promotional_records_excluded() {
        let mut batch = scenario();
        batch.push(raw("D", "Sponsored: fire extinguishers downtown 30% off", "https://d.example/deal", T));
        let records = pipeline(3).prepare(&batch, T);
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.source != "D"));
    }

    #[test]
    fn test_hyphenated_marker_words_are_news() {
        let batch = vec![
            raw("A", "State-sponsored hackers breach ministry network", "https://a.example/cyber/ministry-breach", T),
            raw("B", "Ministry network breach blamed on state-sponsored hackers", "https://b.example/tech/hackers-ministry", T - 60_000),
            raw("C", "State-sponsored hackers hit ministry network", "https://c.example/world/ministry-hack", T - 120_000),
        ];
        let output = run_batch(&pipeline(3), &batch);
        assert_eq!(output.records.len(), 3);
        assert_eq!(output.trending.len(), 1);
        assert_eq!(output.trending[0].distinct_source_count, 3);
    }

    #[test]
    fn test_missing_classification_is_not_excluded() {
        let unsure = |_: &RawRecord| -> Option<bool> { None };
        let uncategorized = |_: &RawRecord| -> Option<String> { None };
        let p = Pipeline::new(PipelineConfig::default(), unsure, uncategorized);
        let records = p.prepare(&scenario(), T);
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.category.is_none()));
    }

    #[test]
    fn test_bad_dates_and_titles_do_not_abort() {
        let mut batch = scenario();
        batch[1].published_at = Some("yesterday-ish".to_string());
        batch.push(raw("E", "   ", "https://e.example/x", T));
        let records = pipeline(3).prepare(&batch, T + 1);
        assert_eq!(records.len(), 3);
        let b = records.iter().find(|r| r.source == "B").unwrap();
        assert_eq!(b.published_at_ms, T + 1);
        assert_eq!(b.link_key, "b.example/a/downtown-fire-reported");
    }

    #[test]
    fn test_empty_batch() {
        let output = run_batch(&pipeline(2), &[]);
        assert!(output.records.is_empty());
        assert!(output.trending.is_empty());
    }
}
