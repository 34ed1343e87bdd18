//! Cross-source story clustering.
//!
//! A single greedy, online pass over candidate records, newest first:
//!
//! 1. Score the record against every open cluster: shared keyword count and
//!    Jaccard similarity against the cluster's keyword union.
//! 2. A cluster is acceptable when both clear their thresholds
//!    ([`ClusterParams::min_overlap`], [`ClusterParams::jaccard_threshold`]).
//! 3. The record joins the acceptable cluster with the highest Jaccard score
//!    (the earliest-opened one on ties), or opens a new cluster.
//! 4. Joining unions the record's keywords into the cluster.
//!
//! Because the union only grows, clusters drift and may absorb later records
//! that share little with the first member. Processing order matters too:
//! newest-first decides which cluster a borderline record joins. Both are
//! properties of the algorithm, not accidents; tests pin them down.
//!
//! Cost is O(n·k) for n records and k clusters.

use crate::config::ClusterParams;
use crate::models::{CanonicalRecord, StoryCluster};
use crate::text::keywords::story_keywords;
use std::cmp::Reverse;
use std::collections::BTreeSet;
use tracing::{debug, info, instrument};

/// Jaccard similarity `|a ∩ b| / |a ∪ b|`; `0.0` when both sets are empty.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let inter = a.intersection(b).count();
    let union = a.len() + b.len() - inter;
    if union == 0 { 0.0 } else { inter as f64 / union as f64 }
}

/// Online greedy clusterer. Feed records newest first with [`push`](Self::push).
#[derive(Debug)]
pub struct StoryClusterer {
    params: ClusterParams,
    clusters: Vec<StoryCluster>,
}

impl StoryClusterer {
    pub fn new(params: ClusterParams) -> Self {
        Self {
            params,
            clusters: Vec::new(),
        }
    }

    /// Best acceptable cluster for `keywords` and its Jaccard score.
    fn best_match(&self, keywords: &BTreeSet<String>) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (i, cluster) in self.clusters.iter().enumerate() {
            let overlap = keywords.intersection(&cluster.keywords).count();
            if overlap < self.params.min_overlap {
                continue;
            }
            let score = jaccard(keywords, &cluster.keywords);
            if score < self.params.jaccard_threshold {
                continue;
            }
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((i, score));
            }
        }
        best
    }

    /// Attach `record` to its best-matching cluster or open a new one.
    ///
    /// Returns the index of the cluster the record ended up in.
    pub fn push(&mut self, record: CanonicalRecord, keywords: BTreeSet<String>) -> usize {
        match self.best_match(&keywords) {
            Some((i, score)) => {
                debug!(cluster = i, score, link_key = %record.link_key, "Attached record to story");
                let cluster = &mut self.clusters[i];
                cluster.keywords.extend(keywords);
                cluster.members.push(record);
                i
            }
            None => {
                self.clusters.push(StoryCluster {
                    keywords,
                    members: vec![record],
                });
                self.clusters.len() - 1
            }
        }
    }

    pub fn clusters(&self) -> &[StoryCluster] {
        &self.clusters
    }

    pub fn into_clusters(self) -> Vec<StoryCluster> {
        self.clusters
    }
}

/// Build the candidate pool and cluster it.
///
/// Candidates are records published no more than `lookback_hours` before
/// `now_ms` whose clustering keywords are non-empty. They are visited newest
/// first; records with equal timestamps keep their input order.
#[instrument(level = "info", skip_all, fields(count = records.len(), %now_ms))]
pub fn cluster_records(records: Vec<CanonicalRecord>, params: &ClusterParams, now_ms: i64) -> Vec<StoryCluster> {
    let window_start = now_ms.saturating_sub(params.lookback_ms());
    let total = records.len();

    let mut candidates: Vec<(CanonicalRecord, BTreeSet<String>)> = records
        .into_iter()
        .filter(|r| r.published_at_ms >= window_start)
        .filter_map(|r| {
            let keywords = story_keywords(&r.title, r.summary.as_deref());
            (!keywords.is_empty()).then_some((r, keywords))
        })
        .collect();
    candidates.sort_by_key(|(r, _)| Reverse(r.published_at_ms));

    let pool = candidates.len();
    let mut clusterer = StoryClusterer::new(params.clone());
    for (record, keywords) in candidates {
        clusterer.push(record, keywords);
    }
    let multi = clusterer.clusters().iter().filter(|c| c.members.len() > 1).count();
    info!(total, pool, clusters = clusterer.clusters().len(), multi_member = multi, "Clustering complete");
    clusterer.into_clusters()
}
