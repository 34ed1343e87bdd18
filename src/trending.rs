//! Trending story selection and ranking.
//!
//! A cluster becomes a [`TrendingStory`] when it is:
//!
//! - **corroborated**: at least [`TrendingParams::min_sources`] distinct outlets
//! - **hot**: its newest member is no older than [`TrendingParams::hot_cutoff_hours`]
//!   (the exact boundary follows [`CutoffBoundary`])
//!
//! Survivors are ranked by distinct-source count, then by recency, and the
//! top [`TrendingParams::max_stories`] are emitted.

use crate::config::{CutoffBoundary, TrendingParams};
use crate::models::{StoryCluster, SupportingRecord, TrendingStory};
use itertools::Itertools;
use std::cmp::Reverse;
use tracing::{debug, info, instrument};

fn is_hot(newest_ms: i64, now_ms: i64, params: &TrendingParams) -> bool {
    let age = now_ms.saturating_sub(newest_ms);
    match params.cutoff_boundary {
        CutoffBoundary::Inclusive => age <= params.hot_cutoff_ms(),
        CutoffBoundary::Exclusive => age < params.hot_cutoff_ms(),
    }
}

fn to_story(mut cluster: StoryCluster, distinct_source_count: usize, newest_ms: i64) -> Option<TrendingStory> {
    let rep = cluster.representative_index()?;
    let representative = cluster.members.remove(rep);
    let supporting = cluster.members.iter().map(SupportingRecord::from).collect();
    Some(TrendingStory {
        category: representative.category.clone(),
        representative,
        supporting,
        distinct_source_count,
        newest_ms,
        keywords: cluster.keywords,
    })
}

/// Filter, rank and truncate clusters into trending stories.
#[instrument(level = "info", skip_all, fields(clusters = clusters.len(), %now_ms))]
pub fn select_trending(clusters: Vec<StoryCluster>, params: &TrendingParams, now_ms: i64) -> Vec<TrendingStory> {
    let mut too_narrow = 0usize;
    let mut too_old = 0usize;

    let stories: Vec<TrendingStory> = clusters
        .into_iter()
        .filter_map(|cluster| {
            let distinct = cluster.distinct_source_count();
            if distinct < params.min_sources {
                too_narrow += 1;
                return None;
            }
            let newest = cluster.newest_ms()?;
            if !is_hot(newest, now_ms, params) {
                too_old += 1;
                debug!(newest, distinct, "Dropping cooled-off story");
                return None;
            }
            to_story(cluster, distinct, newest)
        })
        .sorted_by_key(|s| (Reverse(s.distinct_source_count), Reverse(s.newest_ms)))
        .take(params.max_stories)
        .collect();

    info!(selected = stories.len(), too_narrow, too_old, "Trending selection complete");
    stories
}
