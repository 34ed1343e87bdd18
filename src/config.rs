//! Pipeline tuning knobs.
//!
//! Defaults live here; a YAML file can override any subset of them and CLI
//! flags override the file (see [`crate::cli::Cli::apply_overrides`]).
//!
//! ```yaml
//! cluster:
//!   min_overlap: 2
//!   jaccard_threshold: 0.2
//!   lookback_hours: 24
//! trending:
//!   min_sources: 3
//!   hot_cutoff_hours: 4
//!   cutoff_boundary: inclusive
//!   max_stories: 10
//! filter:
//!   exclude_promotional: true
//! store:
//!   retention_hours: 168
//! ```

use serde::{Deserialize, Serialize};
use std::error::Error;
use tracing::{info, instrument};

/// Story clustering thresholds and candidate window.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClusterParams {
    /// Minimum number of shared keywords for a match.
    pub min_overlap: usize,
    /// Minimum Jaccard similarity against the cluster's keyword union.
    pub jaccard_threshold: f64,
    /// Only records published this recently are clustered.
    pub lookback_hours: i64,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            min_overlap: 2,
            jaccard_threshold: 0.20,
            lookback_hours: 24,
        }
    }
}

/// How a story whose newest member sits exactly on the hot cutoff is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CutoffBoundary {
    /// Exactly `hot_cutoff_hours` old still counts as hot.
    #[default]
    Inclusive,
    /// Exactly `hot_cutoff_hours` old has cooled off.
    Exclusive,
}

/// Trending selection gates and output size.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TrendingParams {
    /// Minimum number of distinct outlets covering a story.
    pub min_sources: usize,
    /// A story whose newest member is older than this drops out.
    pub hot_cutoff_hours: i64,
    pub cutoff_boundary: CutoffBoundary,
    /// Maximum number of stories emitted.
    pub max_stories: usize,
}

impl Default for TrendingParams {
    fn default() -> Self {
        Self {
            min_sources: 3,
            hot_cutoff_hours: 4,
            cutoff_boundary: CutoffBoundary::Inclusive,
            max_stories: 10,
        }
    }
}

impl TrendingParams {
    pub fn hot_cutoff_ms(&self) -> i64 {
        self.hot_cutoff_hours.saturating_mul(3_600_000)
    }
}

/// Pre-clustering filters.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FilterParams {
    /// Drop records the promotional classifier flags.
    pub exclude_promotional: bool,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            exclude_promotional: true,
        }
    }
}

/// Record store housekeeping.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreParams {
    /// Records published longer ago than this are pruned before the store is saved.
    pub retention_hours: i64,
}

impl Default for StoreParams {
    fn default() -> Self {
        Self { retention_hours: 168 }
    }
}

/// Complete pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub cluster: ClusterParams,
    pub trending: TrendingParams,
    pub filter: FilterParams,
    pub store: StoreParams,
}

impl PipelineConfig {
    /// Oldest publish time worth keeping in the store at `now_ms`.
    ///
    /// Never cuts into the clustering window, whatever `retention_hours` says.
    pub fn retention_cutoff_ms(&self, now_ms: i64) -> i64 {
        let keep = self.store.retention_hours.saturating_mul(3_600_000).max(self.cluster.lookback_ms());
        now_ms.saturating_sub(keep)
    }
}

impl ClusterParams {
    pub fn lookback_ms(&self) -> i64 {
        self.lookback_hours.saturating_mul(3_600_000)
    }
}

/// Parse a YAML configuration document.
pub fn parse_config(yaml: &str) -> Result<PipelineConfig, Box<dyn Error>> {
    Ok(serde_yaml::from_str(yaml)?)
}

/// Load a YAML configuration file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid YAML for
/// [`PipelineConfig`]. Missing keys fall back to their defaults.
#[instrument(level = "info", skip_all, fields(%path))]
pub async fn load_config(path: &str) -> Result<PipelineConfig, Box<dyn Error>> {
    let yaml = tokio::fs::read_to_string(path).await?;
    let config = parse_config(&yaml)?;
    info!(?config, "Loaded pipeline configuration");
    Ok(config)
}
