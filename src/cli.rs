//! Command-line interface definitions for Awful Trending News.
//!
//! All arguments can be provided via command-line flags, and most via
//! environment variables. Tuning flags override values from the optional
//! YAML config file.

use crate::config::{CutoffBoundary, PipelineConfig};
use clap::Parser;

/// Command-line arguments for the Awful Trending News application.
///
/// # Examples
///
/// ```sh
/// # Ingest a batch and publish trending output
/// awful_trending_news -i ./batch.json -j ./json -m ./markdown
///
/// # Corroboration by two outlets is enough, keep five stories
/// awful_trending_news -i ./batch.json -j ./json -m ./markdown --min-sources 2 --max-stories 5
///
/// # Search the stored records instead of just ranking
/// awful_trending_news -i ./batch.json -j ./json -m ./markdown --query "council budget"
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// JSON file holding an array of raw records from the feed collaborator
    #[arg(short, long)]
    pub input: String,

    /// Output directory for the JSON API files and the record store
    #[arg(short, long)]
    pub json_output_dir: String,

    /// Output directory for the Markdown file
    #[arg(short, long)]
    pub markdown_output_dir: String,

    /// Optional path to a YAML pipeline config
    #[arg(short, long, env = "TRENDING_CONFIG")]
    pub config: Option<String>,

    /// Reference time (RFC 3339) instead of the wall clock, for replaying old batches
    #[arg(long)]
    pub now: Option<String>,

    /// Minimum distinct outlets for a trending story
    #[arg(long)]
    pub min_sources: Option<usize>,

    /// Hours after its newest article before a story cools off
    #[arg(long)]
    pub hot_cutoff_hours: Option<i64>,

    /// Treat a story exactly at the hot cutoff as cooled off
    #[arg(long)]
    pub exclusive_cutoff: bool,

    /// Maximum number of trending stories
    #[arg(long)]
    pub max_stories: Option<usize>,

    /// Hours of records considered for clustering
    #[arg(long)]
    pub lookback_hours: Option<i64>,

    /// Hours of history kept in the record store
    #[arg(long)]
    pub retention_hours: Option<i64>,

    /// Keep records the promotional classifier flags
    #[arg(long)]
    pub keep_promotional: bool,

    /// Search the stored records for these keywords and log the best matches
    #[arg(short, long)]
    pub query: Option<String>,
}

impl Cli {
    /// Apply tuning flags on top of `config`.
    pub fn apply_overrides(&self, config: &mut PipelineConfig) {
        if let Some(n) = self.min_sources {
            config.trending.min_sources = n;
        }
        if let Some(h) = self.hot_cutoff_hours {
            config.trending.hot_cutoff_hours = h;
        }
        if self.exclusive_cutoff {
            config.trending.cutoff_boundary = CutoffBoundary::Exclusive;
        }
        if let Some(n) = self.max_stories {
            config.trending.max_stories = n;
        }
        if let Some(h) = self.lookback_hours {
            config.cluster.lookback_hours = h;
        }
        if let Some(h) = self.retention_hours {
            config.store.retention_hours = h;
        }
        if self.keep_promotional {
            config.filter.exclude_promotional = false;
        }
    }
}
