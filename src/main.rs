//! # Awful Trending News
//!
//! A news canonicalization and trending pipeline. It takes batches of raw
//! articles handed over by feed collectors, reduces each to a canonical record
//! with a stable link key, groups articles from different outlets into stories,
//! and publishes the stories that several outlets are covering right now.
//!
//! ## Features
//!
//! - Link keys that survive tracking parameters, AMP variants, host aliases
//!   and protocol differences
//! - Accent-insensitive keyword extraction with light suffix stemming
//! - Storage dedup by link key and soft dedup by outlet and title
//! - Greedy story clustering by keyword overlap and Jaccard similarity
//! - Trending selection gated on outlet corroboration and recency
//! - Outputs JSON API files, a persisted record store and a Markdown digest
//!
//! ## Usage
//!
//! ```sh
//! awful_trending_news -i ./batch.json -j ./json -m ./markdown
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Ingest**: Read loosely-shaped feed records into raw records
//! 2. **Prepare**: Filter promotional items, canonicalize, dedup by link key
//! 3. **Store**: Upsert the batch into the persisted record store
//! 4. **Rank**: Soft dedup, cluster and select trending stories from the store
//! 5. **Output**: Write JSON API files and Markdown reports

use chrono::Local;
use clap::Parser;
use serde_json::Value;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod classify;
mod cli;
mod cluster;
mod config;
mod dedup;
mod ingest;
mod link_key;
mod models;
mod outputs;
mod pipeline;
mod search;
mod store;
mod text;
mod trending;
mod utils;

use classify::{KeywordPromoClassifier, KeywordTopicClassifier};
use cli::Cli;
use config::{load_config, PipelineConfig};
use ingest::{ingest_values, parse_published_at};
use models::TrendingPage;
use outputs::{json, markdown};
use pipeline::Pipeline;
use search::search_records;
use utils::{ensure_writable_dir, format_timestamp, time_of_day, truncate_for_log};

/// Number of matches logged for `--query`.
const SEARCH_LIMIT: usize = 10;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("trending_update starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args.input, ?args.json_output_dir, ?args.markdown_output_dir, "Parsed CLI arguments");

    // Early check: ensure both output dirs are writable
    for dir in [&args.json_output_dir, &args.markdown_output_dir] {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(
                path = %dir,
                error = %e,
                "Output directory is not writable (fix perms or choose a different path)"
            );
            return Err(e);
        }
    }

    // ---- Config ----
    let mut config = match args.config.as_deref() {
        Some(path) => load_config(path).await?,
        None => {
            debug!("No config file given; using defaults");
            PipelineConfig::default()
        }
    };
    args.apply_overrides(&mut config);
    info!(
        min_sources = config.trending.min_sources,
        hot_cutoff_hours = config.trending.hot_cutoff_hours,
        cutoff_boundary = ?config.trending.cutoff_boundary,
        max_stories = config.trending.max_stories,
        lookback_hours = config.cluster.lookback_hours,
        min_overlap = config.cluster.min_overlap,
        jaccard_threshold = config.cluster.jaccard_threshold,
        retention_hours = config.store.retention_hours,
        "Pipeline configured"
    );

    let now_ms = match args.now.as_deref() {
        Some(raw) => match parse_published_at(raw) {
            Some(ms) => ms,
            None => {
                error!(now = %raw, "Could not parse --now");
                return Err(format!("unparsable --now value: {raw}").into());
            }
        },
        None => utils::now_ms(),
    };
    info!(now = %format_timestamp(now_ms), "Reference time");

    // ---- Ingest ----
    let input = tokio::fs::read_to_string(&args.input).await.map_err(|e| {
        error!(path = %args.input, error = %e, "Failed to read input batch");
        e
    })?;
    let values: Vec<Value> = serde_json::from_str(&input).map_err(|e| {
        error!(
            path = %args.input,
            error = %e,
            preview = %truncate_for_log(&input, 300),
            "Input batch is not a JSON array"
        );
        e
    })?;
    let raw_records = ingest_values(&values);

    // ---- Prepare & store ----
    let retention_cutoff_ms = config.retention_cutoff_ms(now_ms);
    let pipeline = Pipeline::new(config, KeywordPromoClassifier::default(), KeywordTopicClassifier::default());
    let prepared = pipeline.prepare(&raw_records, now_ms);

    let mut store = json::load_store(&args.json_output_dir).await?;
    let (inserted, updated) = store.upsert_batch(prepared);
    store.prune_older_than(retention_cutoff_ms);
    if store.is_empty() {
        warn!("Record store is empty; nothing to rank");
    }
    if let Err(e) = json::write_store(&store, &args.json_output_dir).await {
        error!(error = %e, "Failed to write record store");
        return Err(e);
    }

    // ---- Rank ----
    let records = store.records();
    let stories = pipeline.rank(records.clone(), now_ms);
    info!(
        inserted,
        updated,
        pool = records.len(),
        stories = stories.len(),
        min_sources = pipeline.config().trending.min_sources,
        "Ranked trending stories"
    );

    let page = TrendingPage {
        local_date: Local::now().date_naive().to_string(),
        time_of_day: time_of_day(),
        local_time: Local::now().time().to_string(),
        generated_at_ms: now_ms,
        stories,
    };
    info!(time_of_day = %page.time_of_day, local_date = %page.local_date, local_time = %page.local_time, "TrendingPage built");

    // ---- JSON output ----
    if let Err(e) = json::write_trending_page(&page, &args.json_output_dir).await {
        error!(error = %e, "Failed to write trending JSON");
    }

    // ---- Markdown output ----
    let md = markdown::trending_page_to_markdown(&page);
    let output_markdown_filename = format!(
        "{}/{}_{}.md",
        args.markdown_output_dir, page.local_date, page.time_of_day
    );
    info!(path = %output_markdown_filename, "Writing Markdown");
    if let Err(e) = tokio::fs::write(&output_markdown_filename, md).await {
        error!(path = %output_markdown_filename, error = %e, "Failed writing Markdown");
    } else {
        info!(path = %output_markdown_filename, "Wrote TrendingPage Markdown");
    }

    // ---- Search ----
    if let Some(query) = args.query.as_deref() {
        let hits = search_records(&records, query, SEARCH_LIMIT);
        info!(query, hits = hits.len(), "Search results");
        for (rank, hit) in hits.iter().enumerate() {
            info!(
                rank = rank + 1,
                source = %hit.source,
                published = %format_timestamp(hit.published_at_ms),
                link = %hit.link,
                title = %truncate_for_log(&hit.title, 120),
                "Match"
            );
        }
    }

    let elapsed = start_time.elapsed();
    info!(elapsed_secs = elapsed.as_secs_f64(), "trending_update finished");

    Ok(())
}
