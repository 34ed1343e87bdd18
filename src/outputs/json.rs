//! JSON output for the API and the record store.
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! ├── records.json          # canonical record store, keyed by link key
//! ├── trending.json         # latest trending page
//! └── 2025-05-06/
//!     ├── morning.json
//!     ├── afternoon.json
//!     └── evening.json
//! ```
//!
//! # Evening Edge Case
//!
//! An "evening" edition whose files are written after midnight (the run started
//! late in the evening and finished in the morning window) is filed under the
//! previous day, next to the rest of that day's editions.

use crate::models::{CanonicalRecord, TrendingPage};
use crate::store::RecordStore;
use crate::utils::edition_for;
use chrono::{Duration, Local, NaiveDate, NaiveTime};
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument, warn};

/// Store file name inside the JSON output directory.
pub const STORE_FILE: &str = "records.json";
/// Latest trending page file name inside the JSON output directory.
pub const LATEST_FILE: &str = "trending.json";

/// Directory date for an edition written at local time `now`.
fn edition_date(page: &TrendingPage, now: NaiveTime, today: NaiveDate) -> String {
    if page.time_of_day == "evening" && edition_for(now) == "morning" {
        (today - Duration::days(1)).to_string()
    } else {
        page.local_date.clone()
    }
}

/// Write a [`TrendingPage`] to its dated edition file and to `trending.json`.
///
/// # Output Path
///
/// `{json_output_dir}/{date}/{time_of_day}.json`, plus
/// `{json_output_dir}/trending.json` overwritten with the same content.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_trending_page(page: &TrendingPage, json_output_dir: &str) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(page)?;

    let date = edition_date(page, Local::now().time(), Local::now().date_naive());
    let full_json_dir = format!("{}/{}", json_output_dir, date);

    info!(%full_json_dir, "Ensuring JSON directory exists");
    if let Err(e) = fs::create_dir_all(&full_json_dir).await {
        error!(%full_json_dir, error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let edition_path = format!("{}/{}.json", full_json_dir, page.time_of_day);
    fs::write(&edition_path, &json).await?;
    info!(path = %edition_path, stories = page.stories.len(), "Wrote trending edition");

    let latest_path = format!("{}/{}", json_output_dir, LATEST_FILE);
    fs::write(&latest_path, &json).await?;
    info!(path = %latest_path, "Wrote latest trending page");

    Ok(())
}

/// Load the record store from `{json_output_dir}/records.json`.
///
/// A missing file yields an empty store; a corrupt one is an error so a bad
/// write is never silently replaced by an empty store.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn load_store(json_output_dir: &str) -> Result<RecordStore, Box<dyn Error>> {
    let path = format!("{}/{}", json_output_dir, STORE_FILE);
    if !Path::new(&path).exists() {
        warn!(%path, "No record store yet; starting empty");
        return Ok(RecordStore::default());
    }
    let raw = fs::read_to_string(&path).await?;
    let records: Vec<CanonicalRecord> = serde_json::from_str(&raw)?;
    let store = RecordStore::from_records(records);
    info!(%path, records = store.len(), "Loaded record store");
    Ok(store)
}

/// Write the record store to `{json_output_dir}/records.json`.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_store(store: &RecordStore, json_output_dir: &str) -> Result<(), Box<dyn Error>> {
    let path = format!("{}/{}", json_output_dir, STORE_FILE);
    let json = serde_json::to_string(&store.records())?;
    fs::write(&path, json).await?;
    info!(%path, records = store.len(), "Wrote record store");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn page(time_of_day: &str) -> TrendingPage {
        TrendingPage {
            local_date: "2025-05-06".to_string(),
            time_of_day: time_of_day.to_string(),
            local_time: "12:00:00".to_string(),
            generated_at_ms: 1_746_532_800_000,
            stories: vec![],
        }
    }

    fn temp_dir(name: &str) -> String {
        let dir = std::env::temp_dir().join(format!("atn_json_{}_{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir.to_string_lossy().to_string()
    }

    #[test]
    fn test_edition_date_evening_after_midnight_uses_yesterday() {
        let today = NaiveDate::from_ymd_opt(2025, 5, 7).unwrap();
        let after_midnight = NaiveTime::from_hms_opt(0, 5, 0).unwrap();
        assert_eq!(edition_date(&page("evening"), after_midnight, today), "2025-05-06");
    }

    #[test]
    fn test_edition_date_keeps_page_date_otherwise() {
        let today = NaiveDate::from_ymd_opt(2025, 5, 7).unwrap();
        let mut late_evening = page("evening");
        late_evening.local_date = "2025-05-07".to_string();
        let before_midnight = NaiveTime::from_hms_opt(23, 59, 59).unwrap();
        assert_eq!(edition_date(&late_evening, before_midnight, today), "2025-05-07");

        let mut early_morning = page("morning");
        early_morning.local_date = "2025-05-07".to_string();
        let after_midnight = NaiveTime::from_hms_opt(0, 5, 0).unwrap();
        assert_eq!(edition_date(&early_morning, after_midnight, today), "2025-05-07");
    }

    #[tokio::test]
    async fn test_write_trending_page_creates_files() {
        let dir = temp_dir("page");
        write_trending_page(&page("afternoon"), &dir).await.unwrap();
        let latest = std::fs::read_to_string(format!("{dir}/{LATEST_FILE}")).unwrap();
        let parsed: TrendingPage = serde_json::from_str(&latest).unwrap();
        assert_eq!(parsed.time_of_day, "afternoon");
        assert!(Path::new(&format!("{dir}/2025-05-06/afternoon.json")).exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_store_missing_file_is_empty_then_persists() {
        let dir = temp_dir("store");
        std::fs::create_dir_all(&dir).unwrap();
        let mut store = load_store(&dir).await.unwrap();
        assert!(store.is_empty());

        store.upsert(CanonicalRecord {
            title: "Fire breaks out downtown".to_string(),
            link: "https://a.example/fire".to_string(),
            source: "A".to_string(),
            summary: None,
            image: None,
            link_key: "a.example/a/fire".to_string(),
            keywords: BTreeSet::from(["fire".to_string()]),
            published_at_ms: 1,
            category: None,
        });
        write_store(&store, &dir).await.unwrap();

        let reloaded = load_store(&dir).await.unwrap();
        assert_eq!(reloaded.len(), 1);
        assert!(reloaded.records()[0].keywords.contains("fire"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_corrupt_store_is_an_error() {
        let dir = temp_dir("corrupt");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(format!("{dir}/{STORE_FILE}"), "{not json").unwrap();
        assert!(load_store(&dir).await.is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
