//! Ingestion boundary: loosely-typed feed output to strict [`RawRecord`]s.
//!
//! Feed parsers and scrapers hand over JSON objects whose field names vary by
//! library (`pubDate` vs `isoDate`, `link` vs `url`, ...). This module is the
//! only place that looks at those shapes; everything downstream sees
//! [`RawRecord`] and concrete epoch-millisecond timestamps.
//!
//! # Accepted aliases
//!
//! | Field | Keys tried, in order |
//! |-------|----------------------|
//! | title | `title` |
//! | link | `link`, `url`, `guid` |
//! | source | `source`, `feed`, `outlet` (string, or object with `name`/`title`) |
//! | date | `publishedAt`, `published_at`, `isoDate`, `pubDate`, `published`, `date` |
//! | summary | `summary`, `contentSnippet`, `description` |
//! | image | `image`, `imageUrl`, `thumbnail`, `enclosure` (string, or object with `url`) |

use crate::models::RawRecord;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt;
use tracing::{info, instrument, warn};

const LINK_KEYS: &[&str] = &["link", "url", "guid"];
const SOURCE_KEYS: &[&str] = &["source", "feed", "outlet"];
const DATE_KEYS: &[&str] = &["publishedAt", "published_at", "isoDate", "pubDate", "published", "date"];
const SUMMARY_KEYS: &[&str] = &["summary", "contentSnippet", "description"];
const IMAGE_KEYS: &[&str] = &["image", "imageUrl", "thumbnail", "enclosure"];

/// Epoch values below this are seconds, at or above are milliseconds.
const EPOCH_MS_THRESHOLD: i64 = 100_000_000_000;

/// Earliest epoch timestamp accepted (2000-01-01T00:00:00Z). Smaller integers
/// are not timestamps a news feed would carry.
const MIN_EPOCH_MS: i64 = 946_684_800_000;

/// Why an upstream value could not become a [`RawRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    /// The value is not a JSON object.
    NotAnObject,
    /// A required field is absent or blank.
    MissingField(&'static str),
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestError::NotAnObject => write!(f, "record is not a JSON object"),
            IngestError::MissingField(name) => write!(f, "record has no usable `{name}`"),
        }
    }
}

impl Error for IngestError {}

/// Convert one upstream JSON value into a [`RawRecord`].
///
/// # Errors
///
/// Returns [`IngestError`] when the value is not an object or lacks a
/// non-blank title, link or source. Bad dates are never an error; they are
/// carried through as-is and resolved later.
pub fn raw_record_from_value(value: &Value) -> Result<RawRecord, IngestError> {
    let obj = value.as_object().ok_or(IngestError::NotAnObject)?;

    let title = string_field(obj, &["title"]).ok_or(IngestError::MissingField("title"))?;
    let link = string_field(obj, LINK_KEYS).ok_or(IngestError::MissingField("link"))?;
    let source = named_field(obj, SOURCE_KEYS).ok_or(IngestError::MissingField("source"))?;

    Ok(RawRecord {
        title,
        link,
        source,
        published_at: date_field(obj),
        summary: string_field(obj, SUMMARY_KEYS),
        image: url_field(obj, IMAGE_KEYS),
    })
}

/// Convert a batch of upstream values, dropping (and logging) the malformed ones.
#[instrument(level = "info", skip_all, fields(count = values.len()))]
pub fn ingest_values(values: &[Value]) -> Vec<RawRecord> {
    let mut records = Vec::with_capacity(values.len());
    let mut rejected = 0usize;
    for (index, value) in values.iter().enumerate() {
        match raw_record_from_value(value) {
            Ok(record) => records.push(record),
            Err(e) => {
                rejected += 1;
                warn!(index, error = %e, "Skipping malformed input record");
            }
        }
    }
    info!(accepted = records.len(), rejected, "Ingested raw records");
    records
}

/// Parse a publish timestamp in any of the formats feeds commonly use.
///
/// Returns `None` when nothing matches. Callers fall back to the ingestion
/// time, which makes an undated record look freshly published.
pub fn parse_published_at(raw: &str) -> Option<i64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.timestamp_millis());
    }
    // ISO 8601 with a colon-less offset (`+0000`), which RFC 3339 rejects
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%d %H:%M:%S%z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.timestamp_millis());
        }
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc().timestamp_millis());
        }
    }
    if let Some(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().or_else(|| compact_date(s)) {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp_millis());
    }
    if let Ok(n) = s.parse::<i64>() {
        let ms = if n < EPOCH_MS_THRESHOLD { n.saturating_mul(1000) } else { n };
        return (ms >= MIN_EPOCH_MS).then_some(ms);
    }
    None
}

/// `YYYYMMDD`, as some feeds emit in `dc:date`.
fn compact_date(s: &str) -> Option<NaiveDate> {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::from_ymd_opt(s[..4].parse().ok()?, s[4..6].parse().ok()?, s[6..].parse().ok()?)
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn string_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find_map(|v| v.as_str().and_then(non_blank))
}

fn named_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().filter_map(|k| obj.get(*k)).find_map(|v| match v {
        Value::String(s) => non_blank(s),
        Value::Object(inner) => string_field(inner, &["name", "title", "id"]),
        _ => None,
    })
}

fn url_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().filter_map(|k| obj.get(*k)).find_map(|v| match v {
        Value::String(s) => non_blank(s),
        Value::Object(inner) => string_field(inner, &["url", "href"]),
        _ => None,
    })
}

fn date_field(obj: &Map<String, Value>) -> Option<String> {
    DATE_KEYS.iter().filter_map(|k| obj.get(*k)).find_map(|v| match v {
        Value::String(s) => non_blank(s),
        Value::Number(n) => n.as_i64().map(|n| n.to_string()),
        _ => None,
    })
}
