//! Record deduplication.
//!
//! Two passes run in this order:
//!
//! 1. [`dedup_by_link_key`]: the same article fetched more than once, or
//!    through a URL variant, shares a link key. Only the newest copy survives.
//! 2. [`soft_dedup`]: outlets that re-slug an article or retouch a headline
//!    produce a new link key but the same normalized title. Records are grouped
//!    by `(source, normalized title)` and again the newest wins.
//!
//! [`merge_upsert`] is the contract the record store applies when a key it
//! already holds arrives again.
//!
//! All functions consume and return whole records; nothing is edited in place.

use crate::models::CanonicalRecord;
use crate::text::normalize::normalized_title;
use std::collections::HashMap;
use std::hash::Hash;
use tracing::{debug, instrument};

/// Keep the newest record per key. Ties go to the record seen last.
///
/// Records for which `key` returns `None` are never grouped and always kept.
/// Output order is the order in which each key was first seen.
fn keep_newest_by<K, F>(records: Vec<CanonicalRecord>, key: F) -> Vec<CanonicalRecord>
where
    K: Eq + Hash,
    F: Fn(&CanonicalRecord) -> Option<K>,
{
    let mut kept: Vec<CanonicalRecord> = Vec::with_capacity(records.len());
    let mut slots: HashMap<K, usize> = HashMap::new();

    for record in records {
        let Some(k) = key(&record) else {
            kept.push(record);
            continue;
        };
        match slots.get(&k) {
            Some(&slot) => {
                if record.published_at_ms >= kept[slot].published_at_ms {
                    kept[slot] = record;
                }
            }
            None => {
                slots.insert(k, kept.len());
                kept.push(record);
            }
        }
    }
    kept
}

/// Collapse records sharing a link key, keeping the most recently published.
#[instrument(level = "info", skip_all, fields(count = records.len()))]
pub fn dedup_by_link_key(records: Vec<CanonicalRecord>) -> Vec<CanonicalRecord> {
    let before = records.len();
    let kept = keep_newest_by(records, |r| Some(r.link_key.clone()));
    debug!(before, after = kept.len(), "Link-key dedup complete");
    kept
}

/// Collapse records from one outlet whose titles normalize identically.
///
/// Records whose title normalizes to nothing (blank or all stop-words) cannot
/// be compared and pass through untouched.
#[instrument(level = "info", skip_all, fields(count = records.len()))]
pub fn soft_dedup(records: Vec<CanonicalRecord>) -> Vec<CanonicalRecord> {
    let before = records.len();
    let kept = keep_newest_by(records, |r| {
        let title = normalized_title(&r.title);
        (!title.is_empty()).then(|| (r.source.clone(), title))
    });
    debug!(before, after = kept.len(), "Soft dedup complete");
    kept
}

/// Merge a freshly fetched record into the stored copy with the same link key.
///
/// The incoming record wins on every field it carries. Optional fields it
/// lacks keep the stored value, and `published_at_ms` never moves backwards.
pub fn merge_upsert(stored: &CanonicalRecord, incoming: CanonicalRecord) -> CanonicalRecord {
    CanonicalRecord {
        summary: incoming.summary.or_else(|| stored.summary.clone()),
        image: incoming.image.or_else(|| stored.image.clone()),
        category: incoming.category.or_else(|| stored.category.clone()),
        published_at_ms: incoming.published_at_ms.max(stored.published_at_ms),
        ..incoming
    }
}
