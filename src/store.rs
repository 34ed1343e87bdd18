//! In-memory record store keyed by link key.
//!
//! Stands in for the persistence layer: it enforces upsert-by-link-key with
//! [`merge_upsert`] so a re-fetched article updates its stored copy instead of
//! duplicating it. Loading and saving live in [`crate::outputs::json`].

use crate::dedup::merge_upsert;
use crate::models::CanonicalRecord;
use std::collections::BTreeMap;
use tracing::{info, instrument};

/// What [`RecordStore::upsert`] did with a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Updated,
}

#[derive(Debug, Default)]
pub struct RecordStore {
    records: BTreeMap<String, CanonicalRecord>,
}

impl RecordStore {
    /// Build a store from previously saved records; later duplicates merge in.
    pub fn from_records(records: Vec<CanonicalRecord>) -> Self {
        let mut store = Self::default();
        for record in records {
            store.upsert(record);
        }
        store
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Insert a record, or merge it into the stored one with the same key.
    pub fn upsert(&mut self, record: CanonicalRecord) -> Upsert {
        match self.records.get(&record.link_key) {
            Some(stored) => {
                let merged = merge_upsert(stored, record);
                self.records.insert(merged.link_key.clone(), merged);
                Upsert::Updated
            }
            None => {
                self.records.insert(record.link_key.clone(), record);
                Upsert::Inserted
            }
        }
    }

    /// Upsert a batch; returns `(inserted, updated)` counts.
    #[instrument(level = "info", skip_all, fields(count = records.len()))]
    pub fn upsert_batch(&mut self, records: Vec<CanonicalRecord>) -> (usize, usize) {
        let mut inserted = 0usize;
        let mut updated = 0usize;
        for record in records {
            match self.upsert(record) {
                Upsert::Inserted => inserted += 1,
                Upsert::Updated => updated += 1,
            }
        }
        info!(inserted, updated, total = self.len(), "Upserted records");
        (inserted, updated)
    }

    /// Drop records published before `cutoff_ms`; returns how many went.
    #[instrument(level = "info", skip_all, fields(%cutoff_ms))]
    pub fn prune_older_than(&mut self, cutoff_ms: i64) -> usize {
        let before = self.records.len();
        self.records.retain(|_, r| r.published_at_ms >= cutoff_ms);
        let pruned = before - self.records.len();
        info!(pruned, remaining = self.records.len(), "Pruned record store");
        pruned
    }

    /// Stored records in link-key order.
    pub fn records(&self) -> Vec<CanonicalRecord> {
        self.records.values().cloned().collect()
    }
}
