//! Keyword search over canonical records.
//!
//! Queries are stemmed with the same suffix rule that produced
//! [`CanonicalRecord::keywords`], so "budgets" finds "budget" and vice versa.
//! Results are ranked by the number of query stems matched, then recency.

use crate::models::CanonicalRecord;
use crate::text::keywords::query_keywords;
use itertools::Itertools;
use std::cmp::Reverse;

/// Return up to `limit` records matching at least one query stem, best first.
pub fn search_records<'a>(records: &'a [CanonicalRecord], query: &str, limit: usize) -> Vec<&'a CanonicalRecord> {
    let stems = query_keywords(query);
    if stems.is_empty() {
        return Vec::new();
    }
    records
        .iter()
        .map(|r| (r.keywords.intersection(&stems).count(), r))
        .filter(|(hits, _)| *hits > 0)
        .sorted_by_key(|(hits, r)| (Reverse(*hits), Reverse(r.published_at_ms)))
        .take(limit)
        .map(|(_, r)| r)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::keywords::search_keywords;

    fn record(title: &str, published_at_ms: i64) -> CanonicalRecord {
        CanonicalRecord {
            title: title.to_string(),
            link: "https://example.com/a".to_string(),
            source: "example".to_string(),
            summary: None,
            image: None,
            link_key: title.to_string(),
            keywords: search_keywords(title, None),
            published_at_ms,
            category: None,
        }
    }

    #[test]
    fn test_search_ranks_by_hits_then_recency() {
        let records = vec![
            record("Council budget talks stall", 1),
            record("Budget passes after council votes", 2),
            record("Budget airline expands", 3),
            record("Fire breaks out downtown", 4),
        ];
        let hits = search_records(&records, "council budgets", 10);
        let titles: Vec<&str> = hits.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Budget passes after council votes",
                "Council budget talks stall",
                "Budget airline expands"
            ]
        );
    }

    #[test]
    fn test_search_limit_and_empty_query() {
        let records = vec![record("Fire downtown", 1), record("Fire uptown", 2)];
        assert_eq!(search_records(&records, "fire", 1).len(), 1);
        assert!(search_records(&records, "the", 10).is_empty());
        assert!(search_records(&[], "fire", 10).is_empty());
    }
}
