//! Deduplication, filtering and ranking of the collected corpus.
//!
//! Duplicates within and across queries are expected; they are resolved here
//! by exact title match, keeping the first occurrence in discovery order.

use crate::record::PaperRecord;
use std::collections::HashSet;
use tracing::info;

/// Rank the corpus and keep the top records.
///
/// Steps, in order: deduplicate by exact title (first occurrence wins),
/// re-check the year threshold, stable-sort by citations then year (both
/// descending, ties broken by discovery order), and truncate to `top_n`.
pub fn rank(records: Vec<PaperRecord>, min_year: i32, top_n: usize) -> Vec<PaperRecord> {
    let total = records.len();

    let mut seen: HashSet<String> = HashSet::new();
    let mut retained: Vec<PaperRecord> = records
        .into_iter()
        .filter(|r| seen.insert(r.title.clone()))
        .filter(|r| r.year >= min_year)
        .collect();

    retained.sort_by(|a, b| b.citations.cmp(&a.citations).then(b.year.cmp(&a.year)));
    retained.truncate(top_n);

    info!(raw = total, retained = retained.len(), "Ranked corpus");
    retained
}
