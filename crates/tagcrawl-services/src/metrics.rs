//! Ingest counters.
//!
//! Every invocation returns its own [`IngestStats`]; the process-wide
//! [`IngestMetrics`] accumulates them for the health endpoint. Runs that stop
//! before listing (empty query, unknown tag, listing failure) are counted too.

use crate::ingest::IngestOutcome;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Per-invocation tallies of what happened to each listed descriptor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    pub listed: usize,
    pub ingested: usize,
    pub already_indexed: usize,
    pub skipped_non_image: usize,
    pub skipped_incomplete: usize,
    pub fetch_failed: usize,
    pub store_failed: usize,
    /// Objects written to the content store whose metadata insert failed.
    pub unindexed: usize,
    /// Existence checks that errored and were treated as "not indexed".
    pub existence_check_failed: usize,
    /// Inserts that lost a primary key race to a concurrent run.
    pub index_conflicts: usize,
}

/// Cumulative counters across all invocations in this process.
#[derive(Debug, Default)]
pub struct IngestMetrics {
    runs: AtomicU64,
    completed: AtomicU64,
    invalid_queries: AtomicU64,
    tags_not_found: AtomicU64,
    source_unavailable: AtomicU64,
    ingested: AtomicU64,
    already_indexed: AtomicU64,
    skipped_non_image: AtomicU64,
    skipped_incomplete: AtomicU64,
    fetch_failed: AtomicU64,
    store_failed: AtomicU64,
    unindexed: AtomicU64,
    existence_check_failed: AtomicU64,
    index_conflicts: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestMetricsSnapshot {
    pub runs: u64,
    pub completed: u64,
    pub invalid_queries: u64,
    pub tags_not_found: u64,
    pub source_unavailable: u64,
    pub ingested: u64,
    pub already_indexed: u64,
    pub skipped_non_image: u64,
    pub skipped_incomplete: u64,
    pub fetch_failed: u64,
    pub store_failed: u64,
    pub unindexed: u64,
    pub existence_check_failed: u64,
    pub index_conflicts: u64,
}

impl IngestMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one finished invocation and fold in its item tallies.
    pub fn record(&self, outcome: IngestOutcome, stats: &IngestStats) {
        let add = |counter: &AtomicU64, value: usize| {
            counter.fetch_add(value as u64, Ordering::Relaxed);
        };
        self.runs.fetch_add(1, Ordering::Relaxed);
        let outcome_counter = match outcome {
            IngestOutcome::Completed => &self.completed,
            IngestOutcome::InvalidQuery => &self.invalid_queries,
            IngestOutcome::TagNotFound => &self.tags_not_found,
            IngestOutcome::SourceUnavailable => &self.source_unavailable,
        };
        outcome_counter.fetch_add(1, Ordering::Relaxed);
        add(&self.ingested, stats.ingested);
        add(&self.already_indexed, stats.already_indexed);
        add(&self.skipped_non_image, stats.skipped_non_image);
        add(&self.skipped_incomplete, stats.skipped_incomplete);
        add(&self.fetch_failed, stats.fetch_failed);
        add(&self.store_failed, stats.store_failed);
        add(&self.unindexed, stats.unindexed);
        add(&self.existence_check_failed, stats.existence_check_failed);
        add(&self.index_conflicts, stats.index_conflicts);
    }

    pub fn snapshot(&self) -> IngestMetricsSnapshot {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        IngestMetricsSnapshot {
            runs: load(&self.runs),
            completed: load(&self.completed),
            invalid_queries: load(&self.invalid_queries),
            tags_not_found: load(&self.tags_not_found),
            source_unavailable: load(&self.source_unavailable),
            ingested: load(&self.ingested),
            already_indexed: load(&self.already_indexed),
            skipped_non_image: load(&self.skipped_non_image),
            skipped_incomplete: load(&self.skipped_incomplete),
            fetch_failed: load(&self.fetch_failed),
            store_failed: load(&self.store_failed),
            unindexed: load(&self.unindexed),
            existence_check_failed: load(&self.existence_check_failed),
            index_conflicts: load(&self.index_conflicts),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_accumulates() {
        let metrics = IngestMetrics::new();
        let stats = IngestStats {
            listed: 3,
            ingested: 1,
            already_indexed: 1,
            skipped_non_image: 1,
            ..Default::default()
        };

        metrics.record(IngestOutcome::Completed, &stats);
        metrics.record(IngestOutcome::Completed, &stats);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.runs, 2);
        assert_eq!(snapshot.completed, 2);
        assert_eq!(snapshot.ingested, 2);
        assert_eq!(snapshot.already_indexed, 2);
        assert_eq!(snapshot.skipped_non_image, 2);
        assert_eq!(snapshot.unindexed, 0);
    }

    #[test]
    fn test_early_exits_count_as_runs() {
        let metrics = IngestMetrics::new();
        let empty = IngestStats::default();

        metrics.record(IngestOutcome::InvalidQuery, &empty);
        metrics.record(IngestOutcome::TagNotFound, &empty);
        metrics.record(IngestOutcome::SourceUnavailable, &empty);
        metrics.record(IngestOutcome::SourceUnavailable, &empty);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.runs, 4);
        assert_eq!(snapshot.completed, 0);
        assert_eq!(snapshot.invalid_queries, 1);
        assert_eq!(snapshot.tags_not_found, 1);
        assert_eq!(snapshot.source_unavailable, 2);
    }
}
