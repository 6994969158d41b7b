//! Process-wide counters for recall and retention.
//!
//! Counters are bumped silently at the call site. Call [`Metrics::flush`]
//! to emit current values as one `tracing::info!` event.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Relaxed atomic counters.
#[derive(Debug)]
pub struct Metrics {
    queries_executed: AtomicU64,
    dataset_searches: AtomicU64,
    dataset_search_failures: AtomicU64,
    privacy_withheld: AtomicU64,
    memories_pruned: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            queries_executed: AtomicU64::new(0),
            dataset_searches: AtomicU64::new(0),
            dataset_search_failures: AtomicU64::new(0),
            privacy_withheld: AtomicU64::new(0),
            memories_pruned: AtomicU64::new(0),
        }
    }

    pub fn inc_queries(&self) {
        self.queries_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_dataset_searches(&self, n: u64) {
        self.dataset_searches.fetch_add(n, Ordering::Relaxed);
    }

    pub fn inc_dataset_search_failures(&self) {
        self.dataset_search_failures.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "dataset_search_failures", "counter incremented");
    }

    pub fn add_privacy_withheld(&self, n: u64) {
        self.privacy_withheld.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_memories_pruned(&self, n: u64) {
        self.memories_pruned.fetch_add(n, Ordering::Relaxed);
    }

    /// Emit all counters as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            queries_executed = self.queries_executed(),
            dataset_searches = self.dataset_searches(),
            dataset_search_failures = self.dataset_search_failures(),
            privacy_withheld = self.privacy_withheld(),
            memories_pruned = self.memories_pruned(),
        );
    }

    pub fn queries_executed(&self) -> u64 {
        self.queries_executed.load(Ordering::Relaxed)
    }

    pub fn dataset_searches(&self) -> u64 {
        self.dataset_searches.load(Ordering::Relaxed)
    }

    pub fn dataset_search_failures(&self) -> u64 {
        self.dataset_search_failures.load(Ordering::Relaxed)
    }

    pub fn privacy_withheld(&self) -> u64 {
        self.privacy_withheld.load(Ordering::Relaxed)
    }

    pub fn memories_pruned(&self) -> u64 {
        self.memories_pruned.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.queries_executed.store(0, Ordering::Relaxed);
        self.dataset_searches.store(0, Ordering::Relaxed);
        self.dataset_search_failures.store(0, Ordering::Relaxed);
        self.privacy_withheld.store(0, Ordering::Relaxed);
        self.memories_pruned.store(0, Ordering::Relaxed);
    }
}
