//! Translation metrics.
//!
//! Each `Translator` and the HTTP capability own their own counters instead of
//! sharing a process-wide singleton, so tests and multiple services never
//! observe each other's numbers.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters for translation lookups and batch calls.
#[derive(Debug, Default)]
pub struct TranslationMetrics {
    /// Lookups answered from the cache
    cache_hits: AtomicUsize,

    /// Lookups that fell back to the original text
    cache_misses: AtomicUsize,

    /// Batch calls issued to the translation backend
    batches_sent: AtomicUsize,

    /// Batch calls that failed or returned a malformed response
    batch_failures: AtomicUsize,

    /// Strings successfully translated across all batches
    strings_translated: AtomicUsize,
}

impl TranslationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a cache hit (translation found in cache).
    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a cache miss (fallback text shown).
    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a batch call to the translation backend.
    pub fn record_batch(&self) {
        self.batches_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed batch call.
    pub fn record_batch_failure(&self) {
        self.batch_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record strings written back from a successful batch.
    pub fn record_translated(&self, count: usize) {
        self.strings_translated.fetch_add(count, Ordering::Relaxed);
    }

    pub fn cache_hits(&self) -> usize {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> usize {
        self.cache_misses.load(Ordering::Relaxed)
    }

    pub fn batches_sent(&self) -> usize {
        self.batches_sent.load(Ordering::Relaxed)
    }

    pub fn batch_failures(&self) -> usize {
        self.batch_failures.load(Ordering::Relaxed)
    }

    pub fn strings_translated(&self) -> usize {
        self.strings_translated.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let hits = self.cache_hits();
        let misses = self.cache_misses();
        let total_lookups = hits + misses;
        let cache_hit_rate = if total_lookups > 0 {
            (hits as f64 / total_lookups as f64) * 100.0
        } else {
            0.0
        };

        let batches = self.batches_sent();
        let failures = self.batch_failures().min(batches);
        let batch_success_rate = if batches > 0 {
            ((batches - failures) as f64 / batches as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            cache_hits: hits,
            cache_misses: misses,
            cache_hit_rate,
            batches_sent: batches,
            batch_failures: failures,
            batch_success_rate,
            strings_translated: self.strings_translated(),
        }
    }
}

/// Snapshot of translation statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    pub cache_hits: usize,
    pub cache_misses: usize,

    /// Cache hit rate as a percentage (0-100)
    pub cache_hit_rate: f64,

    pub batches_sent: usize,
    pub batch_failures: usize,

    /// Batch success rate as a percentage (0-100)
    pub batch_success_rate: f64,

    pub strings_translated: usize,
}
