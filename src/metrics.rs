use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing one indexing run.
///
/// Progress percentage is driven by completions regardless of outcome; these counters keep the
/// success/failure split so the final summary can report it.
#[derive(Default)]
pub struct RunMetrics {
    files_succeeded: AtomicU64,
    files_failed: AtomicU64,
    records_indexed: AtomicU64,
    batches_submitted: AtomicU64,
}

impl RunMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fully indexed and relocated archive.
    pub fn record_success(&self, records: u64, batches: u64) {
        self.files_succeeded.fetch_add(1, Ordering::Relaxed);
        self.records_indexed.fetch_add(records, Ordering::Relaxed);
        self.batches_submitted.fetch_add(batches, Ordering::Relaxed);
    }

    /// Record an archive that did not complete.
    pub fn record_failure(&self) {
        self.files_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            files_succeeded: self.files_succeeded.load(Ordering::Relaxed),
            files_failed: self.files_failed.load(Ordering::Relaxed),
            records_indexed: self.records_indexed.load(Ordering::Relaxed),
            batches_submitted: self.batches_submitted.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of run counters used for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Archives indexed and moved to the processed directory.
    pub files_succeeded: u64,
    /// Archives that failed at any step.
    pub files_failed: u64,
    /// Records accepted by the index across successful archives.
    pub records_indexed: u64,
    /// Bulk requests issued for successful archives.
    pub batches_submitted: u64,
}
