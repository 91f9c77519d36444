use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Counters for the verification workflow
#[derive(Debug, Default)]
pub struct PollMetrics {
    pub poll_ticks: AtomicU64,
    pub fetch_failures: AtomicU64,
    pub merges_applied: AtomicU64,
    pub merges_ignored: AtomicU64,
    pub stale_reads_rejected: AtomicU64,
    pub uploads: AtomicU64,
    pub upload_failures: AtomicU64,
}

impl PollMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_tick(&self) {
        self.poll_ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_merge_applied(&self) {
        self.merges_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_merge_ignored(&self) {
        self.merges_ignored.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stale_read(&self) {
        self.stale_reads_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_upload(&self, succeeded: bool) {
        self.uploads.fetch_add(1, Ordering::Relaxed);
        if !succeeded {
            self.upload_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn get_stats(&self) -> PollStats {
        PollStats {
            poll_ticks: self.poll_ticks.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            merges_applied: self.merges_applied.load(Ordering::Relaxed),
            merges_ignored: self.merges_ignored.load(Ordering::Relaxed),
            stale_reads_rejected: self.stale_reads_rejected.load(Ordering::Relaxed),
            uploads: self.uploads.load(Ordering::Relaxed),
            upload_failures: self.upload_failures.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            poll_ticks = stats.poll_ticks,
            fetch_failures = stats.fetch_failures,
            merges_applied = stats.merges_applied,
            merges_ignored = stats.merges_ignored,
            stale_reads_rejected = stats.stale_reads_rejected,
            uploads = stats.uploads,
            upload_failures = stats.upload_failures,
            "Verification workflow metrics"
        );
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollStats {
    pub poll_ticks: u64,
    pub fetch_failures: u64,
    pub merges_applied: u64,
    pub merges_ignored: u64,
    pub stale_reads_rejected: u64,
    pub uploads: u64,
    pub upload_failures: u64,
}

/// Global metrics instance
static POLL_METRICS: std::sync::LazyLock<PollMetrics> = std::sync::LazyLock::new(PollMetrics::new);

pub fn poll_metrics() -> &'static PollMetrics {
    &POLL_METRICS
}
