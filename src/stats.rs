//! Process-wide ingestion statistics.
//!
//! Plain atomic counters bumped on the hot path and snapshotted on demand.
//! Counters reset only on restart.
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;

#[derive(Debug, Default)]
pub(crate) struct IngestionStats {
    pub requests: AtomicU64,
    pub successes: AtomicU64,
    pub failures: AtomicU64,
    pub rate_limited: AtomicU64,
    pub validation_failures: AtomicU64,
    pub compliance_failures: AtomicU64,
    pub write_failures: AtomicU64,
    pub metrics_ingested: AtomicU64,
    pub logs_ingested: AtomicU64,
    pub events_ingested: AtomicU64,
    pub bytes_ingested: AtomicU64,
}

impl IngestionStats {
    pub(crate) fn snapshot(&self, uptime: Duration) -> StatsSnapshot {
        let requests = self.requests.load(Ordering::Relaxed);
        let successes = self.successes.load(Ordering::Relaxed);
        StatsSnapshot {
            requests,
            successes,
            failures: self.failures.load(Ordering::Relaxed),
            rate_limited: self.rate_limited.load(Ordering::Relaxed),
            validation_failures: self.validation_failures.load(Ordering::Relaxed),
            compliance_failures: self.compliance_failures.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
            metrics_ingested: self.metrics_ingested.load(Ordering::Relaxed),
            logs_ingested: self.logs_ingested.load(Ordering::Relaxed),
            events_ingested: self.events_ingested.load(Ordering::Relaxed),
            bytes_ingested: self.bytes_ingested.load(Ordering::Relaxed),
            success_rate: if requests == 0 {
                1.0
            } else {
                successes as f64 / requests as f64
            },
            uptime_secs: uptime.as_secs(),
        }
    }
}

/// Point-in-time view of the gateway's counters.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatsSnapshot {
    pub requests: u64,
    pub successes: u64,
    pub failures: u64,
    pub rate_limited: u64,
    pub validation_failures: u64,
    pub compliance_failures: u64,
    pub write_failures: u64,
    pub metrics_ingested: u64,
    pub logs_ingested: u64,
    pub events_ingested: u64,
    pub bytes_ingested: u64,
    pub success_rate: f64,
    pub uptime_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_computes_success_rate() {
        let stats = IngestionStats::default();
        stats.requests.store(4, Ordering::Relaxed);
        stats.successes.store(3, Ordering::Relaxed);
        stats.failures.store(1, Ordering::Relaxed);

        let snap = stats.snapshot(Duration::from_secs(90));
        assert_eq!(snap.requests, 4);
        assert!((snap.success_rate - 0.75).abs() < f64::EPSILON);
        assert_eq!(snap.uptime_secs, 90);
    }

    #[test]
    fn empty_stats_report_full_success() {
        let snap = IngestionStats::default().snapshot(Duration::ZERO);
        assert_eq!(snap.requests, 0);
        assert!((snap.success_rate - 1.0).abs() < f64::EPSILON);
    }
}
