//! Route metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters for a single route
///
/// Shared behind an `Arc` so a reporter can read while the loop runs.
#[derive(Debug, Default)]
pub struct RouteMetrics {
    /// Records offered to the route
    seen: AtomicU64,
    /// Records that passed the sampler
    forwarded: AtomicU64,
    /// Records discarded by the sampler
    sampled_out: AtomicU64,
    /// Successful destination deliveries
    delivered: AtomicU64,
    /// Failed destination deliveries
    failed: AtomicU64,
}

impl RouteMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seen(&self) -> u64 {
        self.seen.load(Ordering::Relaxed)
    }

    pub fn inc_seen(&self) {
        self.seen.fetch_add(1, Ordering::Relaxed);
    }

    pub fn forwarded(&self) -> u64 {
        self.forwarded.load(Ordering::Relaxed)
    }

    pub fn inc_forwarded(&self) {
        self.forwarded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn sampled_out(&self) -> u64 {
        self.sampled_out.load(Ordering::Relaxed)
    }

    pub fn inc_sampled_out(&self) {
        self.sampled_out.fetch_add(1, Ordering::Relaxed);
    }

    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn inc_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn inc_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> RouteMetricsSnapshot {
        RouteMetricsSnapshot {
            seen: self.seen(),
            forwarded: self.forwarded(),
            sampled_out: self.sampled_out(),
            delivered: self.delivered(),
            failed: self.failed(),
        }
    }
}

/// Snapshot of route metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RouteMetricsSnapshot {
    pub seen: u64,
    pub forwarded: u64,
    pub sampled_out: u64,
    pub delivered: u64,
    pub failed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_counters() {
        let metrics = RouteMetrics::new();
        metrics.inc_seen();
        metrics.inc_seen();
        metrics.inc_forwarded();
        metrics.inc_sampled_out();
        metrics.inc_delivered();
        metrics.inc_failed();

        assert_eq!(
            metrics.snapshot(),
            RouteMetricsSnapshot {
                seen: 2,
                forwarded: 1,
                sampled_out: 1,
                delivered: 1,
                failed: 1,
            }
        );
    }
}
