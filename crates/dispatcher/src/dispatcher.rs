//! Dispatcher - main loop from source to routes

use std::time::Duration;

use bytes::Bytes;
use contracts::{MessageSource, SourceEvent};
use observability::{metrics, RunningStats, StatsSummary};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

use crate::error::DispatcherError;
use crate::metrics::RouteMetricsSnapshot;
use crate::route::{Route, RouteOutcome};

/// Default bounded wait for one source poll
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// Dispatcher configuration
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Bounded wait for a single poll
    pub poll_timeout: Duration,
    /// Stop after this many records (None = unbounded)
    pub max_records: Option<u64>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            max_records: None,
        }
    }
}

/// Why the loop stopped cleanly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The source reported end of stream
    SourceClosed,
    /// Shutdown was requested
    Shutdown,
    /// `max_records` was reached
    MaxRecords,
}

/// Aggregate result of one record across all routes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordOutcome {
    pub forwarded_routes: u32,
    pub delivered: u32,
    pub failed: u32,
}

/// Final report of a run
#[derive(Debug, Clone)]
pub struct DispatchSummary {
    pub stop_reason: StopReason,
    pub records: u64,
    pub source_errors: u64,
    pub routes: Vec<(String, RouteMetricsSnapshot)>,
    /// Latency of successful deliveries
    pub delivery_latency_ms: StatsSummary,
}

/// Pulls records from a source and offers each to every route in order
///
/// Runs on a single task; deliveries are sequential. Shutdown is observed
/// between records, so an in-flight record always finishes.
pub struct Dispatcher<S> {
    source: S,
    routes: Vec<Route>,
    config: DispatcherConfig,
    shutdown: watch::Receiver<bool>,
    records: u64,
    source_errors: u64,
    latency_ms: RunningStats,
}

impl<S: MessageSource> Dispatcher<S> {
    /// Create a dispatcher; sending `true` on the paired sender stops it
    pub fn new(
        source: S,
        routes: Vec<Route>,
        config: DispatcherConfig,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            source,
            routes,
            config,
            shutdown,
            records: 0,
            source_errors: 0,
            latency_ms: RunningStats::default(),
        }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Records taken from the source so far
    pub fn records(&self) -> u64 {
        self.records
    }

    /// Get metrics for all routes
    pub fn metrics(&self) -> Vec<(String, RouteMetricsSnapshot)> {
        self.routes
            .iter()
            .map(|r| (r.name().to_string(), r.metrics().snapshot()))
            .collect()
    }

    /// Run the main loop
    ///
    /// Returns when the source closes, shutdown is requested or
    /// `max_records` is reached. A fatal source error ends the loop with
    /// `DispatcherError::SourceFatal`. The source is closed in every case.
    #[instrument(
        name = "dispatcher_run",
        skip(self),
        fields(source = self.source.name(), routes = self.routes.len())
    )]
    pub async fn run(mut self) -> Result<DispatchSummary, DispatcherError> {
        info!("Dispatcher started");

        let result = self.run_loop().await;

        if let Err(e) = self.source.close().await {
            warn!(error = %e, "Failed to close source");
        }

        let stop_reason = result?;
        info!(
            records = self.records,
            reason = ?stop_reason,
            "Dispatcher stopped"
        );

        Ok(self.summary(stop_reason))
    }

    async fn run_loop(&mut self) -> Result<StopReason, DispatcherError> {
        loop {
            if *self.shutdown.borrow() {
                return Ok(StopReason::Shutdown);
            }
            if self.config.max_records.is_some_and(|max| self.records >= max) {
                return Ok(StopReason::MaxRecords);
            }

            match self.source.poll(self.config.poll_timeout).await {
                SourceEvent::Record(payload) => {
                    self.dispatch_record(payload).await;
                }
                SourceEvent::Idle => {}
                SourceEvent::Error {
                    message,
                    fatal: false,
                } => {
                    self.source_errors += 1;
                    metrics::record_source_error(false);
                    warn!(error = %message, "Source error, continuing");
                }
                SourceEvent::Error {
                    message,
                    fatal: true,
                } => {
                    self.source_errors += 1;
                    metrics::record_source_error(true);
                    error!(error = %message, "Fatal source error");
                    return Err(DispatcherError::source_fatal(self.source.name(), message));
                }
                SourceEvent::Closed => return Ok(StopReason::SourceClosed),
            }
        }
    }

    /// Offer one record to every route in configured order
    pub async fn dispatch_record(&mut self, payload: Bytes) -> RecordOutcome {
        self.records += 1;
        metrics::record_record_received();

        let mut outcome = RecordOutcome::default();
        for route in &mut self.routes {
            if let RouteOutcome::Forwarded { delivered, failed } =
                route.dispatch(&payload, &mut self.latency_ms).await
            {
                outcome.forwarded_routes += 1;
                outcome.delivered += delivered;
                outcome.failed += failed;
            }
        }

        if self.records % 1000 == 0 {
            debug!(records = self.records, "Dispatcher progress");
        }

        outcome
    }

    fn summary(&self, stop_reason: StopReason) -> DispatchSummary {
        DispatchSummary {
            stop_reason,
            records: self.records,
            source_errors: self.source_errors,
            routes: self.metrics(),
            delivery_latency_ms: self.latency_ms.summary(),
        }
    }
}
