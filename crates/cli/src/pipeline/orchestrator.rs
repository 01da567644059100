//! Relay orchestrator - wires source, routes and dispatcher.

use std::time::{Duration, Instant};

use contracts::{MessageSource, RelayBlueprint};
use delivery::{ClientConfig, DeliveryClient};
use dispatcher::{build_routes, Dispatcher, DispatcherConfig};
use tokio::sync::watch;
use tracing::{info, instrument, warn};

use super::RunStats;
use crate::error::Result;

/// Relay configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The relay blueprint
    pub blueprint: RelayBlueprint,

    /// Maximum number of records to consume (None = unlimited)
    pub max_records: Option<u64>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main relay orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new relay with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run until the source closes, a signal arrives or the source fails
    #[instrument(name = "pipeline_run", skip(self))]
    pub async fn run(self) -> Result<RunStats> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        if let Some(port) = self.config.metrics_port {
            if let Err(e) = observability::init_metrics_only(port) {
                warn!(error = %e, port, "Metrics endpoint unavailable, continuing without it");
            }
        }

        let client = DeliveryClient::new(ClientConfig::from(&blueprint.http))?;
        let routes = build_routes(&blueprint.routes, &client)?;
        let source = ingestion::build_source(&blueprint.source)?;
        info!(
            source = source.name(),
            routes = routes.len(),
            "Relay components ready"
        );

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let signal_task = tokio::spawn(async move {
            shutdown_signal().await;
            warn!("Received shutdown signal, finishing in-flight record...");
            let _ = shutdown_tx.send(true);
        });

        let dispatcher_config = DispatcherConfig {
            poll_timeout: Duration::from_millis(blueprint.source.poll_timeout_ms),
            max_records: self.config.max_records,
        };
        let result = Dispatcher::new(source, routes, dispatcher_config, shutdown_rx)
            .run()
            .await;

        signal_task.abort();

        Ok(RunStats {
            summary: result?,
            duration: start_time.elapsed(),
        })
    }
}

/// Resolve on Ctrl+C or SIGTERM
///
/// A handler that cannot be installed never resolves.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
