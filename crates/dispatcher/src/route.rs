//! Route - a sampler gating one or more destinations

use std::sync::Arc;

use bytes::Bytes;
use contracts::RouteConfig;
use delivery::{DeliveryClient, DeliveryEngine, DeliveryError, ErrorCategory};
use observability::{metrics, RunningStats};
use tracing::{debug, instrument, warn};

use crate::error::DispatcherError;
use crate::metrics::RouteMetrics;
use crate::sampler::Sampler;

/// What a route did with one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// The sampler discarded the record
    SampledOut,
    /// The record went to every destination
    Forwarded { delivered: u32, failed: u32 },
}

/// A sampler plus the destinations it gates
pub struct Route {
    name: String,
    sampler: Sampler,
    engines: Vec<DeliveryEngine>,
    metrics: Arc<RouteMetrics>,
}

impl Route {
    /// Assemble a route from parts
    pub fn new(
        name: impl Into<String>,
        sampler: Sampler,
        engines: Vec<DeliveryEngine>,
    ) -> Result<Self, DispatcherError> {
        let name = name.into();
        if engines.is_empty() {
            return Err(DispatcherError::route_creation(
                name,
                "route has no destinations",
            ));
        }

        Ok(Self {
            name,
            sampler,
            engines,
            metrics: Arc::new(RouteMetrics::new()),
        })
    }

    /// Build a route and its delivery engines from configuration
    #[instrument(
        name = "route_from_config",
        skip(config, client),
        fields(route = %config.name, destinations = config.destinations.len())
    )]
    pub fn from_config(
        config: &RouteConfig,
        client: &DeliveryClient,
    ) -> Result<Self, DispatcherError> {
        let sampler = Sampler::new(config.discard_ratio)
            .map_err(|e| DispatcherError::route_creation(&config.name, e.to_string()))?;

        let engines = config
            .destinations
            .iter()
            .map(|destination| {
                DeliveryEngine::new(destination, client.clone()).map_err(|e| {
                    DispatcherError::route_creation(
                        &config.name,
                        format!("destination '{}': {e}", destination.name),
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(&config.name, sampler, engines)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sampler(&self) -> &Sampler {
        &self.sampler
    }

    /// Destination engines in delivery order
    pub fn engines(&self) -> &[DeliveryEngine] {
        &self.engines
    }

    /// Shared handle to this route's counters
    pub fn metrics(&self) -> Arc<RouteMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Offer one record to the route
    ///
    /// Forwarded records are sent to each destination in order. Failures are
    /// logged and counted; they never abort the remaining destinations.
    /// Successful delivery latencies are pushed into `latency_ms`.
    pub async fn dispatch(
        &mut self,
        payload: &Bytes,
        latency_ms: &mut RunningStats,
    ) -> RouteOutcome {
        self.metrics.inc_seen();

        if !self.sampler.should_forward() {
            self.metrics.inc_sampled_out();
            metrics::record_sampled_out(&self.name);
            return RouteOutcome::SampledOut;
        }
        self.metrics.inc_forwarded();

        let mut delivered = 0;
        let mut failed = 0;

        for engine in &mut self.engines {
            match engine.send(payload.clone()).await {
                Ok(receipt) => {
                    delivered += 1;
                    self.metrics.inc_delivered();

                    let elapsed_ms = receipt.duration.as_secs_f64() * 1000.0;
                    latency_ms.push(elapsed_ms);
                    metrics::record_delivery(&self.name, engine.name(), true);
                    metrics::record_delivery_attempts(engine.name(), receipt.attempts);
                    metrics::record_delivery_latency_ms(engine.name(), elapsed_ms);

                    debug!(
                        route = %self.name,
                        destination = engine.name(),
                        endpoint = %receipt.endpoint,
                        status = receipt.status_code,
                        attempts = receipt.attempts,
                        "Delivered"
                    );
                }
                Err(error) => {
                    failed += 1;
                    self.metrics.inc_failed();
                    metrics::record_delivery(&self.name, engine.name(), false);
                    if let DeliveryError::Exhausted { attempts, .. } = &error {
                        metrics::record_delivery_attempts(engine.name(), *attempts);
                    }

                    warn!(
                        route = %self.name,
                        destination = engine.name(),
                        category = %ErrorCategory::from(&error),
                        error = %error,
                        "Delivery failed, record dropped for destination"
                    );
                }
            }
        }

        RouteOutcome::Forwarded { delivered, failed }
    }
}

/// Build every configured route sharing one HTTP client
pub fn build_routes(
    configs: &[RouteConfig],
    client: &DeliveryClient,
) -> Result<Vec<Route>, DispatcherError> {
    configs
        .iter()
        .map(|config| Route::from_config(config, client))
        .collect()
}
