//! # Dispatcher
//!
//! Record distribution.
//!
//! Responsibilities:
//! - Consume records from a `MessageSource`
//! - Gate each route with its discard-ratio sampler
//! - Deliver forwarded records to every destination of the route, in order
//! - Keep delivery failures from stopping the stream

pub mod dispatcher;
pub mod error;
pub mod metrics;
pub mod route;
pub mod sampler;

pub use contracts::{MessageSource, SourceEvent};
pub use dispatcher::{
    DispatchSummary, Dispatcher, DispatcherConfig, RecordOutcome, StopReason,
    DEFAULT_POLL_TIMEOUT,
};
pub use error::DispatcherError;
pub use metrics::{RouteMetrics, RouteMetricsSnapshot};
pub use route::{build_routes, Route, RouteOutcome};
pub use sampler::Sampler;
