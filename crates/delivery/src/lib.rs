//! # Delivery
//!
//! Resilient HTTP delivery to time-series backends.
//!
//! A [`DeliveryEngine`] owns the candidate endpoints of one destination and
//! implements send-with-failover:
//!
//! 1. **Round-robin** - each `send` starts one endpoint further than the last
//! 2. **Transport failover** - connection errors and timeouts rotate to the
//!    next endpoint, at most once per endpoint
//! 3. **Classification** - 2xx and the destination's acceptable statuses are
//!    success; any other status is a rejection and is not retried elsewhere
//!
//! The engine does not log outcomes; callers decide what a failure means.
//!
//! # Example
//!
//! ```no_run
//! use bytes::Bytes;
//! use contracts::DestinationConfig;
//! use delivery::{DeliveryClient, DeliveryEngine, DeliveryError};
//!
//! # async fn example(config: DestinationConfig) -> Result<(), DeliveryError> {
//! let client = DeliveryClient::with_defaults()?;
//! let mut engine = DeliveryEngine::new(&config, client)?;
//! let receipt = engine.send(Bytes::from_static(b"[]")).await?;
//! println!("delivered to {} after {} attempts", receipt.endpoint, receipt.attempts);
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod client;
pub mod engine;
pub mod error;

pub use classifier::{classify, Classification};
pub use client::{AttemptResponse, ClientConfig, DeliveryClient};
pub use engine::{DeliveryEngine, DeliveryReceipt};
pub use error::{DeliveryError, ErrorCategory, Result};

/// Default HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Default connect timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECONDS: u64 = 5;
