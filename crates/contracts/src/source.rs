//! MessageSource trait - Dispatcher input interface
//!
//! Abstracts the ordered stream the relay consumes. The dispatcher only ever
//! sees opaque payload bytes; offsets, partitions and group coordination stay
//! inside the implementation.

use std::time::Duration;

use bytes::Bytes;

use crate::ContractError;

/// Outcome of a single bounded poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceEvent {
    /// A record payload
    Record(Bytes),

    /// Nothing arrived within the poll timeout
    Idle,

    /// The source reported a problem
    ///
    /// Fatal errors (e.g. every broker unreachable) stop the dispatch loop;
    /// the rest are logged and polling continues.
    Error { message: String, fatal: bool },

    /// The stream ended; no further records will arrive
    Closed,
}

impl SourceEvent {
    /// Create a non-fatal error event
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
            fatal: false,
        }
    }

    /// Create a fatal error event
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
            fatal: true,
        }
    }
}

/// Record source trait
///
/// All message source implementations must implement this trait.
#[trait_variant::make(MessageSource: Send)]
pub trait LocalMessageSource {
    /// Source name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Wait at most `timeout` for the next event
    async fn poll(&mut self, timeout: Duration) -> SourceEvent;

    /// Release the underlying subscription
    async fn close(&mut self) -> Result<(), ContractError>;
}
