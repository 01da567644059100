//! # Ingestion
//!
//! Message sources feeding the dispatcher.
//!
//! Responsibilities:
//! - Poll the upstream stream with a bounded wait
//! - Hand opaque payload bytes to the dispatcher as `SourceEvent`s
//! - Separate fatal upstream conditions from transient ones
//!
//! ## Sources
//!
//! - [`ChannelSource`] - in-process tokio channel (tests, embedding)
//! - [`LineSource`] - newline-delimited records, e.g. standard input
//! - `KafkaSource` - consumer group subscription (feature `kafka`)
//!
//! ## Usage Example
//!
//! ```ignore
//! use contracts::{MessageSource, SourceEvent};
//! use ingestion::ChannelSource;
//!
//! let (tx, mut source) = ChannelSource::channel("test", 16);
//! tx.send(bytes::Bytes::from_static(b"[]")).await?;
//! assert!(matches!(source.poll(timeout).await, SourceEvent::Record(_)));
//! ```

mod any;
mod channel;
mod error;
#[cfg(feature = "kafka")]
mod kafka;
mod lines;

// Re-exports
pub use any::{build_source, AnySource};
pub use channel::ChannelSource;
pub use contracts::{MessageSource, SourceEvent};
pub use error::{IngestionError, Result};
#[cfg(feature = "kafka")]
pub use kafka::KafkaSource;
pub use lines::{LineSource, StdinSource};
