//! ChannelSource - records pushed through a tokio channel

use std::time::Duration;

use bytes::Bytes;
use contracts::{ContractError, MessageSource, SourceEvent};
use tokio::sync::mpsc;
use tracing::debug;

/// Source fed by an in-process channel
///
/// Reports `Closed` once every sender is dropped and the buffer drained.
pub struct ChannelSource {
    name: String,
    rx: mpsc::Receiver<Bytes>,
}

impl ChannelSource {
    /// Wrap an existing receiver
    pub fn new(name: impl Into<String>, rx: mpsc::Receiver<Bytes>) -> Self {
        Self {
            name: name.into(),
            rx,
        }
    }

    /// Create a bounded channel and its source
    pub fn channel(name: impl Into<String>, capacity: usize) -> (mpsc::Sender<Bytes>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self::new(name, rx))
    }
}

impl MessageSource for ChannelSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn poll(&mut self, timeout: Duration) -> SourceEvent {
        match tokio::time::timeout(timeout, self.rx.recv()).await {
            Ok(Some(payload)) => SourceEvent::Record(payload),
            Ok(None) => SourceEvent::Closed,
            Err(_) => SourceEvent::Idle,
        }
    }

    async fn close(&mut self) -> Result<(), ContractError> {
        self.rx.close();
        debug!(source = %self.name, "ChannelSource closed");
        Ok(())
    }
}
