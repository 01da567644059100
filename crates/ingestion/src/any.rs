//! Source selection from configuration

use std::time::Duration;

use contracts::{ContractError, MessageSource, SourceConfig, SourceEvent, SourceKind};

use crate::channel::ChannelSource;
use crate::error::Result;
#[cfg(feature = "kafka")]
use crate::kafka::KafkaSource;
use crate::lines::StdinSource;

/// Any source the relay can run with
pub enum AnySource {
    Channel(ChannelSource),
    Stdin(StdinSource),
    #[cfg(feature = "kafka")]
    Kafka(KafkaSource),
}

/// Build the source described by `config`
pub fn build_source(config: &SourceConfig) -> Result<AnySource> {
    match config.kind {
        SourceKind::Stdin => Ok(AnySource::Stdin(StdinSource::stdin())),
        SourceKind::Kafka => kafka_source(config),
    }
}

#[cfg(feature = "kafka")]
fn kafka_source(config: &SourceConfig) -> Result<AnySource> {
    Ok(AnySource::Kafka(KafkaSource::new(config)?))
}

#[cfg(not(feature = "kafka"))]
fn kafka_source(_config: &SourceConfig) -> Result<AnySource> {
    Err(crate::IngestionError::Unavailable {
        kind: "kafka".to_string(),
        message: "built without the `kafka` feature".to_string(),
    })
}

impl From<ChannelSource> for AnySource {
    fn from(source: ChannelSource) -> Self {
        AnySource::Channel(source)
    }
}

impl MessageSource for AnySource {
    fn name(&self) -> &str {
        match self {
            AnySource::Channel(s) => s.name(),
            AnySource::Stdin(s) => s.name(),
            #[cfg(feature = "kafka")]
            AnySource::Kafka(s) => s.name(),
        }
    }

    async fn poll(&mut self, timeout: Duration) -> SourceEvent {
        match self {
            AnySource::Channel(s) => s.poll(timeout).await,
            AnySource::Stdin(s) => s.poll(timeout).await,
            #[cfg(feature = "kafka")]
            AnySource::Kafka(s) => s.poll(timeout).await,
        }
    }

    async fn close(&mut self) -> std::result::Result<(), ContractError> {
        match self {
            AnySource::Channel(s) => s.close().await,
            AnySource::Stdin(s) => s.close().await,
            #[cfg(feature = "kafka")]
            AnySource::Kafka(s) => s.close().await,
        }
    }
}
