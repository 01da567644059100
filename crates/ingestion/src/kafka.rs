//! KafkaSource - consumer group subscription via librdkafka

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use contracts::{ContractError, MessageSource, SourceConfig, SourceEvent};
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, ConsumerContext, StreamConsumer};
use rdkafka::error::KafkaError;
use rdkafka::types::RDKafkaErrorCode;
use rdkafka::{ClientContext, Message};
use tracing::{debug, error, info, instrument};

/// Client context flagging loss of every broker
struct RelayContext {
    brokers_down: Arc<AtomicBool>,
}

impl ClientContext for RelayContext {
    fn error(&self, error: KafkaError, reason: &str) {
        if is_all_brokers_down(&error) {
            self.brokers_down.store(true, Ordering::SeqCst);
        }
        error!(error = %error, reason, "Kafka client error");
    }
}

impl ConsumerContext for RelayContext {}

fn is_all_brokers_down(error: &KafkaError) -> bool {
    error.rdkafka_error_code() == Some(RDKafkaErrorCode::AllBrokersDown)
}

/// Kafka consumer source
///
/// Offsets are committed automatically by the client. Loss of all brokers
/// is reported as a fatal event; other consumer errors are transient.
pub struct KafkaSource {
    name: String,
    consumer: StreamConsumer<RelayContext>,
    brokers_down: Arc<AtomicBool>,
}

impl KafkaSource {
    /// Create the consumer and subscribe to the configured topics
    #[instrument(name = "kafka_source_new", skip(config), fields(brokers = %config.brokers))]
    pub fn new(config: &SourceConfig) -> Result<Self, ContractError> {
        let brokers_down = Arc::new(AtomicBool::new(false));
        let context = RelayContext {
            brokers_down: Arc::clone(&brokers_down),
        };

        let consumer: StreamConsumer<RelayContext> = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("broker.address.family", "v4")
            .set("group.id", &config.group)
            .set("session.timeout.ms", "6000")
            .set("auto.offset.reset", "earliest")
            .create_with_context(context)
            .map_err(|e| ContractError::source_connection("kafka", e.to_string()))?;

        let topics: Vec<&str> = config.topics.iter().map(String::as_str).collect();
        consumer
            .subscribe(&topics)
            .map_err(|e| ContractError::source_connection("kafka", e.to_string()))?;

        info!(topics = ?config.topics, group = %config.group, "Kafka consumer subscribed");

        Ok(Self {
            name: format!("kafka:{}", config.group),
            consumer,
            brokers_down,
        })
    }
}

impl MessageSource for KafkaSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn poll(&mut self, timeout: Duration) -> SourceEvent {
        if self.brokers_down.load(Ordering::SeqCst) {
            return SourceEvent::fatal("all brokers are down");
        }

        match tokio::time::timeout(timeout, self.consumer.recv()).await {
            Err(_) => SourceEvent::Idle,
            Ok(Ok(message)) => {
                debug!(
                    topic = message.topic(),
                    partition = message.partition(),
                    offset = message.offset(),
                    "Kafka message received"
                );
                SourceEvent::Record(Bytes::copy_from_slice(message.payload().unwrap_or_default()))
            }
            Ok(Err(e)) if is_all_brokers_down(&e) => SourceEvent::fatal(e.to_string()),
            Ok(Err(e)) => SourceEvent::transient(e.to_string()),
        }
    }

    async fn close(&mut self) -> Result<(), ContractError> {
        self.consumer.unsubscribe();
        info!(source = %self.name, "Kafka consumer closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_brokers_down_detection() {
        let down = KafkaError::MessageConsumption(RDKafkaErrorCode::AllBrokersDown);
        let other = KafkaError::MessageConsumption(RDKafkaErrorCode::BrokerTransportFailure);

        assert!(is_all_brokers_down(&down));
        assert!(!is_all_brokers_down(&other));
    }
}
