//! Kafka-backed publisher.

use std::time::Duration;

use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;

use crate::destination::Destination;
use crate::error::{PublishError, Result};
use crate::publisher::EventPublisher;

/// Publisher backed by a Kafka-compatible broker.
///
/// Exchanges map to topics and routing keys to record keys. Sends are
/// bounded by the producer's message timeout, so a dead broker surfaces as
/// an error instead of hanging the transition.
#[derive(Clone)]
pub struct KafkaEventPublisher {
    producer: FutureProducer,
}

impl KafkaEventPublisher {
    /// Connects a producer to `brokers` (comma-separated `host:port` list).
    pub fn new(brokers: &str) -> Result<Self> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()
            .map_err(|e| PublishError::Unavailable(e.to_string()))?;

        Ok(Self { producer })
    }
}

#[async_trait]
impl EventPublisher for KafkaEventPublisher {
    async fn publish(
        &self,
        destination: Destination,
        payload: serde_json::Value,
        log_label: &str,
    ) -> Result<()> {
        let body = serde_json::to_string(&payload)?;
        let record = FutureRecord::to(destination.exchange)
            .key(destination.routing_key)
            .payload(&body);

        match self
            .producer
            .send(record, Timeout::After(Duration::from_secs(5)))
            .await
        {
            Ok(_) => {
                tracing::info!(
                    exchange = destination.exchange,
                    routing_key = destination.routing_key,
                    "{log_label}"
                );
                Ok(())
            }
            Err((e, _)) => {
                tracing::error!(
                    error = %e,
                    exchange = destination.exchange,
                    routing_key = destination.routing_key,
                    "event publish failed"
                );
                Err(PublishError::Rejected {
                    exchange: destination.exchange.to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }
}
