//! Publisher trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::destination::Destination;
use crate::error::{PublishError, Result};

/// Reliable fire-and-forget dispatch of structured messages to named
/// destinations.
///
/// Delivery is best-effort and asynchronous; the broker's own guarantees
/// are outside this contract. All implementations must be thread-safe
/// (Send + Sync).
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publishes `payload` to `destination`.
    ///
    /// `log_label` describes the effect for operator-facing logs (for
    /// example "order details sent to users service").
    async fn publish(
        &self,
        destination: Destination,
        payload: serde_json::Value,
        log_label: &str,
    ) -> Result<()>;
}

/// A message captured by [`InMemoryEventPublisher`].
#[derive(Debug, Clone)]
pub struct PublishedMessage {
    pub exchange: &'static str,
    pub routing_key: &'static str,
    pub payload: serde_json::Value,
    pub log_label: String,
}

#[derive(Debug, Default)]
struct InMemoryPublisherState {
    messages: Vec<PublishedMessage>,
    fail_on_publish: bool,
}

/// In-memory publisher for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventPublisher {
    state: Arc<RwLock<InMemoryPublisherState>>,
}

impl InMemoryEventPublisher {
    /// Creates a new in-memory publisher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the publisher to fail every publish call.
    pub fn set_fail_on_publish(&self, fail: bool) {
        self.state.write().unwrap().fail_on_publish = fail;
    }

    /// Returns the number of captured messages.
    pub fn published_count(&self) -> usize {
        self.state.read().unwrap().messages.len()
    }

    /// All captured messages, in publish order.
    pub fn published(&self) -> Vec<PublishedMessage> {
        self.state.read().unwrap().messages.clone()
    }

    /// Captured messages sent to the given exchange, in publish order.
    pub fn published_to(&self, exchange: &str) -> Vec<PublishedMessage> {
        self.state
            .read()
            .unwrap()
            .messages
            .iter()
            .filter(|m| m.exchange == exchange)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventPublisher {
    async fn publish(
        &self,
        destination: Destination,
        payload: serde_json::Value,
        log_label: &str,
    ) -> Result<()> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_publish {
            return Err(PublishError::Unavailable("broker offline".to_string()));
        }

        state.messages.push(PublishedMessage {
            exchange: destination.exchange,
            routing_key: destination.routing_key,
            payload,
            log_label: log_label.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::destination::{BUYER_UPDATE, SELLER_UPDATE};

    #[tokio::test]
    async fn captures_messages_in_order() {
        let publisher = InMemoryEventPublisher::new();

        publisher
            .publish(SELLER_UPDATE, serde_json::json!({"n": 1}), "first")
            .await
            .unwrap();
        publisher
            .publish(BUYER_UPDATE, serde_json::json!({"n": 2}), "second")
            .await
            .unwrap();

        let messages = publisher.published();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].exchange, "marketplace-seller-update");
        assert_eq!(messages[0].routing_key, "user-seller");
        assert_eq!(messages[0].log_label, "first");
        assert_eq!(messages[1].payload, serde_json::json!({"n": 2}));

        assert_eq!(publisher.published_to("marketplace-buyer-update").len(), 1);
    }

    #[tokio::test]
    async fn fail_on_publish_captures_nothing() {
        let publisher = InMemoryEventPublisher::new();
        publisher.set_fail_on_publish(true);

        let result = publisher
            .publish(SELLER_UPDATE, serde_json::json!({}), "doomed")
            .await;
        assert!(matches!(result, Err(PublishError::Unavailable(_))));
        assert_eq!(publisher.published_count(), 0);

        publisher.set_fail_on_publish(false);
        publisher
            .publish(SELLER_UPDATE, serde_json::json!({}), "ok")
            .await
            .unwrap();
        assert_eq!(publisher.published_count(), 1);
    }
}
