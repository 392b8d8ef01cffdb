//! Notification dispatcher trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::OrderId;
use order_store::Order;
use thiserror::Error;

/// Converts an order, a target user, and a verb phrase into a user-facing
/// notification.
///
/// Fire-and-forget from the lifecycle service's point of view: the service
/// logs failures and never surfaces them to callers.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Sends `message` about `order` to `target_username`'s inbox.
    async fn notify(
        &self,
        order: &Order,
        target_username: &str,
        message: &str,
    ) -> Result<(), NotifyError>;
}

/// Notification dispatch failure. Never fatal to a transition.
#[derive(Debug, Error)]
#[error("notification dispatch failed: {0}")]
pub struct NotifyError(pub String);

/// A notification captured by [`InMemoryNotificationDispatcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotification {
    pub order_id: OrderId,
    pub target_username: String,
    pub message: String,
}

#[derive(Debug, Default)]
struct InMemoryDispatcherState {
    sent: Vec<SentNotification>,
    fail_on_notify: bool,
}

/// In-memory notification dispatcher for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotificationDispatcher {
    state: Arc<RwLock<InMemoryDispatcherState>>,
}

impl InMemoryNotificationDispatcher {
    /// Creates a new in-memory dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the dispatcher to fail every notify call.
    pub fn set_fail_on_notify(&self, fail: bool) {
        self.state.write().unwrap().fail_on_notify = fail;
    }

    /// Returns the number of captured notifications.
    pub fn sent_count(&self) -> usize {
        self.state.read().unwrap().sent.len()
    }

    /// All captured notifications, in dispatch order.
    pub fn sent(&self) -> Vec<SentNotification> {
        self.state.read().unwrap().sent.clone()
    }
}

#[async_trait]
impl NotificationDispatcher for InMemoryNotificationDispatcher {
    async fn notify(
        &self,
        order: &Order,
        target_username: &str,
        message: &str,
    ) -> Result<(), NotifyError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_notify {
            return Err(NotifyError("notification service offline".to_string()));
        }

        state.sent.push(SentNotification {
            order_id: order.order_id.clone(),
            target_username: target_username.to_string(),
            message: message.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use common::{BuyerId, Money, SellerId};
    use order_store::{Offer, OrderStatus, OrderTimeline, service_fee_for};

    fn sample_order() -> Order {
        let price = Money::from_dollars(60);
        Order {
            order_id: OrderId::new("O1"),
            invoice_id: "INV-O1".to_string(),
            gig_id: "G1".to_string(),
            seller_id: SellerId::new("S1"),
            seller_username: "janedoe".to_string(),
            buyer_id: BuyerId::new("B1"),
            buyer_username: "johnbuyer".to_string(),
            price,
            service_fee: service_fee_for(price),
            requirements: String::new(),
            offer: Offer {
                gig_title: "Logo".to_string(),
                description: "A logo design".to_string(),
                delivery_in_days: 3,
                new_delivery_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            },
            status: OrderStatus::Placed,
            approved_at: None,
            timeline: OrderTimeline {
                placed: Utc.with_ymd_and_hms(2023, 12, 20, 12, 0, 0).unwrap(),
                order_delivered: None,
            },
            delivered_work: Vec::new(),
        }
    }

    #[tokio::test]
    async fn captures_notifications() {
        let dispatcher = InMemoryNotificationDispatcher::new();
        let order = sample_order();

        dispatcher
            .notify(&order, "janedoe", "placed an order for your gig.")
            .await
            .unwrap();

        let sent = dispatcher.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].order_id, OrderId::new("O1"));
        assert_eq!(sent[0].target_username, "janedoe");
        assert_eq!(sent[0].message, "placed an order for your gig.");
    }

    #[tokio::test]
    async fn fail_on_notify_captures_nothing() {
        let dispatcher = InMemoryNotificationDispatcher::new();
        dispatcher.set_fail_on_notify(true);

        let result = dispatcher.notify(&sample_order(), "janedoe", "hello").await;
        assert!(result.is_err());
        assert_eq!(dispatcher.sent_count(), 0);
    }
}
