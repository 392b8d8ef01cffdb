use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{BuyerId, OrderId, SellerId};
use tokio::sync::RwLock;

use crate::order::{NewOrder, Order};
use crate::store::{OrderPatch, OrderStore};
use crate::{Result, StoreError};

/// In-memory order store implementation for testing.
///
/// Stores all orders in memory behind one lock and provides the same
/// interface as the PostgreSQL implementation; holding the write lock for
/// the whole read-modify-write gives the same per-document atomicity.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of orders stored.
    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }

    /// Clears all orders.
    pub async fn clear(&self) {
        self.orders.write().await.clear();
    }
}

fn by_placement(orders: &mut [Order]) {
    orders.sort_by(|a, b| {
        a.timeline
            .placed
            .cmp(&b.timeline.placed)
            .then_with(|| a.order_id.as_str().cmp(b.order_id.as_str()))
    });
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn find_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.get(order_id).cloned())
    }

    async fn find_by_seller_id(&self, seller_id: &SellerId) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut found: Vec<_> = orders
            .values()
            .filter(|o| &o.seller_id == seller_id)
            .cloned()
            .collect();
        by_placement(&mut found);
        Ok(found)
    }

    async fn find_by_buyer_id(&self, buyer_id: &BuyerId) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut found: Vec<_> = orders
            .values()
            .filter(|o| &o.buyer_id == buyer_id)
            .cloned()
            .collect();
        by_placement(&mut found);
        Ok(found)
    }

    async fn insert(&self, data: NewOrder) -> Result<Order> {
        data.validate()?;

        let mut orders = self.orders.write().await;
        if orders.contains_key(&data.order_id) {
            return Err(StoreError::DuplicateOrder(data.order_id));
        }

        let order = data.into_order(Utc::now());
        orders.insert(order.order_id.clone(), order.clone());
        Ok(order)
    }

    async fn update_by_order_id(
        &self,
        order_id: &OrderId,
        patch: OrderPatch,
    ) -> Result<Option<Order>> {
        let mut orders = self.orders.write().await;
        let Some(order) = orders.get_mut(order_id) else {
            return Ok(None);
        };

        order.apply(&patch)?;
        Ok(Some(order.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{DeliveredWork, Offer};
    use crate::status::OrderStatus;
    use chrono::TimeZone;
    use common::Money;

    fn new_order(order_id: &str, seller_id: &str, buyer_id: &str) -> NewOrder {
        NewOrder {
            order_id: OrderId::new(order_id),
            invoice_id: format!("INV-{order_id}"),
            gig_id: "G1".to_string(),
            seller_id: SellerId::new(seller_id),
            seller_username: "JaneDoe".to_string(),
            buyer_id: BuyerId::new(buyer_id),
            buyer_username: "JohnBuyer".to_string(),
            price: Money::from_dollars(100),
            requirements: "three concepts".to_string(),
            offer: Offer {
                gig_title: "Logo".to_string(),
                description: "A logo design".to_string(),
                delivery_in_days: 3,
                new_delivery_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            },
        }
    }

    fn work(message: &str) -> DeliveredWork {
        DeliveredWork {
            message: message.to_string(),
            file: "s3://bucket/work.zip".to_string(),
            file_type: "application/zip".to_string(),
            file_size: 2048,
            file_name: "work.zip".to_string(),
        }
    }

    #[tokio::test]
    async fn insert_computes_fee_and_initializes_status() {
        let store = InMemoryOrderStore::new();

        let order = store.insert(new_order("O1", "S1", "B1")).await.unwrap();
        assert_eq!(order.status, OrderStatus::Placed);
        assert_eq!(order.service_fee, Money::from_cents(550));
        assert_eq!(order.total(), order.price + order.service_fee);
        assert_eq!(store.order_count().await, 1);
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_order_id() {
        let store = InMemoryOrderStore::new();
        store.insert(new_order("O1", "S1", "B1")).await.unwrap();

        let err = store.insert(new_order("O1", "S2", "B2")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateOrder(_)));
        assert!(err.is_validation());
        assert_eq!(store.order_count().await, 1);
    }

    #[tokio::test]
    async fn insert_rejects_blank_required_field() {
        let store = InMemoryOrderStore::new();
        let mut data = new_order("O1", "S1", "B1");
        data.buyer_username = String::new();

        let err = store.insert(data).await.unwrap_err();
        assert!(matches!(err, StoreError::MissingField("buyerUsername")));
        assert_eq!(store.order_count().await, 0);
    }

    #[tokio::test]
    async fn find_by_order_id() {
        let store = InMemoryOrderStore::new();
        store.insert(new_order("O1", "S1", "B1")).await.unwrap();

        let found = store.find_by_order_id(&OrderId::new("O1")).await.unwrap();
        assert_eq!(found.unwrap().order_id, OrderId::new("O1"));

        let missing = store.find_by_order_id(&OrderId::new("O9")).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn find_by_seller_returns_only_their_orders() {
        let store = InMemoryOrderStore::new();
        store.insert(new_order("O1", "S1", "B1")).await.unwrap();
        store.insert(new_order("O2", "S1", "B2")).await.unwrap();
        store.insert(new_order("O3", "S2", "B1")).await.unwrap();

        let orders = store.find_by_seller_id(&SellerId::new("S1")).await.unwrap();
        assert_eq!(orders.len(), 2);
        assert!(orders.iter().all(|o| o.seller_id == SellerId::new("S1")));

        let orders = store.find_by_buyer_id(&BuyerId::new("B1")).await.unwrap();
        assert_eq!(orders.len(), 2);
    }

    #[tokio::test]
    async fn update_unknown_order_returns_none() {
        let store = InMemoryOrderStore::new();

        let result = store
            .update_by_order_id(&OrderId::new("O9"), OrderPatch::Cancel { at: Utc::now() })
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn update_returns_post_update_record() {
        let store = InMemoryOrderStore::new();
        store.insert(new_order("O1", "S1", "B1")).await.unwrap();

        let now = Utc::now();
        let updated = store
            .update_by_order_id(&OrderId::new("O1"), OrderPatch::Cancel { at: now })
            .await
            .unwrap()
            .unwrap();

        assert!(updated.cancelled());
        assert_eq!(updated.approved_at, Some(now));

        // The returned record is the stored one
        let stored = store
            .find_by_order_id(&OrderId::new("O1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored, updated);
    }

    #[tokio::test]
    async fn deliver_twice_appends_both_entries() {
        let store = InMemoryOrderStore::new();
        store.insert(new_order("O1", "S1", "B1")).await.unwrap();

        for message in ["first draft", "final files"] {
            store
                .update_by_order_id(
                    &OrderId::new("O1"),
                    OrderPatch::Deliver {
                        delivered: true,
                        at: Utc::now(),
                        work: work(message),
                    },
                )
                .await
                .unwrap();
        }

        let order = store
            .find_by_order_id(&OrderId::new("O1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(order.delivered_work.len(), 2);
        assert_eq!(order.delivered_work[0].message, "first draft");
        assert_eq!(order.delivered_work[1].message, "final files");
    }

    #[tokio::test]
    async fn approve_after_delivery_completes_order() {
        let store = InMemoryOrderStore::new();
        store.insert(new_order("O1", "S1", "B1")).await.unwrap();

        store
            .update_by_order_id(
                &OrderId::new("O1"),
                OrderPatch::Deliver {
                    delivered: true,
                    at: Utc::now(),
                    work: work("done"),
                },
            )
            .await
            .unwrap();
        let order = store
            .update_by_order_id(&OrderId::new("O1"), OrderPatch::Approve { at: Utc::now() })
            .await
            .unwrap()
            .unwrap();

        assert_eq!(order.status, OrderStatus::Completed { delivered: true });
        assert!(order.approved());
        assert!(order.delivered());
    }

    #[tokio::test]
    async fn cancel_after_completion_is_rejected() {
        let store = InMemoryOrderStore::new();
        store.insert(new_order("O1", "S1", "B1")).await.unwrap();
        store
            .update_by_order_id(&OrderId::new("O1"), OrderPatch::Approve { at: Utc::now() })
            .await
            .unwrap();

        let err = store
            .update_by_order_id(&OrderId::new("O1"), OrderPatch::Cancel { at: Utc::now() })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Status(_)));

        // Record is untouched
        let order = store
            .find_by_order_id(&OrderId::new("O1"))
            .await
            .unwrap()
            .unwrap();
        assert!(order.approved());
        assert!(!order.cancelled());
    }
}
