use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{BuyerId, OrderId, SellerId};

use crate::Result;
use crate::order::{DeliveredWork, NewOrder, Order};

/// A typed mutation applied by [`OrderStore::update_by_order_id`].
///
/// Patches replace free-form field updates: every write goes through a
/// validated status transition together with the fields that transition
/// owns, so stores cannot persist contradictory records.
#[derive(Debug, Clone)]
pub enum OrderPatch {
    /// Cancel the order and stamp `approved_at`.
    Cancel { at: DateTime<Utc> },

    /// Approve (complete) the order and stamp `approved_at`.
    Approve { at: DateTime<Utc> },

    /// Record a seller delivery: mark delivered, stamp the delivery
    /// timestamp, and append the delivered file record.
    Deliver {
        delivered: bool,
        at: DateTime<Utc>,
        work: DeliveredWork,
    },
}

/// Core trait for order store implementations.
///
/// The store exclusively owns persisted order state. All implementations
/// must be thread-safe (Send + Sync) and must apply each patch atomically
/// per document.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Looks up a single order by its external id.
    async fn find_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>>;

    /// All orders sold by the given seller, oldest first.
    async fn find_by_seller_id(&self, seller_id: &SellerId) -> Result<Vec<Order>>;

    /// All orders bought by the given buyer, oldest first.
    async fn find_by_buyer_id(&self, buyer_id: &BuyerId) -> Result<Vec<Order>>;

    /// Validates and inserts a new order, computing the service fee and
    /// initializing status and timeline. Fails on blank required fields,
    /// a non-positive price, or a duplicate order id.
    async fn insert(&self, data: NewOrder) -> Result<Order>;

    /// Atomically applies `patch` and returns the post-update record, or
    /// `None` when no order matches `order_id`.
    async fn update_by_order_id(
        &self,
        order_id: &OrderId,
        patch: OrderPatch,
    ) -> Result<Option<Order>>;
}
