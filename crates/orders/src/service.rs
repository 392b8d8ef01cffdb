//! The order lifecycle orchestrator.

use chrono::Utc;
use common::{BuyerId, OrderId, SellerId};
use messaging::{
    BUYER_UPDATE, BuyerUpdate, Destination, EventPublisher, ORDER_NOTIFICATION, OrderEmail,
    SELLER_UPDATE, SellerUpdate,
};
use order_store::{DeliveredWork, NewOrder, Order, OrderPatch, OrderStore};
use serde::Serialize;

use crate::commands::{ApproveOrder, CancelOrder};
use crate::config::OrdersConfig;
use crate::error::{OrderError, Result};
use crate::notification::NotificationDispatcher;

/// Orchestrates order state transitions and their downstream fan-out.
///
/// The service is stateless: every call goes through the injected store, so
/// concurrent invocations for distinct order ids never interact. Within one
/// transition the steps are strictly ordered — the committed record is read
/// back before any event is published, because payloads carry store-computed
/// fields — and each side effect is awaited before the next is attempted.
///
/// A transition either fully succeeds (mutation plus best-effort side
/// effects) or fails before any mutation is committed. Side effects are
/// never rolled back: a failed publish is logged and counted, and the
/// remaining effects still run.
pub struct OrderLifecycleService<S, P, N>
where
    S: OrderStore,
    P: EventPublisher,
    N: NotificationDispatcher,
{
    store: S,
    publisher: P,
    notifier: N,
    config: OrdersConfig,
}

impl<S, P, N> OrderLifecycleService<S, P, N>
where
    S: OrderStore,
    P: EventPublisher,
    N: NotificationDispatcher,
{
    /// Creates a new lifecycle service with injected collaborators.
    pub fn new(store: S, publisher: P, notifier: N, config: OrdersConfig) -> Self {
        Self {
            store,
            publisher,
            notifier,
            config,
        }
    }

    /// Looks up a single order by its external id.
    #[tracing::instrument(skip(self))]
    pub async fn get_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>> {
        Ok(self.store.find_by_order_id(order_id).await?)
    }

    /// All orders sold by the given seller, oldest first.
    #[tracing::instrument(skip(self))]
    pub async fn get_orders_by_seller_id(&self, seller_id: &SellerId) -> Result<Vec<Order>> {
        Ok(self.store.find_by_seller_id(seller_id).await?)
    }

    /// All orders bought by the given buyer, oldest first.
    #[tracing::instrument(skip(self))]
    pub async fn get_orders_by_buyer_id(&self, buyer_id: &BuyerId) -> Result<Vec<Order>> {
        Ok(self.store.find_by_buyer_id(buyer_id).await?)
    }

    /// Creates a new order.
    ///
    /// After the insert commits, in order: publishes a seller-update
    /// (`create-order`, one more ongoing job), publishes the `orderPlaced`
    /// receipt email, and notifies the seller. Returns the persisted order
    /// including the store-computed service fee.
    #[tracing::instrument(skip(self, data), fields(order_id = %data.order_id))]
    pub async fn create_order(&self, data: NewOrder) -> Result<Order> {
        let order = self.store.insert(data).await?;
        metrics::counter!("orders_created_total").increment(1);

        self.attempt_publish(
            SELLER_UPDATE,
            &SellerUpdate::order_created(order.seller_id.clone()),
            "order details sent to users service",
        )
        .await;

        self.attempt_publish(
            ORDER_NOTIFICATION,
            &OrderEmail::order_placed(&order, self.config.order_activity_url(&order.order_id)),
            "order receipt sent to notification service",
        )
        .await;

        self.notify(&order, &order.seller_username, "placed an order for your gig.")
            .await;

        Ok(order)
    }

    /// Cancels an order.
    ///
    /// Fails with [`OrderError::NotFound`] when the id is unknown; nothing
    /// is published in that case. Otherwise both user updates are attempted
    /// independently, tagged `cancel-order`, and the seller named on the
    /// persisted record (not in the caller data) is notified.
    #[tracing::instrument(skip(self, data))]
    pub async fn cancel_order(&self, order_id: &OrderId, data: CancelOrder) -> Result<Order> {
        let order = self
            .store
            .update_by_order_id(order_id, OrderPatch::Cancel { at: Utc::now() })
            .await?
            .ok_or_else(|| OrderError::NotFound(order_id.clone()))?;
        metrics::counter!("orders_cancelled_total").increment(1);

        self.attempt_publish(
            SELLER_UPDATE,
            &SellerUpdate::order_cancelled(data.seller_id),
            "cancelled order details sent to users service",
        )
        .await;

        self.attempt_publish(
            BUYER_UPDATE,
            &BuyerUpdate::order_cancelled(data.buyer_id, data.purchased_gigs),
            "cancelled order details sent to users service",
        )
        .await;

        self.notify(&order, &order.seller_username, "cancelled your order delivery.")
            .await;

        Ok(order)
    }

    /// Approves an order, completing it.
    ///
    /// The seller-update forwards the caller-supplied counters and stamps a
    /// fresh `recentDelivery` time; the buyer-update is tagged
    /// `purchased-gigs`. Fails with [`OrderError::NotFound`] when the id is
    /// unknown.
    #[tracing::instrument(skip(self, data))]
    pub async fn approve_order(&self, order_id: &OrderId, data: ApproveOrder) -> Result<Order> {
        let order = self
            .store
            .update_by_order_id(order_id, OrderPatch::Approve { at: Utc::now() })
            .await?
            .ok_or_else(|| OrderError::NotFound(order_id.clone()))?;
        metrics::counter!("orders_approved_total").increment(1);

        self.attempt_publish(
            SELLER_UPDATE,
            &SellerUpdate::order_approved(
                data.seller_id,
                data.ongoing_jobs,
                data.completed_jobs,
                data.total_earnings,
                Utc::now(),
            ),
            "approved order details sent to users service",
        )
        .await;

        self.attempt_publish(
            BUYER_UPDATE,
            &BuyerUpdate::gigs_purchased(data.buyer_id, data.purchased_gigs),
            "approved order details sent to users service",
        )
        .await;

        self.notify(&order, &order.seller_username, "approved your order delivery.")
            .await;

        Ok(order)
    }

    /// Records a seller delivery: marks the order delivered, stamps the
    /// delivery timestamp, and appends `work` to the delivered files.
    ///
    /// Returns `Ok(None)` with zero side effects when no order matches —
    /// unlike cancel and approve, an unknown id here is not an error.
    #[tracing::instrument(skip(self, work))]
    pub async fn seller_deliver_order(
        &self,
        order_id: &OrderId,
        delivered: bool,
        work: DeliveredWork,
    ) -> Result<Option<Order>> {
        let Some(order) = self
            .store
            .update_by_order_id(
                order_id,
                OrderPatch::Deliver {
                    delivered,
                    at: Utc::now(),
                    work,
                },
            )
            .await?
        else {
            return Ok(None);
        };
        metrics::counter!("orders_delivered_total").increment(1);

        self.attempt_publish(
            ORDER_NOTIFICATION,
            &OrderEmail::order_delivered(&order, self.config.order_activity_url(order_id)),
            "order delivered message sent to notification service",
        )
        .await;

        self.notify(&order, &order.buyer_username, "delivered your order.")
            .await;

        Ok(Some(order))
    }

    /// Attempts one effect from a transition's ordered effect list.
    ///
    /// Failures are logged with the effect's label and counted, never
    /// propagated: the mutation is already committed and the remaining
    /// effects must still be attempted.
    async fn attempt_publish<T: Serialize>(
        &self,
        destination: Destination,
        payload: &T,
        log_label: &str,
    ) {
        let value = match serde_json::to_value(payload) {
            Ok(value) => value,
            Err(e) => {
                metrics::counter!("order_events_publish_failures_total").increment(1);
                tracing::error!(
                    error = %e,
                    exchange = destination.exchange,
                    log_label,
                    "event payload serialization failed"
                );
                return;
            }
        };

        match self.publisher.publish(destination, value, log_label).await {
            Ok(()) => {
                metrics::counter!("order_events_published_total").increment(1);
            }
            Err(e) => {
                metrics::counter!("order_events_publish_failures_total").increment(1);
                tracing::error!(
                    error = %e,
                    exchange = destination.exchange,
                    routing_key = destination.routing_key,
                    log_label,
                    "event publish failed"
                );
            }
        }
    }

    async fn notify(&self, order: &Order, target_username: &str, message: &str) {
        if let Err(e) = self.notifier.notify(order, target_username, message).await {
            tracing::warn!(
                error = %e,
                order_id = %order.order_id,
                "notification dispatch failed"
            );
        }
    }
}
