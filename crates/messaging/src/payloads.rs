//! Wire payloads for downstream services.
//!
//! These shapes are the binding contract: flat JSON objects with camelCase
//! keys, absent fields omitted. Usernames are lower-cased by the
//! constructors so no payload leaves with mixed casing.

use chrono::{DateTime, Utc};
use common::{BuyerId, Money, OrderId, SellerId};
use order_store::Order;
use serde::{Deserialize, Serialize};

/// Transition tag carried on every user-update payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpdateType {
    CreateOrder,
    CancelOrder,
    ApproveOrder,
    PurchasedGigs,
}

/// Email template the notification service renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EmailTemplate {
    OrderPlaced,
    OrderDelivered,
}

/// Counter update for a seller's profile, consumed by the users service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerUpdate {
    pub seller_id: SellerId,

    #[serde(rename = "type")]
    pub update_type: UpdateType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ongoing_jobs: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_jobs: Option<i64>,

    /// Lifetime earnings in cents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_earnings: Option<Money>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent_delivery: Option<DateTime<Utc>>,
}

impl SellerUpdate {
    /// A new order started: one more ongoing job for the seller.
    pub fn order_created(seller_id: SellerId) -> Self {
        Self {
            seller_id,
            update_type: UpdateType::CreateOrder,
            ongoing_jobs: Some(1),
            completed_jobs: None,
            total_earnings: None,
            recent_delivery: None,
        }
    }

    /// An order was cancelled.
    pub fn order_cancelled(seller_id: SellerId) -> Self {
        Self {
            seller_id,
            update_type: UpdateType::CancelOrder,
            ongoing_jobs: None,
            completed_jobs: None,
            total_earnings: None,
            recent_delivery: None,
        }
    }

    /// An order was approved: forwarded seller counters stamped with a
    /// fresh delivery time.
    pub fn order_approved(
        seller_id: SellerId,
        ongoing_jobs: i64,
        completed_jobs: i64,
        total_earnings: Money,
        recent_delivery: DateTime<Utc>,
    ) -> Self {
        Self {
            seller_id,
            update_type: UpdateType::ApproveOrder,
            ongoing_jobs: Some(ongoing_jobs),
            completed_jobs: Some(completed_jobs),
            total_earnings: Some(total_earnings),
            recent_delivery: Some(recent_delivery),
        }
    }
}

/// Purchase update for a buyer's profile, consumed by the users service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerUpdate {
    pub buyer_id: BuyerId,

    #[serde(rename = "type")]
    pub update_type: UpdateType,

    /// Gig ids in the buyer's purchased list after this transition.
    pub purchased_gigs: Vec<String>,
}

impl BuyerUpdate {
    /// An order was cancelled.
    pub fn order_cancelled(buyer_id: BuyerId, purchased_gigs: Vec<String>) -> Self {
        Self {
            buyer_id,
            update_type: UpdateType::CancelOrder,
            purchased_gigs,
        }
    }

    /// An order was approved and counts toward the buyer's purchases.
    pub fn gigs_purchased(buyer_id: BuyerId, purchased_gigs: Vec<String>) -> Self {
        Self {
            buyer_id,
            update_type: UpdateType::PurchasedGigs,
            purchased_gigs,
        }
    }
}

/// A transactional email about an order, rendered by the notification
/// service according to `template`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderEmail {
    pub order_id: OrderId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_due: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,

    /// Always lower-cased.
    pub buyer_username: String,

    /// Always lower-cased.
    pub seller_username: String,

    pub title: String,
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_fee: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<String>,

    /// Deep link to the order's activity page in the client application.
    pub order_url: String,

    pub template: EmailTemplate,
}

impl OrderEmail {
    /// Receipt email for a freshly placed order.
    pub fn order_placed(order: &Order, order_url: impl Into<String>) -> Self {
        Self {
            order_id: order.order_id.clone(),
            invoice_id: Some(order.invoice_id.clone()),
            order_due: Some(order.offer.new_delivery_date),
            amount: Some(order.price.to_string()),
            buyer_username: order.buyer_username.to_lowercase(),
            seller_username: order.seller_username.to_lowercase(),
            title: order.offer.gig_title.clone(),
            description: order.offer.description.clone(),
            requirements: Some(order.requirements.clone()),
            service_fee: Some(order.service_fee.to_string()),
            total: Some(order.total().to_string()),
            order_url: order_url.into(),
            template: EmailTemplate::OrderPlaced,
        }
    }

    /// Delivery email telling the buyer new work has arrived.
    pub fn order_delivered(order: &Order, order_url: impl Into<String>) -> Self {
        Self {
            order_id: order.order_id.clone(),
            invoice_id: None,
            order_due: None,
            amount: None,
            buyer_username: order.buyer_username.to_lowercase(),
            seller_username: order.seller_username.to_lowercase(),
            title: order.offer.gig_title.clone(),
            description: order.offer.description.clone(),
            requirements: None,
            service_fee: None,
            total: None,
            order_url: order_url.into(),
            template: EmailTemplate::OrderDelivered,
        }
    }
}
