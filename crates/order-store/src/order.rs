//! The persisted order document.

use chrono::{DateTime, Utc};
use common::{BuyerId, Money, OrderId, SellerId};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::status::{OrderStatus, StatusError};
use crate::store::OrderPatch;

/// The offer terms the buyer accepted when placing the order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    /// Title of the purchased gig.
    pub gig_title: String,

    /// Description of the purchased gig.
    pub description: String,

    /// Agreed delivery window in days.
    pub delivery_in_days: u32,

    /// Due date for the delivery.
    pub new_delivery_date: DateTime<Utc>,
}

/// A file record attached to a seller delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveredWork {
    /// Message from the seller accompanying the delivery.
    pub message: String,

    /// Location of the delivered file.
    pub file: String,

    /// MIME type of the delivered file.
    pub file_type: String,

    /// Size of the delivered file in bytes.
    pub file_size: i64,

    /// Original file name.
    pub file_name: String,
}

/// Timestamps recorded over an order's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTimeline {
    /// When the order was placed.
    pub placed: DateTime<Utc>,

    /// When the seller last delivered work, if ever.
    pub order_delivered: Option<DateTime<Utc>>,
}

/// Input for creating a new order.
///
/// Identity fields come from the caller; the store computes the service fee
/// and initializes status and timeline on insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub order_id: OrderId,
    pub invoice_id: String,
    pub gig_id: String,
    pub seller_id: SellerId,
    pub seller_username: String,
    pub buyer_id: BuyerId,
    pub buyer_username: String,
    pub price: Money,
    pub requirements: String,
    pub offer: Offer,
}

impl NewOrder {
    pub(crate) fn validate(&self) -> Result<()> {
        require("orderId", self.order_id.as_str())?;
        require("invoiceId", &self.invoice_id)?;
        require("gigId", &self.gig_id)?;
        require("sellerId", self.seller_id.as_str())?;
        require("sellerUsername", &self.seller_username)?;
        require("buyerId", self.buyer_id.as_str())?;
        require("buyerUsername", &self.buyer_username)?;
        if !self.price.is_positive() {
            return Err(StoreError::InvalidPrice(self.price));
        }
        Ok(())
    }

    pub(crate) fn into_order(self, placed_at: DateTime<Utc>) -> Order {
        let service_fee = service_fee_for(self.price);
        Order {
            order_id: self.order_id,
            invoice_id: self.invoice_id,
            gig_id: self.gig_id,
            seller_id: self.seller_id,
            seller_username: self.seller_username,
            buyer_id: self.buyer_id,
            buyer_username: self.buyer_username,
            price: self.price,
            service_fee,
            requirements: self.requirements,
            offer: self.offer,
            status: OrderStatus::Placed,
            approved_at: None,
            timeline: OrderTimeline {
                placed: placed_at,
                order_delivered: None,
            },
            delivered_work: Vec::new(),
        }
    }
}

fn require(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(StoreError::MissingField(field));
    }
    Ok(())
}

/// Store-computed service fee: 5.5% of the price, rounded to the cent, plus
/// a flat $2 for orders under $50.
pub fn service_fee_for(price: Money) -> Money {
    let fee = Money::from_cents((price.cents() * 55 + 500) / 1000);
    if price < Money::from_dollars(50) {
        fee + Money::from_dollars(2)
    } else {
        fee
    }
}

/// A marketplace order: one purchased gig between a seller and a buyer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: OrderId,
    pub invoice_id: String,
    pub gig_id: String,
    pub seller_id: SellerId,
    pub seller_username: String,
    pub buyer_id: BuyerId,
    pub buyer_username: String,
    pub price: Money,
    /// Computed by the store on insert, never supplied by callers.
    pub service_fee: Money,
    pub requirements: String,
    pub offer: Offer,
    pub status: OrderStatus,
    pub approved_at: Option<DateTime<Utc>>,
    pub timeline: OrderTimeline,
    /// Append-only: deliveries add entries, nothing removes them.
    pub delivered_work: Vec<DeliveredWork>,
}

impl Order {
    /// Price plus the store-computed service fee.
    pub fn total(&self) -> Money {
        self.price + self.service_fee
    }

    /// Returns true if the order was cancelled.
    pub fn cancelled(&self) -> bool {
        self.status.is_cancelled()
    }

    /// Returns true if the buyer approved the order.
    pub fn approved(&self) -> bool {
        self.status.is_approved()
    }

    /// Returns true if the seller delivered work.
    pub fn delivered(&self) -> bool {
        self.status.is_delivered()
    }

    /// Applies a typed patch in place.
    ///
    /// The status transition is validated first; on rejection nothing is
    /// mutated, so stores can apply patches directly to their records.
    pub fn apply(&mut self, patch: &OrderPatch) -> std::result::Result<(), StatusError> {
        match patch {
            OrderPatch::Cancel { at } => {
                self.status = self.status.cancel()?;
                self.approved_at = Some(*at);
            }
            OrderPatch::Approve { at } => {
                self.status = self.status.approve()?;
                self.approved_at = Some(*at);
            }
            OrderPatch::Deliver {
                delivered,
                at,
                work,
            } => {
                if !*delivered {
                    // A delivery that does not mark the order delivered is the
                    // contradictory record the status union exists to forbid.
                    return Err(StatusError::ContradictoryFlags {
                        status: "Delivered".to_string(),
                        cancelled: self.status.is_cancelled(),
                        approved: self.status.is_approved(),
                        delivered: false,
                    });
                }
                self.status = self.status.deliver()?;
                self.timeline.order_delivered = Some(*at);
                self.delivered_work.push(work.clone());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_new_order() -> NewOrder {
        NewOrder {
            order_id: OrderId::new("O1"),
            invoice_id: "INV-O1".to_string(),
            gig_id: "G1".to_string(),
            seller_id: SellerId::new("S1"),
            seller_username: "JaneDoe".to_string(),
            buyer_id: BuyerId::new("B1"),
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

    #[test]
    fn service_fee_above_threshold() {
        // 5.5% of $100
        assert_eq!(service_fee_for(Money::from_dollars(100)), Money::from_cents(550));
    }

    #[test]
    fn service_fee_below_threshold_adds_flat_fee() {
        // 5.5% of $20 + $2
        assert_eq!(service_fee_for(Money::from_dollars(20)), Money::from_cents(310));
    }

    #[test]
    fn service_fee_rounds_to_nearest_cent() {
        // 5.5% of $99.99 = 549.945 cents, rounds to 550
        assert_eq!(service_fee_for(Money::from_cents(9999)), Money::from_cents(550));
    }

    #[test]
    fn into_order_initializes_lifecycle_fields() {
        let now = Utc::now();
        let order = sample_new_order().into_order(now);

        assert_eq!(order.status, OrderStatus::Placed);
        assert_eq!(order.service_fee, Money::from_cents(550));
        assert_eq!(order.total(), Money::from_cents(10550));
        assert_eq!(order.timeline.placed, now);
        assert!(order.approved_at.is_none());
        assert!(order.delivered_work.is_empty());
    }

    #[test]
    fn validate_rejects_blank_fields() {
        let mut data = sample_new_order();
        data.seller_username = "  ".to_string();
        assert!(matches!(
            data.validate(),
            Err(StoreError::MissingField("sellerUsername"))
        ));
    }

    #[test]
    fn validate_rejects_non_positive_price() {
        let mut data = sample_new_order();
        data.price = Money::zero();
        assert!(matches!(data.validate(), Err(StoreError::InvalidPrice(_))));
    }

    #[test]
    fn apply_cancel_stamps_approved_at() {
        let now = Utc::now();
        let mut order = sample_new_order().into_order(now);

        order.apply(&OrderPatch::Cancel { at: now }).unwrap();
        assert!(order.cancelled());
        assert_eq!(order.status.as_str(), "Cancelled");
        assert_eq!(order.approved_at, Some(now));
    }

    #[test]
    fn apply_deliver_appends_work() {
        let now = Utc::now();
        let mut order = sample_new_order().into_order(now);
        let work = DeliveredWork {
            message: "first draft".to_string(),
            file: "s3://bucket/draft.zip".to_string(),
            file_type: "application/zip".to_string(),
            file_size: 1024,
            file_name: "draft.zip".to_string(),
        };

        order
            .apply(&OrderPatch::Deliver {
                delivered: true,
                at: now,
                work: work.clone(),
            })
            .unwrap();
        order
            .apply(&OrderPatch::Deliver {
                delivered: true,
                at: now,
                work: work.clone(),
            })
            .unwrap();

        assert_eq!(order.delivered_work.len(), 2);
        assert_eq!(order.timeline.order_delivered, Some(now));
        assert!(order.delivered());
    }

    #[test]
    fn apply_deliver_rejects_unset_flag() {
        let now = Utc::now();
        let mut order = sample_new_order().into_order(now);
        let work = DeliveredWork {
            message: String::new(),
            file: String::new(),
            file_type: String::new(),
            file_size: 0,
            file_name: String::new(),
        };

        let err = order
            .apply(&OrderPatch::Deliver {
                delivered: false,
                at: now,
                work,
            })
            .unwrap_err();
        assert!(matches!(err, StatusError::ContradictoryFlags { .. }));
        assert_eq!(order.status, OrderStatus::Placed);
        assert!(order.delivered_work.is_empty());
    }

    #[test]
    fn apply_rejected_transition_leaves_order_untouched() {
        let now = Utc::now();
        let mut order = sample_new_order().into_order(now);
        order.apply(&OrderPatch::Approve { at: now }).unwrap();

        let before = order.clone();
        assert!(order.apply(&OrderPatch::Cancel { at: now }).is_err());
        assert_eq!(order, before);
    }
}
