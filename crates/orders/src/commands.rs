//! Inbound transition commands.
//!
//! Field sets mirror the messages callers send alongside a transition.
//! Creation takes [`order_store::NewOrder`] directly; delivery takes the
//! delivered flag and file record as arguments.

use common::{BuyerId, Money, SellerId};
use serde::{Deserialize, Serialize};

/// Caller-supplied data accompanying a cancellation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelOrder {
    pub seller_id: SellerId,
    pub buyer_id: BuyerId,

    /// Gig ids remaining in the buyer's purchased list.
    pub purchased_gigs: Vec<String>,
}

/// Caller-supplied data accompanying an approval.
///
/// The seller counters are forwarded to the users service as-is; this
/// service does not recompute them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveOrder {
    pub seller_id: SellerId,
    pub buyer_id: BuyerId,
    pub ongoing_jobs: i64,
    pub completed_jobs: i64,

    /// Seller lifetime earnings in cents.
    pub total_earnings: Money,

    /// Gig ids in the buyer's purchased list after this approval.
    pub purchased_gigs: Vec<String>,
}
