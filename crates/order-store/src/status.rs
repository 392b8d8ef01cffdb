//! Order status state machine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The status of an order in its lifecycle.
///
/// Status is a tagged union rather than a free string plus independent
/// boolean flags: each variant names the flag combination it stands for, so
/// contradictory records (a cancelled order that is also completed, a
/// "Delivered" order whose delivered flag is false) cannot be represented.
///
/// Transitions:
/// ```text
/// Placed ───┬──► Cancelled
///           ├──► Delivered{approved: false} ──┬──► Completed{delivered: true}
///           │                                 └──► Cancelled
///           └──► Completed{delivered: false} ───► Delivered{approved: true}
/// ```
/// Delivery re-enters `Delivered` (each delivery appends work); approval of
/// an already-completed order is a no-op. Nothing leaves `Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Order has been placed and work is ongoing.
    #[default]
    Placed,

    /// Order was cancelled (terminal state).
    Cancelled,

    /// The seller has delivered work; `approved` records whether the buyer
    /// had already approved before this delivery.
    Delivered { approved: bool },

    /// The buyer approved the order; `delivered` records whether work had
    /// been delivered by then.
    Completed { delivered: bool },
}

impl OrderStatus {
    /// Cancel transition. Allowed until the buyer has approved the order.
    pub fn cancel(self) -> Result<OrderStatus, StatusError> {
        match self {
            OrderStatus::Placed
            | OrderStatus::Cancelled
            | OrderStatus::Delivered { approved: false } => Ok(OrderStatus::Cancelled),
            OrderStatus::Delivered { approved: true } | OrderStatus::Completed { .. } => {
                Err(self.invalid("cancel"))
            }
        }
    }

    /// Approve transition. Allowed from any state except `Cancelled`.
    pub fn approve(self) -> Result<OrderStatus, StatusError> {
        match self {
            OrderStatus::Placed => Ok(OrderStatus::Completed { delivered: false }),
            OrderStatus::Delivered { .. } => Ok(OrderStatus::Completed { delivered: true }),
            OrderStatus::Completed { delivered } => Ok(OrderStatus::Completed { delivered }),
            OrderStatus::Cancelled => Err(self.invalid("approve")),
        }
    }

    /// Deliver transition. Allowed from any state except `Cancelled`.
    pub fn deliver(self) -> Result<OrderStatus, StatusError> {
        match self {
            OrderStatus::Placed => Ok(OrderStatus::Delivered { approved: false }),
            OrderStatus::Delivered { approved } => Ok(OrderStatus::Delivered { approved }),
            OrderStatus::Completed { .. } => Ok(OrderStatus::Delivered { approved: true }),
            OrderStatus::Cancelled => Err(self.invalid("deliver")),
        }
    }

    /// Returns true if the order was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, OrderStatus::Cancelled)
    }

    /// Returns true if the buyer has approved the order.
    pub fn is_approved(&self) -> bool {
        matches!(
            self,
            OrderStatus::Completed { .. } | OrderStatus::Delivered { approved: true }
        )
    }

    /// Returns true if the seller has delivered work.
    pub fn is_delivered(&self) -> bool {
        matches!(
            self,
            OrderStatus::Delivered { .. } | OrderStatus::Completed { delivered: true }
        )
    }

    /// Returns the status name as persisted and shown to clients.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Placed => "Placed",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Delivered { .. } => "Delivered",
            OrderStatus::Completed { .. } => "Completed",
        }
    }

    /// Reconstructs a status from the persisted name and flag columns,
    /// rejecting combinations no transition can produce.
    pub fn from_flags(
        status: &str,
        cancelled: bool,
        approved: bool,
        delivered: bool,
    ) -> Result<Self, StatusError> {
        match (status, cancelled, approved, delivered) {
            ("Placed", false, false, false) => Ok(OrderStatus::Placed),
            ("Cancelled", true, false, _) => Ok(OrderStatus::Cancelled),
            ("Delivered", false, approved, true) => Ok(OrderStatus::Delivered { approved }),
            ("Completed", false, true, delivered) => Ok(OrderStatus::Completed { delivered }),
            ("Placed" | "Cancelled" | "Delivered" | "Completed", ..) => {
                Err(StatusError::ContradictoryFlags {
                    status: status.to_string(),
                    cancelled,
                    approved,
                    delivered,
                })
            }
            _ => Err(StatusError::UnknownStatus(status.to_string())),
        }
    }

    fn invalid(self, action: &'static str) -> StatusError {
        StatusError::InvalidTransition {
            from: self.as_str(),
            action,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors raised by status transitions and flag reconstruction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusError {
    /// The requested transition is not allowed from the current status.
    #[error("cannot {action} an order in {from} status")]
    InvalidTransition {
        from: &'static str,
        action: &'static str,
    },

    /// The persisted flags contradict the persisted status name.
    #[error(
        "contradictory status flags: status {status}, cancelled={cancelled}, approved={approved}, delivered={delivered}"
    )]
    ContradictoryFlags {
        status: String,
        cancelled: bool,
        approved: bool,
        delivered: bool,
    },

    /// The persisted status name is not one this service writes.
    #[error("unknown order status: {0}")]
    UnknownStatus(String),
}
