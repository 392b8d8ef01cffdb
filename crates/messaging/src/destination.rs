//! Named publish targets.

/// A publish target: the exchange other services bind to and the routing
/// key within it. On brokers without exchanges the pair maps to topic and
/// record key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Destination {
    pub exchange: &'static str,
    pub routing_key: &'static str,
}

/// Seller counter updates consumed by the users service.
pub const SELLER_UPDATE: Destination = Destination {
    exchange: "marketplace-seller-update",
    routing_key: "user-seller",
};

/// Buyer purchase updates consumed by the users service.
pub const BUYER_UPDATE: Destination = Destination {
    exchange: "marketplace-buyer-update",
    routing_key: "user-buyer",
};

/// Transactional order emails rendered by the notification service.
pub const ORDER_NOTIFICATION: Destination = Destination {
    exchange: "marketplace-order-notification",
    routing_key: "order-email",
};
