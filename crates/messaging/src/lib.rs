//! Outbound event contract and publishers for the marketplace order service.
//!
//! The payload shapes in [`payloads`] are the binding contract other
//! services depend on; [`publisher::EventPublisher`] is the seam the
//! lifecycle service publishes through. Delivery is best-effort: callers
//! treat publish failures as non-fatal and log them.

pub mod destination;
pub mod error;
pub mod kafka;
pub mod payloads;
pub mod publisher;

pub use destination::{BUYER_UPDATE, Destination, ORDER_NOTIFICATION, SELLER_UPDATE};
pub use error::{PublishError, Result};
pub use kafka::KafkaEventPublisher;
pub use payloads::{BuyerUpdate, EmailTemplate, OrderEmail, SellerUpdate, UpdateType};
pub use publisher::{EventPublisher, InMemoryEventPublisher, PublishedMessage};
