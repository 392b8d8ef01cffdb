//! Order persistence for the marketplace order service.
//!
//! This crate owns the persisted order record and every write path to it:
//! - the [`Order`] document with its [`OrderStatus`] state machine
//! - the [`OrderStore`] trait plus in-memory and PostgreSQL implementations
//! - typed [`OrderPatch`] mutations applied atomically per document

pub mod error;
pub mod memory;
pub mod order;
pub mod postgres;
pub mod status;
pub mod store;

pub use common::{BuyerId, Money, OrderId, SellerId};
pub use error::{Result, StoreError};
pub use memory::InMemoryOrderStore;
pub use order::{DeliveredWork, NewOrder, Offer, Order, OrderTimeline, service_fee_for};
pub use postgres::PostgresOrderStore;
pub use status::{OrderStatus, StatusError};
pub use store::{OrderPatch, OrderStore};
