//! Shared types for the marketplace order service.
//!
//! Identifier newtypes keep seller, buyer, and order ids from being mixed
//! up at call sites; [`Money`] carries amounts as integer cents.

pub mod types;

pub use types::{BuyerId, Money, OrderId, SellerId};
