//! Order lifecycle orchestration for the marketplace order service.
//!
//! [`OrderLifecycleService`] drives each transition (create, cancel,
//! approve, deliver): it mutates the order store, then fans the change out
//! as domain events and a user-facing notification. The store, publisher,
//! and notification dispatcher are injected at construction.

pub mod commands;
pub mod config;
pub mod error;
pub mod notification;
pub mod service;

pub use commands::{ApproveOrder, CancelOrder};
pub use config::OrdersConfig;
pub use error::{OrderError, Result};
pub use notification::{
    InMemoryNotificationDispatcher, NotificationDispatcher, NotifyError, SentNotification,
};
pub use service::OrderLifecycleService;
