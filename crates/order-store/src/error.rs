use common::{Money, OrderId};
use thiserror::Error;

use crate::status::StatusError;

/// Errors that can occur when interacting with the order store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A required field was blank on insert.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The order price must be positive.
    #[error("price must be positive, got {0}")]
    InvalidPrice(Money),

    /// An order with this id already exists.
    #[error("order {0} already exists")]
    DuplicateOrder(OrderId),

    /// A status transition was rejected or a persisted record carried
    /// contradictory status flags.
    #[error(transparent)]
    Status(#[from] StatusError),

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// True for input-validation failures on create (missing fields, bad
    /// price, duplicate order id), as opposed to infrastructure failures.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            StoreError::MissingField(_)
                | StoreError::InvalidPrice(_)
                | StoreError::DuplicateOrder(_)
        )
    }
}

/// Result type for order store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
