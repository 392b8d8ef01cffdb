//! Lifecycle service error types.

use common::OrderId;
use order_store::StoreError;
use thiserror::Error;

/// Errors surfaced to callers of the lifecycle service.
///
/// Publish and notification failures are deliberately absent: the mutation
/// is already committed when side effects run, so those failures are logged
/// and swallowed instead of failing the transition.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The transition targeted an unknown order id.
    #[error("order not found: {0}")]
    NotFound(OrderId),

    /// The order store rejected or failed the operation.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A serialization error occurred.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for lifecycle operations.
pub type Result<T> = std::result::Result<T, OrderError>;
