use thiserror::Error;

/// Errors that can occur when publishing an event.
///
/// Publishing is best-effort: the lifecycle service logs these and carries
/// on, so no variant here ever aborts a transition.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The broker rejected or timed out the publish.
    #[error("broker rejected publish to {exchange}: {reason}")]
    Rejected { exchange: String, reason: String },

    /// The broker is unreachable.
    #[error("broker unavailable: {0}")]
    Unavailable(String),

    /// The payload could not be serialized.
    #[error("payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for publish operations.
pub type Result<T> = std::result::Result<T, PublishError>;
