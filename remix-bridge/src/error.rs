//! Error types for bridge transport operations.

use std::time::Duration;

use thiserror::Error;

/// Result type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Errors that can occur on the host side of a bridge connection.
///
/// The document side never fails: unknown targets and malformed messages are
/// ignored there.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The other side of the channel has gone away.
    #[error("Bridge channel closed")]
    Closed,

    /// No response arrived within the caller's deadline.
    #[error("No response within {0:?}")]
    Timeout(Duration),

    /// Message serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The document task panicked or was aborted.
    #[error("Bridge task failed: {0}")]
    TaskFailed(String),
}
