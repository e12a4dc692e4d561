//! Error types for messenger operations.

use thiserror::Error;

/// Errors reported by a [`Messenger`](crate::Messenger) implementation.
#[derive(Debug, Error)]
pub enum BotError {
    /// The transport rejected or failed to deliver the request.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// The message to edit or delete no longer exists.
    #[error("message not found: {0}")]
    MessageNotFound(i64),

    /// Callback data did not have the `prefix:id:action` shape.
    #[error("invalid callback data: {0}")]
    InvalidCallback(String),
}
