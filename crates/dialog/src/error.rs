//! Error types for dialog handling.

use bot_core::BotError;
use database::DatabaseError;
use thiserror::Error;

/// Errors that escape a workflow step.
///
/// Validation and conflict problems are answered inside the workflows, so
/// anything that reaches [`crate::DialogEngine::handle`] is unexpected.
#[derive(Debug, Error)]
pub enum DialogError {
    /// Persistence failed.
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// Sending a reply failed.
    #[error("messenger error: {0}")]
    Messenger(#[from] BotError),
}

/// Result type for dialog operations.
pub type Result<T> = std::result::Result<T, DialogError>;
