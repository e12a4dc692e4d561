//! Update loop for the fitness bot.
//!
//! This crate connects the Telegram long-polling stream to the dialog
//! engine. Every accepted update becomes an [`bot_core::InboundEvent`] and is
//! handled on its own task, so a slow handler never blocks other users.
//!
//! # Example
//!
//! ```ignore
//! use database::Database;
//! use dialog::{DialogConfig, DialogEngine};
//! use message_listener::{MessageProcessor, ProcessorConfig};
//! use telegram_client::{TelegramClient, TelegramConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = TelegramClient::connect(TelegramConfig::new("123:token")).await?;
//! let db = Database::connect("sqlite:fitness.db?mode=rwc").await?;
//! let engine = DialogEngine::new(db, client.clone(), DialogConfig::new("boss"));
//!
//! let processor = MessageProcessor::new(client, engine, ProcessorConfig::default());
//! processor.run_with_shutdown(async {
//!     let _ = tokio::signal::ctrl_c().await;
//! }).await?;
//! # Ok(())
//! # }
//! ```

mod processor;

pub use processor::{handle_event, MessageProcessor, ProcessorConfig, ProcessorError};

// Re-export the transport types callers need to build a processor
pub use telegram_client::{ReconnectConfig, TelegramClient, TelegramConfig, Update};
