//! Telegram Bot API client library.
//!
//! This crate provides the transport for the fitness bot. It supports:
//!
//! - Sending text, keyboards and photos, editing and deleting messages
//! - Receiving updates via long polling with retry backoff
//! - Converting updates into [`bot_core::InboundEvent`]s
//!
//! # Example
//!
//! ```no_run
//! use futures::StreamExt;
//! use telegram_client::{to_inbound_event, TelegramClient, TelegramConfig};
//!
//! # async fn example() -> Result<(), telegram_client::TelegramError> {
//! let client = TelegramClient::connect(TelegramConfig::new("123:token")).await?;
//!
//! let mut updates = telegram_client::subscribe(&client);
//! while let Some(result) = updates.next().await {
//!     match result {
//!         Ok(update) => {
//!             if let Some(event) = to_inbound_event(&update) {
//!                 client.send_text(event.chat_id(), &event.raw_input()).await?;
//!             }
//!         }
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
mod convert;
pub mod error;
mod messenger;
pub mod poll;
pub mod types;

pub use client::TelegramClient;
pub use config::TelegramConfig;
pub use convert::to_inbound_event;
pub use error::TelegramError;
pub use poll::{subscribe, subscribe_from, ReconnectConfig, UpdateStream};
pub use types::*;

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
