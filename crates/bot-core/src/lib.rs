//! Core types shared by the fitness bot crates.
//!
//! This crate defines the boundary between the dialog engine and the
//! transport:
//!
//! - [`InboundEvent`] - A text/photo message or a button press
//! - [`CallbackData`] - The `prefix:id:action` payload carried by buttons
//! - [`ReplyKeyboard`] / [`InlineKeyboard`] - Keyboard specs
//! - [`Messenger`] - The trait a transport implements to send replies
//! - [`BotError`] - Error type for messenger operations
//!
//! # Example
//!
//! ```rust
//! use bot_core::{CallbackData, Identity, InboundMessage};
//!
//! let message = InboundMessage::text(Identity::new(42, "alice"), 42, "/start");
//! assert_eq!(message.command.as_deref(), Some("start"));
//!
//! let data: CallbackData = "client:7:view".parse().unwrap();
//! assert_eq!(data.entity_id, Some(7));
//! ```

mod error;
mod event;
mod keyboard;
mod messenger;

pub use error::BotError;
pub use event::{parse_command, CallbackData, CallbackQuery, Identity, InboundEvent, InboundMessage};
pub use keyboard::{escape_html, InlineButton, InlineKeyboard, ReplyKeyboard, TextFormat};
pub use messenger::{LoggingMessenger, MessageRef, Messenger, Photo};

// Re-export async_trait for convenience
pub use async_trait::async_trait;
