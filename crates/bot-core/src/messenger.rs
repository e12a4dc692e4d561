//! Outbound messenger trait and implementations.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::BotError;
use crate::keyboard::{InlineKeyboard, ReplyKeyboard, TextFormat};

/// A message the bot has sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef {
    pub chat_id: i64,
    pub message_id: i64,
}

/// Photo to send: an already uploaded file or raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Photo {
    /// Platform file reference.
    FileId(String),
    /// Image bytes with a file name.
    Bytes { file_name: String, data: Vec<u8> },
}

/// Trait for sending messages, keyboards and callback answers.
///
/// Abstracted to support different transports (Telegram, tests, etc.)
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Send a text message.
    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        format: TextFormat,
    ) -> Result<MessageRef, BotError>;

    /// Send a text message and replace the reply keyboard.
    async fn send_with_menu(
        &self,
        chat_id: i64,
        text: &str,
        menu: &ReplyKeyboard,
    ) -> Result<MessageRef, BotError>;

    /// Send a text message with buttons attached to it.
    async fn send_inline_keyboard(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: &InlineKeyboard,
    ) -> Result<MessageRef, BotError>;

    /// Replace the text (and optionally the buttons) of a sent message.
    async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<(), BotError>;

    /// Delete a sent message.
    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<(), BotError>;

    /// Acknowledge a button press, optionally with a toast text.
    async fn answer_callback(&self, callback_id: &str, text: &str) -> Result<(), BotError>;

    /// Send a photo with a caption.
    async fn send_photo(
        &self,
        chat_id: i64,
        photo: &Photo,
        caption: &str,
    ) -> Result<MessageRef, BotError>;

    /// Send plain text (convenience wrapper).
    async fn send_plain(&self, chat_id: i64, text: &str) -> Result<MessageRef, BotError> {
        self.send_text(chat_id, text, TextFormat::Plain).await
    }
}

#[async_trait]
impl<M: Messenger + ?Sized> Messenger for std::sync::Arc<M> {
    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        format: TextFormat,
    ) -> Result<MessageRef, BotError> {
        (**self).send_text(chat_id, text, format).await
    }

    async fn send_with_menu(
        &self,
        chat_id: i64,
        text: &str,
        menu: &ReplyKeyboard,
    ) -> Result<MessageRef, BotError> {
        (**self).send_with_menu(chat_id, text, menu).await
    }

    async fn send_inline_keyboard(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: &InlineKeyboard,
    ) -> Result<MessageRef, BotError> {
        (**self).send_inline_keyboard(chat_id, text, keyboard).await
    }

    async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<(), BotError> {
        (**self).edit_message(chat_id, message_id, text, keyboard).await
    }

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<(), BotError> {
        (**self).delete_message(chat_id, message_id).await
    }

    async fn answer_callback(&self, callback_id: &str, text: &str) -> Result<(), BotError> {
        (**self).answer_callback(callback_id, text).await
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        photo: &Photo,
        caption: &str,
    ) -> Result<MessageRef, BotError> {
        (**self).send_photo(chat_id, photo, caption).await
    }
}

/// A logging messenger for debugging that logs all operations.
#[derive(Debug, Default)]
pub struct LoggingMessenger {
    next_id: AtomicI64,
}

impl LoggingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_ref(&self, chat_id: i64) -> MessageRef {
        MessageRef {
            chat_id,
            message_id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
        }
    }
}

#[async_trait]
impl Messenger for LoggingMessenger {
    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        format: TextFormat,
    ) -> Result<MessageRef, BotError> {
        tracing::info!("[{:?}] Sending message to {}: {}", format, chat_id, text);
        Ok(self.next_ref(chat_id))
    }

    async fn send_with_menu(
        &self,
        chat_id: i64,
        text: &str,
        menu: &ReplyKeyboard,
    ) -> Result<MessageRef, BotError> {
        tracing::info!(
            "Sending message to {} with {} menu buttons: {}",
            chat_id,
            menu.button_count(),
            text
        );
        Ok(self.next_ref(chat_id))
    }

    async fn send_inline_keyboard(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: &InlineKeyboard,
    ) -> Result<MessageRef, BotError> {
        tracing::info!(
            "Sending inline keyboard to {} ({:?}): {}",
            chat_id,
            keyboard.callback_data(),
            text
        );
        Ok(self.next_ref(chat_id))
    }

    async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        _keyboard: Option<&InlineKeyboard>,
    ) -> Result<(), BotError> {
        tracing::info!("Editing message {} in {}: {}", message_id, chat_id, text);
        Ok(())
    }

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<(), BotError> {
        tracing::info!("Deleting message {} in {}", message_id, chat_id);
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str, text: &str) -> Result<(), BotError> {
        tracing::info!("Answering callback {}: {}", callback_id, text);
        Ok(())
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        photo: &Photo,
        caption: &str,
    ) -> Result<MessageRef, BotError> {
        let source = match photo {
            Photo::FileId(id) => id.clone(),
            Photo::Bytes { file_name, data } => format!("{} ({} bytes)", file_name, data.len()),
        };
        tracing::info!("Sending photo {} to {}: {}", source, chat_id, caption);
        Ok(self.next_ref(chat_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_logging_messenger_assigns_ids() {
        let messenger = LoggingMessenger::new();

        let first = messenger.send_plain(1, "one").await.unwrap();
        let second = messenger
            .send_inline_keyboard(1, "two", &InlineKeyboard::new())
            .await
            .unwrap();
        assert_eq!(first.message_id, 1);
        assert_eq!(second.message_id, 2);

        messenger
            .send_photo(1, &Photo::FileId("abc".into()), "caption")
            .await
            .unwrap();
        messenger.edit_message(1, 1, "edited", None).await.unwrap();
    }

    #[tokio::test]
    async fn test_arc_messenger_delegates() {
        let messenger = std::sync::Arc::new(LoggingMessenger::new());
        let sent = messenger.send_plain(5, "hi").await.unwrap();
        assert_eq!(sent.chat_id, 5);
    }
}
