//! Recording messenger for dialog tests.
//!
//! [`RecordingMessenger`] implements [`Messenger`] by appending every call
//! to an in-memory log, so tests can assert on what the bot said and which
//! keyboards it showed.
//!
//! # Example
//!
//! ```rust
//! use bot_core::Messenger;
//! use mock_messenger::RecordingMessenger;
//!
//! #[tokio::main]
//! async fn main() {
//!     let messenger = RecordingMessenger::new();
//!     messenger.send_plain(1, "Hello!").await.unwrap();
//!     assert_eq!(messenger.last_text().await.as_deref(), Some("Hello!"));
//! }
//! ```

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use bot_core::{
    BotError, InlineKeyboard, MessageRef, Messenger, Photo, ReplyKeyboard, TextFormat,
};
use tokio::sync::Mutex;

/// One recorded messenger call.
#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Text {
        chat_id: i64,
        message_id: i64,
        text: String,
        format: TextFormat,
    },
    Menu {
        chat_id: i64,
        message_id: i64,
        text: String,
        menu: ReplyKeyboard,
    },
    Inline {
        chat_id: i64,
        message_id: i64,
        text: String,
        keyboard: InlineKeyboard,
    },
    Edit {
        chat_id: i64,
        message_id: i64,
        text: String,
        keyboard: Option<InlineKeyboard>,
    },
    Delete {
        chat_id: i64,
        message_id: i64,
    },
    CallbackAnswer {
        callback_id: String,
        text: String,
    },
    Photo {
        chat_id: i64,
        message_id: i64,
        photo: Photo,
        caption: String,
    },
}

impl Sent {
    /// Visible text of the call, if it has any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Sent::Text { text, .. }
            | Sent::Menu { text, .. }
            | Sent::Inline { text, .. }
            | Sent::Edit { text, .. } => Some(text),
            Sent::Photo { caption, .. } => Some(caption),
            Sent::Delete { .. } | Sent::CallbackAnswer { .. } => None,
        }
    }
}

/// A messenger that records everything it is asked to send.
#[derive(Debug, Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<Sent>>,
    next_id: AtomicI64,
    fail_on: Option<String>,
}

impl RecordingMessenger {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a recorder that fails any send whose text contains `needle`.
    ///
    /// Useful for exercising error paths in the caller.
    pub fn failing_on(needle: impl Into<String>) -> Self {
        Self {
            fail_on: Some(needle.into()),
            ..Self::default()
        }
    }

    fn check(&self, text: &str) -> Result<(), BotError> {
        match &self.fail_on {
            Some(needle) if text.contains(needle.as_str()) => {
                Err(BotError::SendFailed(format!("refusing to send '{}'", text)))
            }
            _ => Ok(()),
        }
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    async fn record(&self, sent: Sent) {
        self.sent.lock().await.push(sent);
    }

    /// All recorded calls, oldest first.
    pub async fn sent(&self) -> Vec<Sent> {
        self.sent.lock().await.clone()
    }

    /// Texts of all recorded calls that carry text.
    pub async fn texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .filter_map(|s| s.text().map(str::to_string))
            .collect()
    }

    /// Text of the most recent call that carries text.
    pub async fn last_text(&self) -> Option<String> {
        self.sent
            .lock()
            .await
            .iter()
            .rev()
            .find_map(|s| s.text().map(str::to_string))
    }

    /// The most recent reply keyboard.
    pub async fn last_menu(&self) -> Option<ReplyKeyboard> {
        self.sent.lock().await.iter().rev().find_map(|s| match s {
            Sent::Menu { menu, .. } => Some(menu.clone()),
            _ => None,
        })
    }

    /// The most recent inline keyboard.
    pub async fn last_inline(&self) -> Option<InlineKeyboard> {
        self.sent.lock().await.iter().rev().find_map(|s| match s {
            Sent::Inline { keyboard, .. } => Some(keyboard.clone()),
            _ => None,
        })
    }

    /// Whether any recorded text contains `needle`.
    pub async fn any_text_contains(&self, needle: &str) -> bool {
        self.texts().await.iter().any(|t| t.contains(needle))
    }

    /// Ids of deleted messages.
    pub async fn deleted(&self) -> Vec<i64> {
        self.sent
            .lock()
            .await
            .iter()
            .filter_map(|s| match s {
                Sent::Delete { message_id, .. } => Some(*message_id),
                _ => None,
            })
            .collect()
    }

    /// Callback ids that were answered.
    pub async fn answered_callbacks(&self) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .filter_map(|s| match s {
                Sent::CallbackAnswer { callback_id, .. } => Some(callback_id.clone()),
                _ => None,
            })
            .collect()
    }

    /// Forget everything recorded so far.
    pub async fn clear(&self) {
        self.sent.lock().await.clear();
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        format: TextFormat,
    ) -> Result<MessageRef, BotError> {
        self.check(text)?;
        let message_id = self.next_id();
        self.record(Sent::Text {
            chat_id,
            message_id,
            text: text.to_string(),
            format,
        })
        .await;
        Ok(MessageRef { chat_id, message_id })
    }

    async fn send_with_menu(
        &self,
        chat_id: i64,
        text: &str,
        menu: &ReplyKeyboard,
    ) -> Result<MessageRef, BotError> {
        self.check(text)?;
        let message_id = self.next_id();
        self.record(Sent::Menu {
            chat_id,
            message_id,
            text: text.to_string(),
            menu: menu.clone(),
        })
        .await;
        Ok(MessageRef { chat_id, message_id })
    }

    async fn send_inline_keyboard(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: &InlineKeyboard,
    ) -> Result<MessageRef, BotError> {
        self.check(text)?;
        let message_id = self.next_id();
        self.record(Sent::Inline {
            chat_id,
            message_id,
            text: text.to_string(),
            keyboard: keyboard.clone(),
        })
        .await;
        Ok(MessageRef { chat_id, message_id })
    }

    async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<(), BotError> {
        self.check(text)?;
        self.record(Sent::Edit {
            chat_id,
            message_id,
            text: text.to_string(),
            keyboard: keyboard.cloned(),
        })
        .await;
        Ok(())
    }

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<(), BotError> {
        self.record(Sent::Delete { chat_id, message_id }).await;
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str, text: &str) -> Result<(), BotError> {
        self.record(Sent::CallbackAnswer {
            callback_id: callback_id.to_string(),
            text: text.to_string(),
        })
        .await;
        Ok(())
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        photo: &Photo,
        caption: &str,
    ) -> Result<MessageRef, BotError> {
        self.check(caption)?;
        let message_id = self.next_id();
        self.record(Sent::Photo {
            chat_id,
            message_id,
            photo: photo.clone(),
            caption: caption.to_string(),
        })
        .await;
        Ok(MessageRef { chat_id, message_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_in_order() {
        let messenger = RecordingMessenger::new();
        messenger.send_plain(1, "first").await.unwrap();
        messenger
            .send_with_menu(1, "second", &ReplyKeyboard::new().button("ok"))
            .await
            .unwrap();
        messenger.delete_message(1, 1).await.unwrap();

        assert_eq!(messenger.texts().await, vec!["first", "second"]);
        assert_eq!(messenger.last_menu().await.unwrap().button_count(), 1);
        assert_eq!(messenger.deleted().await, vec![1]);
    }

    #[tokio::test]
    async fn test_failing_on() {
        let messenger = RecordingMessenger::failing_on("boom");
        assert!(messenger.send_plain(1, "fine").await.is_ok());
        assert!(messenger.send_plain(1, "boom!").await.is_err());
        assert_eq!(messenger.texts().await, vec!["fine"]);
    }
}
