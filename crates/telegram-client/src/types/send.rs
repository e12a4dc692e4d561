//! Parameters for outbound Bot API methods.

use bot_core::{InlineKeyboard, ReplyKeyboard, TextFormat};
use serde::Serialize;

/// Text parse mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParseMode {
    #[serde(rename = "HTML")]
    Html,
}

impl ParseMode {
    /// Parse mode for a [`TextFormat`].
    pub fn for_format(format: TextFormat) -> Option<Self> {
        match format {
            TextFormat::Plain => None,
            TextFormat::Html => Some(ParseMode::Html),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyboardButton {
    pub text: String,
}

/// Keyboard attached to an outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ReplyMarkup {
    Inline {
        inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
    },
    Keyboard {
        keyboard: Vec<Vec<KeyboardButton>>,
        resize_keyboard: bool,
    },
    Remove {
        remove_keyboard: bool,
    },
}

impl From<&InlineKeyboard> for ReplyMarkup {
    fn from(keyboard: &InlineKeyboard) -> Self {
        ReplyMarkup::Inline {
            inline_keyboard: keyboard
                .rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|b| InlineKeyboardButton {
                            text: b.text.clone(),
                            callback_data: b.data.clone(),
                        })
                        .collect()
                })
                .collect(),
        }
    }
}

impl From<&ReplyKeyboard> for ReplyMarkup {
    /// An empty menu hides the keyboard.
    fn from(menu: &ReplyKeyboard) -> Self {
        if menu.is_empty() {
            return ReplyMarkup::Remove {
                remove_keyboard: true,
            };
        }
        ReplyMarkup::Keyboard {
            keyboard: menu
                .rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|label| KeyboardButton {
                            text: label.clone(),
                        })
                        .collect()
                })
                .collect(),
            resize_keyboard: true,
        }
    }
}

/// Parameters for `sendMessage`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SendMessageParams {
    pub chat_id: i64,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<ReplyMarkup>,
}

impl SendMessageParams {
    /// Plain text to a chat.
    pub fn text(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_format(mut self, format: TextFormat) -> Self {
        self.parse_mode = ParseMode::for_format(format);
        self
    }

    pub fn with_markup(mut self, markup: ReplyMarkup) -> Self {
        self.reply_markup = Some(markup);
        self
    }
}

/// Parameters for `editMessageText`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EditMessageParams {
    pub chat_id: i64,
    pub message_id: i64,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<ReplyMarkup>,
}

/// Parameters for `getUpdates`.
#[derive(Debug, Clone, Serialize)]
pub struct GetUpdatesParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    /// Long-poll window in seconds.
    pub timeout: u64,
    pub allowed_updates: Vec<&'static str>,
}

/// Update kinds the bot subscribes to.
pub const ALLOWED_UPDATES: [&str; 2] = ["message", "callback_query"];

/// Parameters for `sendPhoto` by file id.
#[derive(Debug, Clone, Serialize)]
pub struct SendPhotoParams {
    pub chat_id: i64,
    pub photo: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub caption: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ChatMessageParams {
    pub chat_id: i64,
    pub message_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct AnswerCallbackParams<'a> {
    pub callback_query_id: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub text: &'a str,
}
