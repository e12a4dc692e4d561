//! Keyboard specs handed to the messenger.

use serde::{Deserialize, Serialize};

use crate::event::CallbackData;

/// How message text should be interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextFormat {
    #[default]
    Plain,
    /// Telegram HTML subset; callers escape user input with [`escape_html`].
    Html,
}

/// Persistent keyboard shown under the input field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyKeyboard {
    pub rows: Vec<Vec<String>>,
}

impl ReplyKeyboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row of buttons.
    pub fn row<I, S>(mut self, buttons: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let row: Vec<String> = buttons.into_iter().map(Into::into).collect();
        if !row.is_empty() {
            self.rows.push(row);
        }
        self
    }

    /// Append one button on its own row.
    pub fn button(self, label: impl Into<String>) -> Self {
        self.row([label.into()])
    }

    /// Total number of buttons.
    pub fn button_count(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// Whether any button has this exact label.
    pub fn contains(&self, label: &str) -> bool {
        self.rows.iter().flatten().any(|b| b == label)
    }

    pub fn is_empty(&self) -> bool {
        self.button_count() == 0
    }
}

/// A button attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineButton {
    pub text: String,
    /// Encoded [`CallbackData`].
    pub data: String,
}

impl InlineButton {
    pub fn callback(text: impl Into<String>, data: &CallbackData) -> Self {
        Self {
            text: text.into(),
            data: data.to_string(),
        }
    }
}

/// Buttons attached to a single message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineKeyboard {
    pub rows: Vec<Vec<InlineButton>>,
}

impl InlineKeyboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row of buttons.
    pub fn row(mut self, buttons: Vec<InlineButton>) -> Self {
        if !buttons.is_empty() {
            self.rows.push(buttons);
        }
        self
    }

    /// Append one button on its own row.
    pub fn button(self, text: impl Into<String>, data: &CallbackData) -> Self {
        self.row(vec![InlineButton::callback(text, data)])
    }

    /// Every callback payload, in order.
    pub fn callback_data(&self) -> Vec<&str> {
        self.rows.iter().flatten().map(|b| b.data.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Escape `<`, `>` and `&` for [`TextFormat::Html`].
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_keyboard_builder() {
        let kb = ReplyKeyboard::new()
            .row(["a", "b"])
            .row(Vec::<String>::new())
            .button("c");
        assert_eq!(kb.rows.len(), 2);
        assert_eq!(kb.button_count(), 3);
        assert!(kb.contains("c"));
        assert!(!kb.contains("d"));
    }

    #[test]
    fn test_inline_keyboard_data() {
        let kb = InlineKeyboard::new()
            .button("Finish", &CallbackData::action("exercise", "finish"))
            .button("Open", &CallbackData::new("client", 3, "view"));
        assert_eq!(kb.callback_data(), vec!["exercise::finish", "client:3:view"]);
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<b>&"), "&lt;b&gt;&amp;");
        assert_eq!(escape_html("Жим лежа"), "Жим лежа");
    }
}
