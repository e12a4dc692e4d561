//! Inbound event types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::BotError;

/// A chat participant: stable numeric id plus a mutable handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    /// Stable Telegram user id.
    pub user_id: i64,
    /// Handle without "@", if the user has one.
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
}

impl Identity {
    /// Create an identity with a handle.
    pub fn new(user_id: i64, username: impl Into<String>) -> Self {
        let username = username.into();
        Self {
            user_id,
            username: if username.is_empty() { None } else { Some(username) },
            first_name: String::new(),
            last_name: None,
        }
    }

    /// Set the display name.
    pub fn with_name(mut self, first_name: impl Into<String>, last_name: Option<String>) -> Self {
        self.first_name = first_name.into();
        self.last_name = last_name;
        self
    }

    /// Normalized handle: trimmed, no leading "@", empty when absent.
    pub fn handle(&self) -> String {
        self.username
            .as_deref()
            .map(|u| u.trim().trim_start_matches('@').trim().to_string())
            .unwrap_or_default()
    }

    /// First and last name joined by a space.
    pub fn full_name(&self) -> String {
        match &self.last_name {
            Some(last) if !last.is_empty() => format!("{} {}", self.first_name, last),
            _ => self.first_name.clone(),
        }
    }

    /// "@handle" when available, otherwise the full name.
    pub fn display_name(&self) -> String {
        let handle = self.handle();
        if handle.is_empty() {
            self.full_name()
        } else {
            format!("@{}", handle)
        }
    }
}

/// A text or photo message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub from: Identity,
    pub chat_id: i64,
    pub message_id: i64,
    /// Message text, or the photo caption.
    pub text: String,
    /// Command name without "/" and "@bot", lower-cased.
    pub command: Option<String>,
    /// Photo file references, smallest first.
    pub photos: Vec<String>,
}

impl InboundMessage {
    /// Create a text message. A leading "/" marks it as a command.
    pub fn text(from: Identity, chat_id: i64, text: impl Into<String>) -> Self {
        let text = text.into();
        let command = parse_command(&text).map(|(name, _)| name);
        Self {
            from,
            chat_id,
            message_id: 0,
            text,
            command,
            photos: Vec::new(),
        }
    }

    /// Create a photo message with an optional caption.
    pub fn photo(
        from: Identity,
        chat_id: i64,
        file_id: impl Into<String>,
        caption: impl Into<String>,
    ) -> Self {
        Self {
            from,
            chat_id,
            message_id: 0,
            text: caption.into(),
            command: None,
            photos: vec![file_id.into()],
        }
    }

    /// Set the platform message id.
    pub fn with_message_id(mut self, message_id: i64) -> Self {
        self.message_id = message_id;
        self
    }

    /// Whether the message is a command.
    pub fn is_command(&self) -> bool {
        self.command.is_some()
    }

    /// The highest resolution photo, if any.
    pub fn largest_photo(&self) -> Option<&str> {
        self.photos.last().map(String::as_str)
    }
}

/// A press on an inline keyboard button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackQuery {
    pub from: Identity,
    pub chat_id: i64,
    /// Message carrying the keyboard.
    pub message_id: i64,
    /// Id to pass to `answer_callback`.
    pub callback_id: String,
    /// Raw `prefix:id:action` payload.
    pub data: String,
}

impl CallbackQuery {
    /// Decode the payload.
    pub fn parsed(&self) -> Result<CallbackData, BotError> {
        self.data.parse()
    }
}

/// Anything the bot reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    Message(InboundMessage),
    Callback(CallbackQuery),
}

impl InboundEvent {
    /// Who sent the event.
    pub fn sender(&self) -> &Identity {
        match self {
            InboundEvent::Message(m) => &m.from,
            InboundEvent::Callback(c) => &c.from,
        }
    }

    /// Chat to reply in.
    pub fn chat_id(&self) -> i64 {
        match self {
            InboundEvent::Message(m) => m.chat_id,
            InboundEvent::Callback(c) => c.chat_id,
        }
    }

    /// Short description of the raw input, for logs.
    pub fn raw_input(&self) -> String {
        match self {
            InboundEvent::Message(m) if !m.photos.is_empty() => {
                format!("[photo] {}", m.text)
            }
            InboundEvent::Message(m) => m.text.clone(),
            InboundEvent::Callback(c) => format!("[callback] {}", c.data),
        }
    }
}

/// Decoded callback payload: `prefix:entity_id:action`.
///
/// The entity id may be empty, e.g. `exercise::finish`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallbackData {
    pub prefix: String,
    pub entity_id: Option<i64>,
    pub action: String,
}

impl CallbackData {
    /// Callback bound to an entity.
    pub fn new(prefix: impl Into<String>, entity_id: i64, action: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            entity_id: Some(entity_id),
            action: action.into(),
        }
    }

    /// Callback without an entity.
    pub fn action(prefix: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            entity_id: None,
            action: action.into(),
        }
    }
}

impl fmt::Display for CallbackData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.entity_id {
            Some(id) => write!(f, "{}:{}:{}", self.prefix, id, self.action),
            None => write!(f, "{}::{}", self.prefix, self.action),
        }
    }
}

impl std::str::FromStr for CallbackData {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let (prefix, id, action) = match (parts.next(), parts.next(), parts.next()) {
            (Some(prefix), Some(id), Some(action)) if !prefix.is_empty() => (prefix, id, action),
            _ => return Err(BotError::InvalidCallback(s.to_string())),
        };

        let entity_id = if id.is_empty() {
            None
        } else {
            Some(
                id.parse::<i64>()
                    .map_err(|_| BotError::InvalidCallback(s.to_string()))?,
            )
        };

        Ok(Self {
            prefix: prefix.to_string(),
            entity_id,
            action: action.to_string(),
        })
    }
}

/// Split "/name@bot args" into the lower-cased name and the rest.
pub fn parse_command(text: &str) -> Option<(String, String)> {
    let text = text.trim();
    let rest = text.strip_prefix('/')?;
    let (head, args) = match rest.split_once(char::is_whitespace) {
        Some((head, args)) => (head, args.trim()),
        None => (rest, ""),
    };
    let name = head.split('@').next().unwrap_or_default();
    if name.is_empty() {
        return None;
    }
    Some((name.to_lowercase(), args.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_roundtrip_with_id() {
        let data: CallbackData = "client_action:42:stats".parse().unwrap();
        assert_eq!(data.prefix, "client_action");
        assert_eq!(data.entity_id, Some(42));
        assert_eq!(data.action, "stats");
        assert_eq!(data.to_string(), "client_action:42:stats");
    }

    #[test]
    fn test_callback_empty_id() {
        let data: CallbackData = "exercise::finish".parse().unwrap();
        assert_eq!(data.entity_id, None);
        assert_eq!(data.action, "finish");
        assert_eq!(CallbackData::action("exercise", "finish").to_string(), "exercise::finish");
    }

    #[test]
    fn test_callback_invalid() {
        assert!("garbage".parse::<CallbackData>().is_err());
        assert!("org:abc:select".parse::<CallbackData>().is_err());
        assert!(":1:x".parse::<CallbackData>().is_err());
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("/start"), Some(("start".into(), "".into())));
        assert_eq!(
            parse_command("/Stats@fitness_bot bench"),
            Some(("stats".into(), "bench".into()))
        );
        assert_eq!(parse_command("hello"), None);
        assert_eq!(parse_command("/"), None);
    }

    #[test]
    fn test_identity_names() {
        let id = Identity::new(1, "@Coach ").with_name("Ivan", Some("Petrov".into()));
        assert_eq!(id.handle(), "Coach");
        assert_eq!(id.full_name(), "Ivan Petrov");
        assert_eq!(id.display_name(), "@Coach");

        let anon = Identity::new(2, "").with_name("Anna", None);
        assert_eq!(anon.handle(), "");
        assert_eq!(anon.display_name(), "Anna");
    }

    #[test]
    fn test_message_constructors() {
        let from = Identity::new(1, "user");
        let cmd = InboundMessage::text(from.clone(), 10, "/start");
        assert!(cmd.is_command());
        assert_eq!(cmd.command.as_deref(), Some("start"));

        let photo = InboundMessage::photo(from, 10, "file-1", "");
        assert_eq!(photo.largest_photo(), Some("file-1"));
        assert!(!photo.is_command());
    }

    #[test]
    fn test_event_serialization_tag() {
        let event = InboundEvent::Message(InboundMessage::text(Identity::new(1, "u"), 1, "hi"));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "message");
        assert_eq!(event.raw_input(), "hi");
    }
}
