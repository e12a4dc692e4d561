//! Conversion from Bot API updates into dialog events.

use bot_core::{CallbackQuery as InboundCallback, Identity, InboundEvent, InboundMessage};

use crate::types::{Message, Update, User};

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Identity::new(user.id, user.username.clone().unwrap_or_default())
            .with_name(user.first_name.clone(), user.last_name.clone())
    }
}

/// Convert an update into an [`InboundEvent`].
///
/// Returns `None` for updates the bot does not react to: edits, messages
/// without a sender, and messages with neither text nor a photo.
pub fn to_inbound_event(update: &Update) -> Option<InboundEvent> {
    if let Some(message) = &update.message {
        return message_event(message).map(InboundEvent::Message);
    }

    let query = update.callback_query.as_ref()?;
    let data = query.data.clone()?;
    let (chat_id, message_id) = match &query.message {
        Some(message) => (message.chat.id, message.message_id),
        None => (query.from.id, 0),
    };

    Some(InboundEvent::Callback(InboundCallback {
        from: Identity::from(&query.from),
        chat_id,
        message_id,
        callback_id: query.id.clone(),
        data,
    }))
}

fn message_event(message: &Message) -> Option<InboundMessage> {
    let from = Identity::from(message.from.as_ref()?);

    if !message.photo.is_empty() {
        let mut sizes: Vec<_> = message.photo.iter().collect();
        sizes.sort_by_key(|p| (p.area(), p.file_size.unwrap_or_default()));
        let caption = message.caption.clone().unwrap_or_default();

        let mut inbound = InboundMessage::photo(from, message.chat.id, "", caption);
        inbound.photos = sizes.into_iter().map(|p| p.file_id.clone()).collect();
        return Some(inbound.with_message_id(message.message_id));
    }

    let text = message.text.as_ref()?;
    Some(InboundMessage::text(from, message.chat.id, text.clone()).with_message_id(message.message_id))
}
