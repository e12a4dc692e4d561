//! [`Messenger`] implementation backed by the Bot API.

use async_trait::async_trait;
use bot_core::{
    BotError, InlineKeyboard, MessageRef, Messenger, Photo, ReplyKeyboard, TextFormat,
};

use crate::types::{EditMessageParams, Message, ReplyMarkup, SendMessageParams};
use crate::TelegramClient;

fn message_ref(message: &Message) -> MessageRef {
    MessageRef {
        chat_id: message.chat.id,
        message_id: message.message_id,
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        format: TextFormat,
    ) -> Result<MessageRef, BotError> {
        let params = SendMessageParams::text(chat_id, text).with_format(format);
        let sent = self.send_message(params).await?;
        Ok(message_ref(&sent))
    }

    async fn send_with_menu(
        &self,
        chat_id: i64,
        text: &str,
        menu: &ReplyKeyboard,
    ) -> Result<MessageRef, BotError> {
        let params = SendMessageParams::text(chat_id, text).with_markup(ReplyMarkup::from(menu));
        let sent = self.send_message(params).await?;
        Ok(message_ref(&sent))
    }

    async fn send_inline_keyboard(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: &InlineKeyboard,
    ) -> Result<MessageRef, BotError> {
        let params =
            SendMessageParams::text(chat_id, text).with_markup(ReplyMarkup::from(keyboard));
        let sent = self.send_message(params).await?;
        Ok(message_ref(&sent))
    }

    async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<(), BotError> {
        let params = EditMessageParams {
            chat_id,
            message_id,
            text: text.to_string(),
            parse_mode: None,
            reply_markup: keyboard.map(ReplyMarkup::from),
        };
        self.edit_message_text(params).await?;
        Ok(())
    }

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<(), BotError> {
        if TelegramClient::delete_message(self, chat_id, message_id).await? {
            Ok(())
        } else {
            Err(BotError::MessageNotFound(message_id))
        }
    }

    async fn answer_callback(&self, callback_id: &str, text: &str) -> Result<(), BotError> {
        self.answer_callback_query(callback_id, text).await?;
        Ok(())
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        photo: &Photo,
        caption: &str,
    ) -> Result<MessageRef, BotError> {
        let sent = TelegramClient::send_photo(self, chat_id, photo, caption).await?;
        Ok(message_ref(&sent))
    }
}
