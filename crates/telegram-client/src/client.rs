//! Telegram Bot API HTTP client.

use std::time::Duration;

use bot_core::Photo;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::TelegramConfig;
use crate::error::TelegramError;
use crate::types::{
    AnswerCallbackParams, ApiResponse, ChatMessageParams, EditMessageParams, GetUpdatesParams,
    Message, SendMessageParams, SendPhotoParams, Update, User, ALLOWED_UPDATES,
};

/// Timeout for regular (non-polling) requests.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Extra time a long-poll request gets on top of the poll window.
const POLL_GRACE: Duration = Duration::from_secs(10);

/// Client for the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramClient {
    http: Client,
    config: TelegramConfig,
    me: User,
}

impl TelegramClient {
    /// Connect to the Bot API and validate the token with `getMe`.
    pub async fn connect(config: TelegramConfig) -> Result<Self, TelegramError> {
        if config.token.trim().is_empty() {
            return Err(TelegramError::Config("bot token is empty".to_string()));
        }

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(TelegramError::from)?;

        let mut client = Self {
            http,
            config,
            me: User::default(),
        };
        client.me = client.get_me().await?;

        info!(
            "Connected to Bot API at {} as @{}",
            client.config.api_url,
            client.bot_username()
        );
        Ok(client)
    }

    /// The bot's own account, as reported by `getMe` at connect time.
    pub fn me(&self) -> &User {
        &self.me
    }

    /// The bot's handle without "@".
    pub fn bot_username(&self) -> &str {
        self.me.username.as_deref().unwrap_or_default()
    }

    /// Fetch the bot's own account.
    pub async fn get_me(&self) -> Result<User, TelegramError> {
        self.call("getMe", &serde_json::json!({})).await
    }

    /// Long-poll for updates with ids at or above `offset`.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout: Duration,
    ) -> Result<Vec<Update>, TelegramError> {
        let params = GetUpdatesParams {
            offset,
            timeout: timeout.as_secs(),
            allowed_updates: ALLOWED_UPDATES.to_vec(),
        };
        let url = self.config.method_url("getUpdates");

        let response = self
            .http
            .post(&url)
            .timeout(timeout + POLL_GRACE)
            .json(&params)
            .send()
            .await?;

        let updates: Vec<Update> = Self::read_response("getUpdates", response).await?;
        if !updates.is_empty() {
            debug!("Received {} updates (offset={:?})", updates.len(), offset);
        }
        Ok(updates)
    }

    /// Confirm every pending update and return the offset to poll from next.
    pub async fn skip_pending(&self) -> Result<Option<i64>, TelegramError> {
        let pending = self.get_updates(Some(-1), Duration::ZERO).await?;
        let next = pending.last().map(|u| u.update_id + 1);
        if let Some(offset) = next {
            info!("Skipped pending updates up to offset {}", offset);
        }
        Ok(next)
    }

    /// Send a message using the full params structure.
    pub async fn send_message(&self, params: SendMessageParams) -> Result<Message, TelegramError> {
        self.call("sendMessage", &params).await
    }

    /// Send a plain text message to a chat.
    pub async fn send_text(&self, chat_id: i64, text: &str) -> Result<Message, TelegramError> {
        self.send_message(SendMessageParams::text(chat_id, text)).await
    }

    /// Replace the text and inline buttons of a message.
    pub async fn edit_message_text(&self, params: EditMessageParams) -> Result<(), TelegramError> {
        // The result is the edited Message, or `true` for inline messages.
        let _: serde_json::Value = self.call("editMessageText", &params).await?;
        Ok(())
    }

    /// Delete a message.
    pub async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<bool, TelegramError> {
        self.call(
            "deleteMessage",
            &ChatMessageParams {
                chat_id,
                message_id,
            },
        )
        .await
    }

    /// Acknowledge a button press, showing `text` as a toast when not empty.
    pub async fn answer_callback_query(
        &self,
        callback_query_id: &str,
        text: &str,
    ) -> Result<bool, TelegramError> {
        self.call(
            "answerCallbackQuery",
            &AnswerCallbackParams {
                callback_query_id,
                text,
            },
        )
        .await
    }

    /// Send a photo, either by file id or by uploading its bytes.
    pub async fn send_photo(
        &self,
        chat_id: i64,
        photo: &Photo,
        caption: &str,
    ) -> Result<Message, TelegramError> {
        match photo {
            Photo::FileId(file_id) => {
                let params = SendPhotoParams {
                    chat_id,
                    photo: file_id.clone(),
                    caption: caption.to_string(),
                };
                self.call("sendPhoto", &params).await
            }
            Photo::Bytes { file_name, data } => {
                let part = Part::bytes(data.clone()).file_name(file_name.clone());
                let mut form = Form::new()
                    .text("chat_id", chat_id.to_string())
                    .part("photo", part);
                if !caption.is_empty() {
                    form = form.text("caption", caption.to_string());
                }

                debug!("Bot API call: sendPhoto (upload {} bytes)", data.len());
                let response = self
                    .http
                    .post(self.config.method_url("sendPhoto"))
                    .multipart(form)
                    .send()
                    .await?;
                Self::read_response("sendPhoto", response).await
            }
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &TelegramConfig {
        &self.config
    }

    /// Make a JSON call to a Bot API method.
    async fn call<P: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        method: &str,
        params: &P,
    ) -> Result<R, TelegramError> {
        debug!("Bot API call: {}", method);

        let response = self
            .http
            .post(self.config.method_url(method))
            .json(params)
            .send()
            .await?;

        Self::read_response(method, response).await
    }

    /// Decode the `{ok, result, description, error_code}` envelope.
    async fn read_response<R: DeserializeOwned>(
        method: &str,
        response: Response,
    ) -> Result<R, TelegramError> {
        let status = response.status();
        let body = response.text().await?;

        let envelope: ApiResponse<R> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(TelegramError::Api {
                    code: i32::from(status.as_u16()),
                    description: body,
                });
            }
            Err(e) => return Err(TelegramError::Json(e)),
        };

        envelope.into_result().inspect_err(|e| {
            debug!("Bot API call {} failed: {}", method, e);
        })
    }
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("config", &self.config)
            .field("bot", &self.bot_username())
            .finish()
    }
}
