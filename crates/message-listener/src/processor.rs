//! Message processor that connects telegram-client to the dialog engine.

use std::sync::Arc;

use bot_core::{InboundEvent, Messenger};
use dialog::DialogEngine;
use futures::StreamExt;
use telegram_client::{
    subscribe_from, to_inbound_event, ReconnectConfig, TelegramClient, TelegramError, Update,
    UpdateStream,
};
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Configuration for the message processor.
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Confirm and drop updates that arrived while the bot was offline.
    pub skip_backlog: bool,

    /// Only react in one-to-one chats with the bot.
    pub private_chats_only: bool,

    /// Ignore updates sent by other bots.
    pub ignore_bots: bool,

    /// Backoff applied when polling fails.
    pub reconnect: ReconnectConfig,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            skip_backlog: false,
            private_chats_only: true,
            ignore_bots: true,
            reconnect: ReconnectConfig::default(),
        }
    }
}

impl ProcessorConfig {
    /// Default config that drops the backlog at startup.
    pub fn skipping_backlog() -> Self {
        Self {
            skip_backlog: true,
            ..Default::default()
        }
    }

    /// Check if we should process this update.
    pub fn accepts(&self, update: &Update) -> Result<(), String> {
        if update.message.is_none() && update.callback_query.is_none() {
            return Err("unsupported update type".to_string());
        }

        let sender = update.sender().ok_or_else(|| "no sender".to_string())?;
        if self.ignore_bots && sender.is_bot {
            return Err("sent by a bot".to_string());
        }

        if self.private_chats_only {
            if let Some(chat) = update.chat() {
                if !chat.is_private() {
                    return Err(format!("{:?} chat", chat.kind).to_lowercase());
                }
            }
        }

        Ok(())
    }
}

/// Errors that can occur during message processing.
#[derive(Debug, Error)]
pub enum ProcessorError {
    /// Error from the Bot API.
    #[error("telegram error: {0}")]
    Telegram(#[from] TelegramError),

    /// The update stream ended unexpectedly.
    #[error("update stream ended")]
    StreamEnded,
}

/// Run one event through the engine. The engine contains its own failures.
pub async fn handle_event<M: Messenger + 'static>(engine: Arc<DialogEngine<M>>, event: InboundEvent) {
    engine.handle(event).await;
}

/// A processor that receives Telegram updates and feeds them to a [`DialogEngine`].
pub struct MessageProcessor<M: Messenger + 'static> {
    client: TelegramClient,
    engine: Arc<DialogEngine<M>>,
    config: ProcessorConfig,
}

impl<M: Messenger + 'static> MessageProcessor<M> {
    /// Create a new message processor.
    pub fn new(client: TelegramClient, engine: DialogEngine<M>, config: ProcessorConfig) -> Self {
        Self {
            client,
            engine: Arc::new(engine),
            config,
        }
    }

    /// Create a processor with default configuration.
    pub fn with_defaults(client: TelegramClient, engine: DialogEngine<M>) -> Self {
        Self::new(client, engine, ProcessorConfig::default())
    }

    /// Get a reference to the engine.
    pub fn engine(&self) -> &DialogEngine<M> {
        &self.engine
    }

    /// Get a reference to the client.
    pub fn client(&self) -> &TelegramClient {
        &self.client
    }

    /// Filter and convert an update.
    fn prepare(&self, update: &Update) -> Result<InboundEvent, String> {
        self.config.accepts(update)?;
        to_inbound_event(update).ok_or_else(|| "no text, photo or callback data".to_string())
    }

    async fn open_stream(&self) -> Result<UpdateStream, ProcessorError> {
        let offset = if self.config.skip_backlog {
            self.client.skip_pending().await?
        } else {
            None
        };
        Ok(subscribe_from(&self.client, offset, self.config.reconnect.clone()))
    }

    /// Run the processor with graceful shutdown support.
    ///
    /// This method runs until either:
    /// - The provided shutdown signal completes
    /// - The update stream gives up after too many poll failures
    ///
    /// Events already being handled are awaited before returning.
    pub async fn run_with_shutdown<S>(self, shutdown_signal: S) -> Result<(), ProcessorError>
    where
        S: std::future::Future<Output = ()> + Send,
    {
        info!(
            "Starting message processor for @{} (graceful shutdown enabled)",
            self.client.bot_username()
        );

        let mut stream = self.open_stream().await?;
        let mut tasks = JoinSet::new();

        tokio::pin!(shutdown_signal);

        let result = loop {
            tokio::select! {
                biased;

                // Check for shutdown signal first
                () = &mut shutdown_signal => {
                    info!("Shutdown signal received, stopping message processor");
                    break Ok(());
                }

                // Then handle updates
                result = stream.next() => {
                    match result {
                        Some(Ok(update)) => match self.prepare(&update) {
                            Ok(event) => {
                                info!(
                                    "Processing update {} from {}: {}",
                                    update.update_id,
                                    event.sender().user_id,
                                    event.raw_input()
                                );
                                tasks.spawn(handle_event(Arc::clone(&self.engine), event));
                            }
                            Err(reason) => {
                                debug!("Skipped update {}: {}", update.update_id, reason);
                            }
                        },
                        Some(Err(e)) => {
                            // Backoff already happened inside the stream
                            error!("Stream error: {}", e);
                        }
                        None => {
                            warn!("Update stream ended");
                            break Err(ProcessorError::StreamEnded);
                        }
                    }
                }
            }

            while let Some(joined) = tasks.try_join_next() {
                if let Err(e) = joined {
                    warn!("Event task failed: {}", e);
                }
            }
        };

        if !tasks.is_empty() {
            info!("Waiting for {} in-flight events", tasks.len());
        }
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                warn!("Event task failed: {}", e);
            }
        }

        result
    }

    /// Run the processor until Ctrl+C is pressed.
    ///
    /// This is a convenience method that wraps [`run_with_shutdown`](Self::run_with_shutdown)
    /// with the default Ctrl+C signal handler.
    #[cfg(feature = "signal")]
    pub async fn run_until_stopped(self) -> Result<(), ProcessorError> {
        let shutdown = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        };
        self.run_with_shutdown(shutdown).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bot_core::{Identity, InboundMessage};
    use database::Database;
    use dialog::DialogConfig;
    use mock_messenger::RecordingMessenger;
    use telegram_client::{CallbackQuery, Chat, ChatType, Message, User};

    fn user(is_bot: bool) -> User {
        User {
            id: 7,
            is_bot,
            first_name: "Anna".into(),
            username: Some("anna".into()),
            ..Default::default()
        }
    }

    fn text_update(kind: ChatType, is_bot: bool) -> Update {
        Update {
            update_id: 1,
            message: Some(Message {
                message_id: 1,
                from: Some(user(is_bot)),
                chat: Chat {
                    id: 7,
                    kind,
                    ..Default::default()
                },
                text: Some("/start".into()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = ProcessorConfig::default();
        assert!(config.private_chats_only);
        assert!(config.ignore_bots);
        assert!(!config.skip_backlog);
        assert!(ProcessorConfig::skipping_backlog().skip_backlog);
    }

    #[test]
    fn test_accepts_private_message() {
        let config = ProcessorConfig::default();
        assert!(config.accepts(&text_update(ChatType::Private, false)).is_ok());
    }

    #[test]
    fn test_rejects_group_and_bots() {
        let config = ProcessorConfig::default();
        assert_eq!(
            config.accepts(&text_update(ChatType::Supergroup, false)),
            Err("supergroup chat".to_string())
        );
        assert!(config.accepts(&text_update(ChatType::Private, true)).is_err());

        let open = ProcessorConfig {
            private_chats_only: false,
            ignore_bots: false,
            ..Default::default()
        };
        assert!(open.accepts(&text_update(ChatType::Group, true)).is_ok());
    }

    #[test]
    fn test_rejects_edits_and_callbacks_from_groups() {
        let config = ProcessorConfig::default();
        let edited = Update {
            update_id: 2,
            edited_message: text_update(ChatType::Private, false).message,
            ..Default::default()
        };
        assert!(config.accepts(&edited).is_err());

        let callback = Update {
            update_id: 3,
            callback_query: Some(CallbackQuery {
                id: "q".into(),
                from: user(false),
                message: text_update(ChatType::Group, false).message,
                data: Some("group:1:join".into()),
            }),
            ..Default::default()
        };
        assert!(config.accepts(&callback).is_err());
    }

    #[tokio::test]
    async fn test_handle_event_runs_on_spawned_task() {
        let db = Database::connect_with_pool_size("sqlite::memory:", 1)
            .await
            .unwrap();
        db.migrate().await.unwrap();
        let engine = Arc::new(DialogEngine::new(
            db,
            RecordingMessenger::new(),
            DialogConfig::new("boss"),
        ));

        let from = Identity::new(1, "boss").with_name("Boss", None);
        let event = InboundEvent::Message(InboundMessage::text(from, 1, "/start"));
        tokio::spawn(handle_event(Arc::clone(&engine), event))
            .await
            .unwrap();

        assert!(engine.messenger().last_text().await.is_some());
    }
}
