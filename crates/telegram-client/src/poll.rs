//! Long-polling stream of incoming updates.

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::stream::{self, BoxStream, Stream};
use tracing::{debug, error, info};

use crate::error::TelegramError;
use crate::types::Update;
use crate::TelegramClient;

/// Configuration for retrying failed polls.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Maximum number of consecutive failures (None = infinite).
    pub max_retries: Option<u32>,
    /// Initial delay before first retry.
    pub initial_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Backoff multiplier for each retry.
    pub backoff_multiplier: f64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_retries: None,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

impl ReconnectConfig {
    /// Calculate delay for a given attempt number.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay_ms = self.initial_delay.as_millis() as f64
            * self.backoff_multiplier.powi(attempt as i32);
        let delay = Duration::from_millis(delay_ms as u64);
        delay.min(self.max_delay)
    }

    /// Check if we should retry after the given number of attempts.
    pub fn should_retry(&self, attempts: u32) -> bool {
        self.max_retries.map_or(true, |max| attempts < max)
    }
}

struct PollState {
    client: TelegramClient,
    reconnect: ReconnectConfig,
    offset: Option<i64>,
    pending: VecDeque<Update>,
    failures: u32,
    done: bool,
}

impl PollState {
    /// Next item: a buffered update, a poll failure, or None once retries run out.
    async fn next(mut self) -> Option<(Result<Update, TelegramError>, Self)> {
        loop {
            if self.done {
                return None;
            }
            if let Some(update) = self.pending.pop_front() {
                return Some((Ok(update), self));
            }

            let timeout = self.client.config().poll_timeout;
            match self.client.get_updates(self.offset, timeout).await {
                Ok(updates) => {
                    if self.failures > 0 {
                        info!("Polling restored after {} failures", self.failures);
                    }
                    self.failures = 0;
                    if let Some(last) = updates.last() {
                        self.offset = Some(last.update_id + 1);
                    }
                    self.pending.extend(updates);
                }
                Err(e) => {
                    self.failures += 1;
                    if !self.reconnect.should_retry(self.failures) {
                        error!("Giving up polling after {} failures: {}", self.failures, e);
                        self.done = true;
                        return Some((Err(e), self));
                    }
                    let delay = self.reconnect.delay_for_attempt(self.failures - 1);
                    error!(
                        "Polling failed: {} (failures: {}, retrying in {:?})",
                        e, self.failures, delay
                    );
                    tokio::time::sleep(delay).await;
                    return Some((Err(e), self));
                }
            }
        }
    }
}

/// A stream of incoming updates.
///
/// Each yielded update is confirmed by the following poll. Poll failures
/// are yielded as errors after the backoff delay; the stream ends once
/// `max_retries` consecutive failures have been reached.
pub struct UpdateStream {
    inner: BoxStream<'static, Result<Update, TelegramError>>,
}

impl UpdateStream {
    /// Create a stream starting at the oldest unconfirmed update.
    pub fn new(client: &TelegramClient) -> Self {
        Self::starting_at(client, None, ReconnectConfig::default())
    }

    /// Create a stream starting at `offset` with custom retry config.
    pub fn starting_at(
        client: &TelegramClient,
        offset: Option<i64>,
        reconnect: ReconnectConfig,
    ) -> Self {
        debug!("Starting update stream at offset {:?}", offset);
        let state = PollState {
            client: client.clone(),
            reconnect,
            offset,
            pending: VecDeque::new(),
            failures: 0,
            done: false,
        };
        Self {
            inner: Box::pin(stream::unfold(state, PollState::next)),
        }
    }
}

impl Stream for UpdateStream {
    type Item = Result<Update, TelegramError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

/// Create an update stream from a TelegramClient.
pub fn subscribe(client: &TelegramClient) -> UpdateStream {
    UpdateStream::new(client)
}

/// Create an update stream starting at `offset` with custom retry configuration.
pub fn subscribe_from(
    client: &TelegramClient,
    offset: Option<i64>,
    reconnect: ReconnectConfig,
) -> UpdateStream {
    UpdateStream::starting_at(client, offset, reconnect)
}
