//! Conversation steps, one module per role or sub-flow.
//!
//! Each step is a method on [`DialogEngine`](crate::DialogEngine) that takes
//! the current [`Turn`](crate::engine::Turn) and the payload of the state it
//! handles.

mod admin;
mod client;
mod group_training;
mod manager;
mod stats;
mod trainer;
mod workout;

use bot_core::Messenger;
use database::{grant, validation, DatabaseError, GrantKind};
use tracing::{info, warn};

use crate::engine::{DialogEngine, Turn};
use crate::error::Result;
use crate::state::DialogState;
use crate::texts;

impl<M: Messenger> DialogEngine<M> {
    /// Grant `kind` in a scope to the handle typed by the user, then go
    /// back to `back`.
    ///
    /// An archived grant for the same handle is reactivated. An already
    /// active grant is reported and left untouched.
    pub(crate) async fn grant_from_text(
        &self,
        turn: &Turn<'_>,
        kind: GrantKind,
        scope_id: i64,
        scope_name: &str,
        text: &str,
        back: DialogState,
    ) -> Result<()> {
        let username = match validation::validate_username(text) {
            Ok(username) => username,
            Err(_) => return self.reply(turn, texts::BAD_USERNAME).await,
        };
        let noun = texts::role_noun(kind);

        let existing = grant::find_grant(self.db.pool(), kind, scope_id, &username).await?;
        if existing.as_ref().is_some_and(|g| g.status.is_active()) {
            let text = format!("⚠️ {} @{} уже активен в {}.", noun, username, scope_name);
            return self.enter(turn, back, &text).await;
        }

        match grant::add_grant(self.db.pool(), kind, scope_id, &username).await {
            Ok(added) => {
                info!(
                    "{} granted {} @{} in scope {}",
                    turn.user_id(),
                    kind.entity(),
                    added.username,
                    scope_id
                );
                let verb = if existing.is_some() {
                    "восстановлен"
                } else {
                    "добавлен"
                };
                let text = format!("✅ {} @{} {} в {}!", noun, added.username, verb, scope_name);
                self.enter(turn, back, &text).await
            }
            Err(DatabaseError::Invalid(_)) => self.reply(turn, texts::BAD_USERNAME).await,
            Err(e) => {
                warn!("Failed to add {} @{}: {}", kind.entity(), username, e);
                self.reply(turn, texts::TRY_AGAIN).await
            }
        }
    }

    /// Archive a grant picked from a list and describe the outcome.
    ///
    /// Archiving is idempotent: a second removal reports the grant as
    /// already deactivated.
    pub(crate) async fn archive_outcome(
        &self,
        kind: GrantKind,
        scope_id: i64,
        scope_name: &str,
        username: &str,
    ) -> String {
        let noun = texts::role_noun(kind);
        match grant::archive_grant(self.db.pool(), kind, scope_id, username).await {
            Ok(true) => {
                let mut text = format!(
                    "✅ {} @{} удалён из {}.",
                    noun, username, scope_name
                );
                if kind != GrantKind::Manager {
                    text.push_str("\nИстория тренировок сохранена.");
                }
                text
            }
            Ok(false) => format!("{} @{} уже деактивирован.", noun, username),
            Err(DatabaseError::NotFound { .. }) => texts::STALE_NUMBER.to_string(),
            Err(e) => {
                warn!("Failed to archive {} @{}: {}", kind.entity(), username, e);
                texts::TRY_AGAIN.to_string()
            }
        }
    }
}
