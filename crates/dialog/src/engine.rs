//! Dialog engine that routes every inbound event to a workflow step.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use bot_core::{
    Identity, InboundEvent, InboundMessage, InlineKeyboard, Messenger, TextFormat,
};
use database::{user, AccessInfo, Database, User, WorkoutScope};
use futures::FutureExt;
use tracing::{debug, error, info, warn};

use crate::access::AccessResolver;
use crate::error::Result;
use crate::menu;
use crate::state::{DialogState, StatsTarget, WorkoutTarget};
use crate::store::StateStore;
use crate::texts;

/// Configuration for the dialog engine.
#[derive(Debug, Clone)]
pub struct DialogConfig {
    /// Handle of the bot administrator.
    pub admin_username: String,
    /// Workouts shown in history views.
    pub history_limit: i64,
    /// How far back exercise stats reach.
    pub stats_window_months: u32,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            admin_username: String::new(),
            history_limit: 5,
            stats_window_months: 3,
        }
    }
}

impl DialogConfig {
    pub fn new(admin_username: impl Into<String>) -> Self {
        Self {
            admin_username: admin_username.into(),
            ..Self::default()
        }
    }

    pub fn with_history_limit(mut self, limit: i64) -> Self {
        self.history_limit = limit;
        self
    }
}

/// What is known about the sender while one event is handled.
pub(crate) struct Turn<'a> {
    pub identity: &'a Identity,
    pub chat_id: i64,
    /// Recomputed for every event.
    pub access: AccessInfo,
    /// None when the user upsert failed.
    pub user: Option<User>,
}

impl Turn<'_> {
    pub fn user_id(&self) -> i64 {
        self.identity.user_id
    }
}

/// Routes inbound events through the workflows.
///
/// The engine:
/// - Links the sender's handle to their numeric id
/// - Resolves access facts and loads the dialog state
/// - Handles "main menu", commands, state steps and root menu buttons
/// - Turns any unexpected failure into an apology and a cleared state
pub struct DialogEngine<M: Messenger> {
    pub(crate) db: Database,
    pub(crate) messenger: M,
    pub(crate) store: StateStore,
    pub(crate) access: AccessResolver,
    pub(crate) config: DialogConfig,
}

impl<M: Messenger> DialogEngine<M> {
    /// Create an engine with an empty state store.
    pub fn new(db: Database, messenger: M, config: DialogConfig) -> Self {
        Self {
            access: AccessResolver::new(&config.admin_username),
            db,
            messenger,
            store: StateStore::new(),
            config,
        }
    }

    pub fn messenger(&self) -> &M {
        &self.messenger
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &DialogConfig {
        &self.config
    }

    /// Handle one inbound event to completion.
    ///
    /// Never fails: errors and panics are logged, the sender's state is
    /// cleared and they get a generic apology.
    pub async fn handle(&self, event: InboundEvent) {
        let outcome = AssertUnwindSafe(self.dispatch(&event)).catch_unwind().await;
        let failure = match outcome {
            Ok(Ok(())) => return,
            Ok(Err(e)) => e.to_string(),
            Err(panic) => format!("panic: {}", panic_message(&*panic)),
        };

        let identity = event.sender();
        error!(
            user_id = identity.user_id,
            handle = %identity.handle(),
            input = %event.raw_input(),
            "Failed to handle event: {}",
            failure
        );

        self.store.clear(identity.user_id).await;
        self.cleanup_transient(identity.user_id).await;

        if let InboundEvent::Callback(query) = &event {
            if let Err(e) = self.messenger.answer_callback(&query.callback_id, "").await {
                warn!("Failed to answer callback after error: {}", e);
            }
        }
        if let Err(e) = self.messenger.send_plain(event.chat_id(), texts::APOLOGY).await {
            warn!("Failed to send apology to {}: {}", identity.user_id, e);
        }
    }

    async fn dispatch(&self, event: &InboundEvent) -> Result<()> {
        let identity = event.sender();
        let handle = identity.handle();
        debug!("Event from {} (@{}): {}", identity.user_id, handle, event.raw_input());

        match self.access.link(&self.db, identity).await {
            Ok(0) => {}
            Ok(linked) => info!("Linked {} grants to {} (@{})", linked, identity.user_id, handle),
            Err(e) => warn!("Failed to link @{} to {}: {}", handle, identity.user_id, e),
        }

        let access = self.access.resolve(&self.db, identity).await?;

        let user = match user::ensure_user(
            self.db.pool(),
            identity.user_id,
            &handle,
            &identity.full_name(),
        )
        .await
        {
            Ok(user) => Some(user),
            Err(e) => {
                warn!("Failed to upsert user {}: {}", identity.user_id, e);
                None
            }
        };

        let turn = Turn {
            identity,
            chat_id: event.chat_id(),
            access,
            user,
        };
        let state = self.store.get(identity.user_id).await;

        match event {
            InboundEvent::Message(message) => self.on_message(&turn, state, message).await,
            InboundEvent::Callback(query) => self.on_callback(&turn, state, query).await,
        }
    }

    async fn on_message(
        &self,
        turn: &Turn<'_>,
        state: Option<DialogState>,
        message: &InboundMessage,
    ) -> Result<()> {
        let text = message.text.trim();

        // Global escape, whatever the state
        if text == menu::MAIN_MENU {
            return self.show_root(turn, None).await;
        }

        if let Some(command) = &message.command {
            return self.on_command(turn, state, command).await;
        }

        match state {
            Some(state) if !state.permitted(&turn.access) => {
                info!(
                    "Dropping state {} of {}: access changed",
                    state.name(),
                    turn.user_id()
                );
                self.show_root(turn, Some(texts::ACCESS_REVOKED)).await
            }
            Some(state) if text == menu::CANCEL => self.cancel(turn, Some(state)).await,
            Some(state) => self.on_state(turn, state, message).await,
            None => self.on_root_text(turn, text).await,
        }
    }

    async fn on_command(
        &self,
        turn: &Turn<'_>,
        state: Option<DialogState>,
        command: &str,
    ) -> Result<()> {
        match command {
            "start" => self.show_root(turn, None).await,
            "help" => self.reply(turn, texts::HELP).await,
            "cancel" => self.cancel(turn, state).await,
            "workout" => {
                let target = WorkoutTarget {
                    trainer_client_id: None,
                    client_telegram_id: Some(turn.user_id()),
                    label: "вас".to_string(),
                };
                self.begin_workout(turn, target, None).await
            }
            "stats" => {
                let target = StatsTarget {
                    scope: WorkoutScope::Identity(turn.user_id()),
                    label: "вы".to_string(),
                };
                self.begin_stats(turn, target, None).await
            }
            other => {
                debug!("Unknown command /{} from {}", other, turn.user_id());
                self.reply(turn, texts::UNKNOWN_COMMAND).await
            }
        }
    }

    async fn on_state(
        &self,
        turn: &Turn<'_>,
        state: DialogState,
        message: &InboundMessage,
    ) -> Result<()> {
        let text = message.text.trim();

        match state {
            DialogState::AdminCreatingOrgName => self.org_name_entered(turn, text).await,
            DialogState::AdminCreatingOrgCode { name } => {
                self.org_code_entered(turn, &name, text).await
            }
            DialogState::AdminSelectingOrg { organizations } => {
                self.admin_org_chosen(turn, &organizations, text).await
            }
            DialogState::AdminManagingOrg { org } => self.admin_managing(turn, org, text).await,
            DialogState::AdminAddingManager { org } => self.manager_entered(turn, org, text).await,
            DialogState::AdminRemovingManager { org, managers } => {
                self.manager_to_remove(turn, org, &managers, text).await
            }
            DialogState::ManagerSelectingOrg { organizations } => {
                self.manager_org_chosen(turn, &organizations, text).await
            }
            DialogState::ManagerManagingOrg { org } => {
                self.manager_managing(turn, org, text).await
            }
            DialogState::ManagerAddingTrainer { org } => {
                self.trainer_entered(turn, org, text).await
            }
            DialogState::ManagerRemovingTrainer { org, trainers } => {
                self.trainer_to_remove(turn, org, &trainers, text).await
            }
            DialogState::TrainerSelectingOrg { organizations } => {
                self.trainer_org_chosen(turn, &organizations, text).await
            }
            DialogState::TrainerManagingOrg { trainer } => {
                self.trainer_managing(turn, trainer, text).await
            }
            DialogState::TrainerAddingClient { trainer } => {
                self.client_entered(turn, trainer, text).await
            }
            DialogState::TrainerViewingClients { trainer, clients } => {
                self.trainer_viewing_clients(turn, trainer, &clients, text)
                    .await
            }
            DialogState::TrainerClientAction { trainer, client } => {
                self.client_action_chosen(turn, trainer, client, text).await
            }
            DialogState::ClientSelectingTrainer { trainers } => {
                self.client_trainer_chosen(turn, &trainers, text).await
            }
            DialogState::ClientWithTrainer { client } => {
                self.client_panel_action(turn, client, text).await
            }
            DialogState::ClientViewingArchive { archived } => {
                self.archive_chosen(turn, &archived, text).await
            }
            DialogState::AwaitingMuscleGroup { target, resume } => {
                self.muscle_entered(turn, target, resume, text).await
            }
            DialogState::AddingExercises { session, resume } => {
                self.exercise_entered(turn, session, resume, message).await
            }
            DialogState::AwaitingExerciseName { target, resume } => {
                self.exercise_name_entered(turn, target, resume, text).await
            }
            DialogState::JoiningGroupTraining { trainings, resume } => {
                self.training_chosen(turn, &trainings, resume, text).await
            }
            DialogState::CreatingGroupTraining { trainer } => {
                self.group_training_entered(turn, trainer, text).await
            }
        }
    }

    /// Buttons of the root and admin menus, when no state is active.
    async fn on_root_text(&self, turn: &Turn<'_>, text: &str) -> Result<()> {
        match text {
            menu::ADMIN_PANEL => self.admin_panel(turn).await,
            menu::CREATE_ORG | menu::LIST_ORGS if !turn.access.is_admin => {
                self.reply(turn, texts::NOT_ADMIN).await
            }
            menu::CREATE_ORG => self.begin_create_org(turn).await,
            menu::LIST_ORGS => self.list_organizations(turn).await,
            menu::MANAGE_ORG => self.manager_panel(turn).await,
            menu::TRAINER_PANEL => self.trainer_panel(turn).await,
            menu::MY_WORKOUTS => self.client_panel(turn).await,
            menu::ARCHIVE => self.archive_panel(turn).await,
            menu::ABOUT => self.reply(turn, texts::ABOUT).await,
            menu::CANCEL => self.show_root(turn, Some(texts::CANCELLED)).await,
            _ => self.show_root(turn, Some(texts::USE_MENU)).await,
        }
    }

    /// Leave the current step for its parent, the admin menu or the root.
    pub(crate) async fn cancel(&self, turn: &Turn<'_>, state: Option<DialogState>) -> Result<()> {
        let Some(state) = state else {
            return self.show_root(turn, Some(texts::CANCELLED)).await;
        };

        let notice = match &state {
            DialogState::AddingExercises { session, .. } if session.saved() > 0 => format!(
                "Отменено. Сохранённые упражнения ({}) остаются в истории.",
                session.saved()
            ),
            _ => texts::CANCELLED.to_string(),
        };

        match state.parent() {
            Some(parent) if parent.permitted(&turn.access) => {
                self.enter(turn, parent, &notice).await
            }
            _ if state.is_admin_flow() && turn.access.is_admin => {
                self.clear(turn).await;
                self.messenger
                    .send_with_menu(turn.chat_id, &notice, &menu::admin_menu())
                    .await?;
                Ok(())
            }
            _ => self.show_root(turn, Some(&notice)).await,
        }
    }

    /// Clear the state and show the access-aware root menu.
    ///
    /// Without a notice, the text is the greeting, or the "no access" text
    /// for identities that hold nothing.
    pub(crate) async fn show_root(&self, turn: &Turn<'_>, notice: Option<&str>) -> Result<()> {
        self.clear(turn).await;

        let text = match notice {
            Some(notice) => notice.to_string(),
            None => self.greeting(turn),
        };
        self.messenger
            .send_with_menu(turn.chat_id, &text, &menu::root_menu(&turn.access))
            .await?;
        Ok(())
    }

    fn greeting(&self, turn: &Turn<'_>) -> String {
        let access = &turn.access;
        if access.is_empty() {
            return texts::no_access(&turn.identity.handle());
        }
        if !menu::has_actions(access) {
            return texts::ALL_ACCESS_ARCHIVED.to_string();
        }

        let mut lines = vec![texts::GREETING.to_string()];
        if access.is_admin {
            lines.push("👑 Вы администратор.".to_string());
        }
        let managers = access.active_managers().len();
        if managers > 0 {
            lines.push(format!("🏢 Организаций под управлением: {}", managers));
        }
        let trainers = access.active_trainers().len();
        if trainers > 0 {
            lines.push(format!("🏋️ Вы тренер в организациях: {}", trainers));
        }
        if !access.clients.is_empty() {
            lines.push(format!("💪 Активных тренеров: {}", access.clients.len()));
        }
        if !access.archived.is_empty() {
            lines.push(format!("📚 Архивных записей: {}", access.archived.len()));
        }
        lines.join("\n")
    }

    /// Make `state` current and show its keyboard with `text`.
    ///
    /// Transient messages of the previous step are deleted when the step
    /// changes.
    pub(crate) async fn enter(&self, turn: &Turn<'_>, state: DialogState, text: &str) -> Result<()> {
        let previous = self.store.get(turn.user_id()).await;
        if previous.as_ref().map(DialogState::name) != Some(state.name()) {
            self.cleanup_transient(turn.user_id()).await;
        }

        let keyboard = menu::for_state(&state);
        self.store.set(turn.user_id(), state).await;
        self.messenger
            .send_with_menu(turn.chat_id, text, &keyboard)
            .await?;
        Ok(())
    }

    /// Return to `resume`, or to the root menu when there is none.
    pub(crate) async fn leave(
        &self,
        turn: &Turn<'_>,
        resume: Option<Box<DialogState>>,
        text: &str,
    ) -> Result<()> {
        match resume {
            Some(parent) if parent.permitted(&turn.access) => self.enter(turn, *parent, text).await,
            _ => self.show_root(turn, Some(text)).await,
        }
    }

    /// Drop the state and its transient messages.
    pub(crate) async fn clear(&self, turn: &Turn<'_>) {
        self.store.clear(turn.user_id()).await;
        self.cleanup_transient(turn.user_id()).await;
    }

    async fn cleanup_transient(&self, user_id: i64) {
        for message in self.store.drain_transient(user_id).await {
            if let Err(e) = self
                .messenger
                .delete_message(message.chat_id, message.message_id)
                .await
            {
                debug!("Failed to delete message {}: {}", message.message_id, e);
            }
        }
    }

    /// Send an inline keyboard that is deleted when the step changes.
    pub(crate) async fn send_transient(
        &self,
        turn: &Turn<'_>,
        text: &str,
        keyboard: &InlineKeyboard,
    ) -> Result<()> {
        let sent = self
            .messenger
            .send_inline_keyboard(turn.chat_id, text, keyboard)
            .await?;
        self.store.attach_transient(turn.user_id(), sent).await;
        Ok(())
    }

    pub(crate) async fn reply(&self, turn: &Turn<'_>, text: &str) -> Result<()> {
        self.messenger.send_plain(turn.chat_id, text).await?;
        Ok(())
    }

    pub(crate) async fn reply_html(&self, turn: &Turn<'_>, text: &str) -> Result<()> {
        self.messenger
            .send_text(turn.chat_id, text, TextFormat::Html)
            .await?;
        Ok(())
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = DialogConfig::new("boss").with_history_limit(10);
        assert_eq!(config.admin_username, "boss");
        assert_eq!(config.history_limit, 10);
        assert_eq!(config.stats_window_months, 3);
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(&*payload), "boom");

        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(&*payload), "bang");

        let payload: Box<dyn Any + Send> = Box::new(42);
        assert_eq!(panic_message(&*payload), "unknown panic");
    }
}
