//! Inline button presses.
//!
//! Callback payloads are `prefix:id:action`. A press is only honored when
//! the current state still offers that button; ids are looked up in the
//! state's own snapshot.

use bot_core::{CallbackData, CallbackQuery, Messenger};
use database::MuscleGroup;
use tracing::{debug, warn};

use crate::engine::{DialogEngine, Turn};
use crate::error::Result;
use crate::menu::ClientAction;
use crate::state::{DialogState, OrgContext, TrainerContext};
use crate::texts;

/// Toast shown when a button no longer matches the state.
const EXPIRED_TOAST: &str = "Кнопка устарела";

impl<M: Messenger> DialogEngine<M> {
    pub(crate) async fn on_callback(
        &self,
        turn: &Turn<'_>,
        state: Option<DialogState>,
        query: &CallbackQuery,
    ) -> Result<()> {
        let toast = match query.parsed() {
            Ok(data) => self.route_callback(turn, state, &data).await?,
            Err(e) => {
                debug!("Ignoring callback from {}: {}", turn.user_id(), e);
                EXPIRED_TOAST
            }
        };

        if let Err(e) = self.messenger.answer_callback(&query.callback_id, toast).await {
            warn!("Failed to answer callback {}: {}", query.callback_id, e);
        }
        Ok(())
    }

    /// Run the action of a button and return the toast text.
    async fn route_callback(
        &self,
        turn: &Turn<'_>,
        state: Option<DialogState>,
        data: &CallbackData,
    ) -> Result<&'static str> {
        let Some(state) = state else {
            return self.expired(turn).await;
        };
        if !state.permitted(&turn.access) {
            self.show_root(turn, Some(texts::ACCESS_REVOKED)).await?;
            return Ok("");
        }

        let id = data.entity_id;
        match (data.prefix.as_str(), data.action.as_str(), state) {
            ("muscle", key, DialogState::AwaitingMuscleGroup { target, resume }) => {
                match MuscleGroup::from_key(key) {
                    Some(group) => self.start_workout(turn, target, resume, group).await?,
                    None => return self.expired(turn).await,
                }
            }
            ("exercise", "finish", DialogState::AddingExercises { session, resume }) => {
                self.finish_workout(turn, session, resume).await?
            }
            ("exercise", "cancel", state @ DialogState::AddingExercises { .. }) => {
                self.cancel(turn, Some(state)).await?
            }
            ("org", "select", DialogState::AdminSelectingOrg { organizations }) => {
                match organizations.iter().find(|o| Some(o.id) == id) {
                    Some(org) => self.open_admin_org(turn, OrgContext::from(org)).await?,
                    None => return self.expired(turn).await,
                }
            }
            ("org", "select", DialogState::ManagerSelectingOrg { organizations }) => {
                match organizations.iter().find(|o| Some(o.organization_id) == id) {
                    Some(org) => self.open_manager_org(turn, OrgContext::from(org)).await?,
                    None => return self.expired(turn).await,
                }
            }
            ("org", "select", DialogState::TrainerSelectingOrg { organizations }) => {
                match organizations.iter().find(|o| Some(o.organization_id) == id) {
                    Some(org) => {
                        self.open_trainer_panel(turn, TrainerContext::from(org))
                            .await?
                    }
                    None => return self.expired(turn).await,
                }
            }
            ("manager", "remove", DialogState::AdminRemovingManager { org, managers }) => {
                match managers.iter().find(|g| Some(g.id) == id) {
                    Some(manager) => self.remove_manager(turn, org, manager).await?,
                    None => return self.expired(turn).await,
                }
            }
            ("trainer", "remove", DialogState::ManagerRemovingTrainer { org, trainers }) => {
                match trainers.iter().find(|g| Some(g.id) == id) {
                    Some(trainer) => self.remove_trainer(turn, org, trainer).await?,
                    None => return self.expired(turn).await,
                }
            }
            ("client", "view", DialogState::TrainerViewingClients { trainer, clients }) => {
                match clients.into_iter().find(|c| Some(c.id) == id) {
                    Some(client) => self.open_client(turn, trainer, client).await?,
                    None => return self.expired(turn).await,
                }
            }
            ("client_action", verb, DialogState::TrainerClientAction { trainer, client })
                if Some(client.id) == id =>
            {
                match ClientAction::from_verb(verb) {
                    Some(action) => self.run_client_action(turn, trainer, client, action).await?,
                    None => return self.expired(turn).await,
                }
            }
            ("group", "join", DialogState::JoiningGroupTraining { trainings, resume }) => {
                match trainings.iter().find(|t| Some(t.id) == id) {
                    Some(training) => self.join_training(turn, training, resume).await?,
                    None => return self.expired(turn).await,
                }
            }
            (_, _, state) => {
                debug!(
                    "Callback {} does not match state {} of {}",
                    data,
                    state.name(),
                    turn.user_id()
                );
                return self.expired(turn).await;
            }
        }
        Ok("")
    }

    async fn expired(&self, turn: &Turn<'_>) -> Result<&'static str> {
        self.reply(turn, texts::STATE_EXPIRED).await?;
        Ok(EXPIRED_TOAST)
    }
}
