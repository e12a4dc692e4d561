//! Client panel and the archive of ended trainer relationships.

use bot_core::Messenger;
use database::{ClientAccess, WorkoutScope};

use crate::engine::{DialogEngine, Turn};
use crate::error::Result;
use crate::menu;
use crate::parse::parse_index;
use crate::state::{DialogState, StatsTarget, WorkoutTarget};
use crate::texts;

impl<M: Messenger> DialogEngine<M> {
    /// Open the only active trainer, or ask which one.
    pub(crate) async fn client_panel(&self, turn: &Turn<'_>) -> Result<()> {
        match turn.access.clients.as_slice() {
            [] => self.reply(turn, "❌ У вас нет активных тренеров.").await,
            [only] => self.open_client_panel(turn, only.clone()).await,
            trainers => {
                let text = texts::trainer_choice_list(trainers);
                self.enter(
                    turn,
                    DialogState::ClientSelectingTrainer {
                        trainers: trainers.to_vec(),
                    },
                    &text,
                )
                .await
            }
        }
    }

    pub(crate) async fn client_trainer_chosen(
        &self,
        turn: &Turn<'_>,
        trainers: &[ClientAccess],
        text: &str,
    ) -> Result<()> {
        match parse_index(text, trainers.len()) {
            Some(i) => self.open_client_panel(turn, trainers[i].clone()).await,
            None => self.reply(turn, texts::WRONG_NUMBER).await,
        }
    }

    async fn open_client_panel(&self, turn: &Turn<'_>, client: ClientAccess) -> Result<()> {
        let text = format!(
            "💪 Тренер: @{}\nОрганизация: {}\n\nВыберите действие:",
            client.trainer_username, client.organization_name
        );
        self.enter(turn, DialogState::ClientWithTrainer { client }, &text)
            .await
    }

    pub(crate) async fn client_panel_action(
        &self,
        turn: &Turn<'_>,
        client: ClientAccess,
        text: &str,
    ) -> Result<()> {
        let scope = WorkoutScope::Grant(client.trainer_client_id);
        match text {
            menu::ADD_WORKOUT => {
                let target = WorkoutTarget {
                    trainer_client_id: Some(client.trainer_client_id),
                    client_telegram_id: Some(turn.user_id()),
                    label: "вас".to_string(),
                };
                let resume = DialogState::ClientWithTrainer { client };
                self.begin_workout(turn, target, Some(Box::new(resume))).await
            }
            menu::HISTORY => self.show_history(turn, scope, "Ваши тренировки").await,
            menu::MY_STATS => {
                let target = StatsTarget {
                    scope,
                    label: "вы".to_string(),
                };
                let resume = DialogState::ClientWithTrainer { client };
                self.begin_stats(turn, target, Some(Box::new(resume))).await
            }
            menu::GROUP_TRAININGS => {
                let organization_id = client.organization_id;
                let resume = DialogState::ClientWithTrainer { client };
                self.list_to_join(turn, organization_id, Some(Box::new(resume)))
                    .await
            }
            _ => self.reply(turn, texts::USE_MENU).await,
        }
    }

    pub(crate) async fn archive_panel(&self, turn: &Turn<'_>) -> Result<()> {
        if turn.access.archived.is_empty() {
            return self.reply(turn, "Архив пуст.").await;
        }

        let archived = turn.access.archived.clone();
        let text = texts::archive_list(&archived);
        self.enter(turn, DialogState::ClientViewingArchive { archived }, &text)
            .await
    }

    /// Show the history kept from an ended relationship.
    pub(crate) async fn archive_chosen(
        &self,
        turn: &Turn<'_>,
        archived: &[ClientAccess],
        text: &str,
    ) -> Result<()> {
        let Some(i) = parse_index(text, archived.len()) else {
            return self.reply(turn, texts::WRONG_NUMBER).await;
        };

        let access = &archived[i];
        let title = format!(
            "Архив: @{} ({})",
            access.trainer_username, access.organization_name
        );
        self.show_history(turn, WorkoutScope::Grant(access.trainer_client_id), &title)
            .await
    }
}
