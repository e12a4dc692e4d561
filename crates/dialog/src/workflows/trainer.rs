//! Trainer panel: clients, the client action menu and the summary.

use bot_core::Messenger;
use database::{grant, workout, ClientSummary, GrantKind, OrgAccess, WorkoutScope};
use tracing::info;

use super::manager::org_buttons;
use crate::engine::{DialogEngine, Turn};
use crate::error::Result;
use crate::menu::{self, ClientAction};
use crate::parse::{parse_index, strip_remove_command};
use crate::state::{DialogState, StatsTarget, TrainerContext, WorkoutTarget};
use crate::texts;

impl<M: Messenger> DialogEngine<M> {
    pub(crate) async fn trainer_panel(&self, turn: &Turn<'_>) -> Result<()> {
        let organizations: Vec<OrgAccess> =
            turn.access.active_trainers().into_iter().cloned().collect();

        match organizations.as_slice() {
            [] => self.reply(turn, "❌ Вы не являетесь тренером ни в одной организации.").await,
            [only] => self.open_trainer_panel(turn, TrainerContext::from(only)).await,
            _ => {
                let text = texts::org_access_list(&organizations);
                let buttons = org_buttons(&organizations);
                self.enter(turn, DialogState::TrainerSelectingOrg { organizations }, &text)
                    .await?;
                self.send_transient(turn, "Или нажмите на организацию:", &buttons)
                    .await
            }
        }
    }

    pub(crate) async fn trainer_org_chosen(
        &self,
        turn: &Turn<'_>,
        organizations: &[OrgAccess],
        text: &str,
    ) -> Result<()> {
        match parse_index(text, organizations.len()) {
            Some(i) => {
                self.open_trainer_panel(turn, TrainerContext::from(&organizations[i]))
                    .await
            }
            None => self.reply(turn, texts::WRONG_NUMBER).await,
        }
    }

    pub(crate) async fn open_trainer_panel(
        &self,
        turn: &Turn<'_>,
        trainer: TrainerContext,
    ) -> Result<()> {
        let text = format!(
            "🏋️ Панель тренера\nОрганизация: {}\n\nВыберите действие:",
            trainer.organization_name
        );
        self.enter(turn, DialogState::TrainerManagingOrg { trainer }, &text)
            .await
    }

    pub(crate) async fn trainer_managing(
        &self,
        turn: &Turn<'_>,
        trainer: TrainerContext,
        text: &str,
    ) -> Result<()> {
        match text {
            menu::ADD_CLIENT => {
                let prompt = texts::handle_prompt(GrantKind::Client);
                self.enter(turn, DialogState::TrainerAddingClient { trainer }, prompt)
                    .await
            }
            menu::MY_CLIENTS => self.list_clients(turn, trainer, None).await,
            menu::GROUP_TRAININGS => self.show_group_trainings(turn, &trainer).await,
            menu::CREATE_GROUP => self.begin_create_group(turn, trainer).await,
            menu::TRAINER_STATS => self.trainer_summary(turn, &trainer).await,
            _ => self.reply(turn, texts::USE_MENU).await,
        }
    }

    pub(crate) async fn client_entered(
        &self,
        turn: &Turn<'_>,
        trainer: TrainerContext,
        text: &str,
    ) -> Result<()> {
        let (scope_id, scope_name) = (trainer.trainer_id, trainer.organization_name.clone());
        self.grant_from_text(
            turn,
            GrantKind::Client,
            scope_id,
            &scope_name,
            text,
            DialogState::TrainerManagingOrg { trainer },
        )
        .await
    }

    /// Show the numbered client list, optionally after a notice.
    async fn list_clients(
        &self,
        turn: &Turn<'_>,
        trainer: TrainerContext,
        notice: Option<String>,
    ) -> Result<()> {
        let clients = grant::list_clients(self.db.pool(), trainer.trainer_id).await?;
        let mut text = notice.map(|n| format!("{}\n\n", n)).unwrap_or_default();

        if clients.is_empty() {
            text.push_str("У вас пока нет клиентов.");
            return self
                .enter(turn, DialogState::TrainerManagingOrg { trainer }, &text)
                .await;
        }

        text.push_str(&texts::client_list(&trainer.organization_name, &clients));
        let buttons = menu::numbered_buttons(
            "client",
            "view",
            clients.iter().map(|c| (c.id, c.username.as_str())),
        );
        self.enter(turn, DialogState::TrainerViewingClients { trainer, clients }, &text)
            .await?;
        self.send_transient(turn, "Или нажмите на клиента:", &buttons)
            .await
    }

    pub(crate) async fn trainer_viewing_clients(
        &self,
        turn: &Turn<'_>,
        trainer: TrainerContext,
        clients: &[ClientSummary],
        text: &str,
    ) -> Result<()> {
        if let Some(number) = strip_remove_command(text) {
            return match parse_index(number, clients.len()) {
                Some(i) => self.remove_client(turn, trainer, &clients[i]).await,
                None => self.reply(turn, texts::STALE_NUMBER).await,
            };
        }

        match parse_index(text, clients.len()) {
            Some(i) => self.open_client(turn, trainer, clients[i].clone()).await,
            None => self.trainer_managing(turn, trainer, text).await,
        }
    }

    /// Show a client card with its action menu.
    pub(crate) async fn open_client(
        &self,
        turn: &Turn<'_>,
        trainer: TrainerContext,
        client: ClientSummary,
    ) -> Result<()> {
        let text = texts::client_card(&client);
        let buttons = menu::client_action_buttons(client.id);
        self.enter(turn, DialogState::TrainerClientAction { trainer, client }, &text)
            .await?;
        self.send_transient(turn, "Выберите действие:", &buttons)
            .await
    }

    pub(crate) async fn client_action_chosen(
        &self,
        turn: &Turn<'_>,
        trainer: TrainerContext,
        client: ClientSummary,
        text: &str,
    ) -> Result<()> {
        if text == menu::BACK {
            return self.list_clients(turn, trainer, None).await;
        }

        match ClientAction::from_choice(text) {
            Some(action) => self.run_client_action(turn, trainer, client, action).await,
            None => self.reply(turn, "❌ Неверный номер действия.").await,
        }
    }

    pub(crate) async fn run_client_action(
        &self,
        turn: &Turn<'_>,
        trainer: TrainerContext,
        client: ClientSummary,
        action: ClientAction,
    ) -> Result<()> {
        let label = format!("@{}", client.username);
        match action {
            ClientAction::Stats => {
                let target = StatsTarget {
                    scope: WorkoutScope::Grant(client.id),
                    label,
                };
                let resume = DialogState::TrainerClientAction { trainer, client };
                self.begin_stats(turn, target, Some(Box::new(resume))).await
            }
            ClientAction::Workout => {
                if !client.status.is_active() {
                    return self
                        .reply(turn, "❌ Клиент деактивирован. Новую тренировку записать нельзя.")
                        .await;
                }
                let target = WorkoutTarget {
                    trainer_client_id: Some(client.id),
                    client_telegram_id: client.telegram_id,
                    label,
                };
                let resume = DialogState::TrainerClientAction { trainer, client };
                self.begin_workout(turn, target, Some(Box::new(resume))).await
            }
            ClientAction::History => {
                let title = format!("История тренировок {}", label);
                self.show_history(turn, WorkoutScope::Grant(client.id), &title)
                    .await
            }
            ClientAction::Delete => {
                if !client.status.is_active() {
                    return self.reply(turn, "❌ Клиент уже деактивирован.").await;
                }
                self.remove_client(turn, trainer, &client).await
            }
        }
    }

    async fn remove_client(
        &self,
        turn: &Turn<'_>,
        trainer: TrainerContext,
        client: &ClientSummary,
    ) -> Result<()> {
        let text = self
            .archive_outcome(
                GrantKind::Client,
                trainer.trainer_id,
                &trainer.organization_name,
                &client.username,
            )
            .await;
        info!(
            "Trainer {} removed client @{}: {}",
            trainer.trainer_id, client.username, text
        );
        self.list_clients(turn, trainer, Some(text)).await
    }

    async fn trainer_summary(&self, turn: &Turn<'_>, trainer: &TrainerContext) -> Result<()> {
        let summary = workout::trainer_summary(self.db.pool(), trainer.trainer_id).await?;
        let text = format!(
            "📊 Статистика тренера ({})\n\n👥 Активных клиентов: {}\n📚 В архиве: {}\n🏋️ Тренировок записано: {}\n📅 Групповых тренировок впереди: {}",
            trainer.organization_name,
            summary.active_clients,
            summary.archived_clients,
            summary.workouts,
            summary.upcoming_trainings
        );
        self.reply(turn, &text).await
    }
}
