//! Group trainings: creation by trainers and joining by clients.

use bot_core::Messenger;
use chrono::Local;
use database::{group_training, user, DatabaseError, GroupTrainingListing, JoinOutcome, NewGroupTraining};
use tracing::{info, warn};

use crate::engine::{DialogEngine, Turn};
use crate::error::Result;
use crate::menu;
use crate::parse::{parse_group_training, parse_index, STORED_DATETIME_FORMAT};
use crate::state::{DialogState, TrainerContext};
use crate::texts;

impl<M: Messenger> DialogEngine<M> {
    /// Upcoming trainings of the trainer's organization, read-only.
    pub(crate) async fn show_group_trainings(
        &self,
        turn: &Turn<'_>,
        trainer: &TrainerContext,
    ) -> Result<()> {
        let trainings =
            group_training::upcoming_group_trainings(self.db.pool(), trainer.organization_id)
                .await?;
        self.reply(turn, &texts::group_training_list(&trainings, false))
            .await
    }

    pub(crate) async fn begin_create_group(
        &self,
        turn: &Turn<'_>,
        trainer: TrainerContext,
    ) -> Result<()> {
        self.enter(
            turn,
            DialogState::CreatingGroupTraining { trainer },
            texts::GROUP_TRAINING_FORMAT,
        )
        .await
    }

    pub(crate) async fn group_training_entered(
        &self,
        turn: &Turn<'_>,
        trainer: TrainerContext,
        text: &str,
    ) -> Result<()> {
        let input = match parse_group_training(text, Local::now().naive_local()) {
            Ok(input) => input,
            Err(e) => {
                let reply = format!("❌ {}\n\n{}", e, texts::GROUP_TRAINING_FORMAT);
                return self.reply(turn, &reply).await;
            }
        };

        let new_training = NewGroupTraining {
            organization_id: trainer.organization_id,
            trainer_id: trainer.trainer_id,
            name: input.name,
            description: input.description,
            scheduled_at: input.scheduled_at.format(STORED_DATETIME_FORMAT).to_string(),
            max_participants: input.max_participants,
        };

        let created = match group_training::create_group_training(self.db.pool(), &new_training).await {
            Ok(created) => created,
            Err(e) => {
                warn!("Failed to create group training: {}", e);
                return self.reply(turn, texts::TRY_AGAIN).await;
            }
        };
        info!(
            "Trainer {} scheduled group training {} at {}",
            trainer.trainer_id, created.id, created.scheduled_at
        );

        let text = format!(
            "✅ Групповая тренировка создана!\n\n{}\n📅 {}\n👥 Мест: {}",
            created.name,
            input.scheduled_at.format(crate::parse::INPUT_DATETIME_FORMAT),
            created.max_participants
        );
        self.enter(turn, DialogState::TrainerManagingOrg { trainer }, &text)
            .await
    }

    /// List upcoming trainings of an organization and wait for a pick.
    pub(crate) async fn list_to_join(
        &self,
        turn: &Turn<'_>,
        organization_id: i64,
        resume: Option<Box<DialogState>>,
    ) -> Result<()> {
        let trainings =
            group_training::upcoming_group_trainings(self.db.pool(), organization_id).await?;
        if trainings.is_empty() {
            return self.reply(turn, texts::NO_GROUP_TRAININGS).await;
        }

        let text = texts::group_training_list(&trainings, true);
        let buttons = menu::numbered_buttons(
            "group",
            "join",
            trainings.iter().map(|t| (t.id, t.name.as_str())),
        );
        self.enter(turn, DialogState::JoiningGroupTraining { trainings, resume }, &text)
            .await?;
        self.send_transient(turn, "Или нажмите, чтобы записаться:", &buttons)
            .await
    }

    pub(crate) async fn training_chosen(
        &self,
        turn: &Turn<'_>,
        trainings: &[GroupTrainingListing],
        resume: Option<Box<DialogState>>,
        text: &str,
    ) -> Result<()> {
        match parse_index(text, trainings.len()) {
            Some(i) => self.join_training(turn, &trainings[i], resume).await,
            None => self.reply(turn, texts::WRONG_NUMBER).await,
        }
    }

    /// Join a listed training. Capacity is re-checked by the database.
    pub(crate) async fn join_training(
        &self,
        turn: &Turn<'_>,
        training: &GroupTrainingListing,
        resume: Option<Box<DialogState>>,
    ) -> Result<()> {
        let user_id = match &turn.user {
            Some(user) => user.id,
            None => user::get_user_by_telegram_id(self.db.pool(), turn.user_id()).await?.id,
        };

        match group_training::join_group_training(self.db.pool(), training.id, user_id).await {
            Ok(JoinOutcome::Joined { participants }) => {
                self.notify_trainer(turn, training, participants).await;
                let text = format!(
                    "✅ Вы записаны на «{}»!\n📅 {}\n👥 {}/{}",
                    training.name, training.scheduled_at, participants, training.max_participants
                );
                self.leave(turn, resume, &text).await
            }
            Ok(JoinOutcome::AlreadyJoined) => {
                self.reply(turn, "Вы уже записаны на эту тренировку.").await
            }
            Ok(JoinOutcome::Full) => self.reply(turn, "К сожалению, все места заняты.").await,
            Err(DatabaseError::NotFound { .. }) => self.reply(turn, texts::STALE_NUMBER).await,
            Err(e) => Err(e.into()),
        }
    }

    async fn notify_trainer(
        &self,
        turn: &Turn<'_>,
        training: &GroupTrainingListing,
        participants: i64,
    ) {
        let Some(trainer_chat) = training.trainer_telegram_id else {
            return;
        };
        if trainer_chat == turn.user_id() {
            return;
        }

        let text = format!(
            "🔔 {} записался на «{}» ({}/{})",
            turn.identity.display_name(),
            training.name,
            participants,
            training.max_participants
        );
        if let Err(e) = self.messenger.send_plain(trainer_chat, &text).await {
            warn!("Failed to notify trainer {}: {}", trainer_chat, e);
        }
    }
}
