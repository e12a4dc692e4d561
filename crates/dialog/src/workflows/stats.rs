//! Exercise progress and workout history.

use bot_core::{Messenger, Photo};
use chrono::{Local, Months};
use database::{workout, WorkoutScope};
use tracing::warn;

use crate::engine::{DialogEngine, Turn};
use crate::error::Result;
use crate::state::{DialogState, StatsTarget};
use crate::texts;

impl<M: Messenger> DialogEngine<M> {
    pub(crate) async fn begin_stats(
        &self,
        turn: &Turn<'_>,
        target: StatsTarget,
        resume: Option<Box<DialogState>>,
    ) -> Result<()> {
        self.enter(
            turn,
            DialogState::AwaitingExerciseName { target, resume },
            texts::STATS_PROMPT,
        )
        .await
    }

    /// Reply with the progress of one exercise, then return to `resume`.
    ///
    /// An unknown exercise keeps the prompt open.
    pub(crate) async fn exercise_name_entered(
        &self,
        turn: &Turn<'_>,
        target: StatsTarget,
        resume: Option<Box<DialogState>>,
        text: &str,
    ) -> Result<()> {
        if text.is_empty() {
            return self.reply(turn, texts::STATS_PROMPT).await;
        }

        let months = self.config.stats_window_months;
        let today = Local::now().date_naive();
        let since = today
            .checked_sub_months(Months::new(months))
            .unwrap_or(today)
            .format("%Y-%m-%d")
            .to_string();

        let stats = workout::exercise_stats(self.db.pool(), target.scope, text, &since).await?;
        let Some(newest) = stats.first() else {
            let reply = format!(
                "Упражнение «{}» не найдено за последние {} мес. Введите другое название:",
                text, months
            );
            return self.reply(turn, &reply).await;
        };

        let summary = texts::exercise_progress(text, &target.label, months, &stats);
        self.reply_html(turn, &summary).await?;

        if let Some(file_id) = &newest.photo_file_id {
            let caption = format!("{} ({})", text, newest.date);
            if let Err(e) = self
                .messenger
                .send_photo(turn.chat_id, &Photo::FileId(file_id.clone()), &caption)
                .await
            {
                warn!("Failed to resend exercise photo: {}", e);
            }
        }

        self.leave(turn, resume, "Готово. Выберите действие:").await
    }

    /// Reply with the most recent workouts of a scope.
    pub(crate) async fn show_history(
        &self,
        turn: &Turn<'_>,
        scope: WorkoutScope,
        title: &str,
    ) -> Result<()> {
        let workouts =
            workout::recent_workouts(self.db.pool(), scope, self.config.history_limit).await?;
        self.reply_html(turn, &texts::workout_history(title, &workouts))
            .await
    }
}
