//! Workout recording: muscle group choice and the exercise loop.

use bot_core::{InboundMessage, Messenger};
use chrono::Local;
use database::{workout, MuscleGroup, NewExercise, NewWorkout};
use tracing::{debug, info, warn};

use crate::engine::{DialogEngine, Turn};
use crate::error::Result;
use crate::menu;
use crate::parse::{parse_exercise, ExerciseInput};
use crate::state::{DialogState, ExerciseSession, WorkoutTarget};
use crate::texts;

type Resume = Option<Box<DialogState>>;

impl<M: Messenger> DialogEngine<M> {
    /// Ask for the muscle group of a new workout.
    pub(crate) async fn begin_workout(
        &self,
        turn: &Turn<'_>,
        target: WorkoutTarget,
        resume: Resume,
    ) -> Result<()> {
        let text = format!("🏋️ Новая тренировка для {}\n\n{}", target.label, texts::MUSCLE_PROMPT);
        self.enter(turn, DialogState::AwaitingMuscleGroup { target, resume }, &text)
            .await?;
        self.send_transient(turn, texts::MUSCLE_PROMPT, &menu::muscle_buttons())
            .await
    }

    pub(crate) async fn muscle_entered(
        &self,
        turn: &Turn<'_>,
        target: WorkoutTarget,
        resume: Resume,
        text: &str,
    ) -> Result<()> {
        match menu::muscle_from_label(text) {
            Some(group) => self.start_workout(turn, target, resume, group).await,
            None => self.reply(turn, texts::MUSCLE_RETRY).await,
        }
    }

    /// Create the workout row and open the exercise loop.
    pub(crate) async fn start_workout(
        &self,
        turn: &Turn<'_>,
        target: WorkoutTarget,
        resume: Resume,
        muscle_group: MuscleGroup,
    ) -> Result<()> {
        let new_workout = NewWorkout {
            trainer_client_id: target.trainer_client_id,
            client_telegram_id: target.client_telegram_id,
            date: Local::now().date_naive().format("%Y-%m-%d").to_string(),
            muscle_group,
            notes: String::new(),
        };

        let created = match workout::create_workout(self.db.pool(), &new_workout).await {
            Ok(created) => created,
            Err(e) => {
                warn!("Failed to create workout for {}: {}", turn.user_id(), e);
                return self.reply(turn, texts::TRY_AGAIN).await;
            }
        };
        info!(
            "Workout {} started by {} ({})",
            created.id,
            turn.user_id(),
            muscle_group.as_str()
        );

        let text = format!(
            "Группа мышц: {}\n\nОтправьте упражнение в формате:\n{}\n\nК упражнению можно приложить фото.",
            menu::muscle_label(muscle_group),
            texts::EXERCISE_FORMAT
        );
        let session = ExerciseSession::new(created.id, muscle_group);
        self.enter(turn, DialogState::AddingExercises { session, resume }, &text)
            .await?;
        self.send_transient(turn, "Когда закончите:", &menu::exercise_buttons())
            .await
    }

    /// One step of the exercise loop: a photo, an exercise block or finish.
    pub(crate) async fn exercise_entered(
        &self,
        turn: &Turn<'_>,
        mut session: ExerciseSession,
        resume: Resume,
        message: &InboundMessage,
    ) -> Result<()> {
        let text = message.text.trim();
        if text == menu::FINISH {
            return self.finish_workout(turn, session, resume).await;
        }

        let photo = message.largest_photo();
        if let Some(photo) = photo {
            session.staged_photo = Some(photo.to_string());
            if text.is_empty() {
                debug!("Staged photo for workout {}", session.workout_id);
                self.store
                    .set(turn.user_id(), DialogState::AddingExercises { session, resume })
                    .await;
                return self.reply(turn, texts::PHOTO_STAGED).await;
            }
        }

        match parse_exercise(text) {
            Ok(input) => self.save_exercise(turn, session, resume, input).await,
            Err(e) => {
                let mut reply = format!("❌ {}\n\nФормат:\n{}", e, texts::EXERCISE_FORMAT);
                if photo.is_some() {
                    // Keep the photo for the next exercise block
                    self.store
                        .set(turn.user_id(), DialogState::AddingExercises { session, resume })
                        .await;
                    reply.push_str("\n\n");
                    reply.push_str(texts::PHOTO_KEPT);
                }
                self.reply(turn, &reply).await
            }
        }
    }

    /// Persist one exercise with the next order number and any staged photo.
    async fn save_exercise(
        &self,
        turn: &Turn<'_>,
        mut session: ExerciseSession,
        resume: Resume,
        input: ExerciseInput,
    ) -> Result<()> {
        let new_exercise = NewExercise {
            workout_id: session.workout_id,
            name: input.name,
            sets: input.sets,
            reps: input.reps,
            weight: input.weight,
            rest_seconds: None,
            photo_file_id: session.staged_photo.take(),
            notes: None,
            order: session.next_order,
        };

        let saved = match workout::add_exercise(self.db.pool(), &new_exercise).await {
            Ok(saved) => saved,
            Err(e) => {
                warn!("Failed to save exercise for workout {}: {}", session.workout_id, e);
                return self.reply(turn, texts::TRY_AGAIN).await;
            }
        };

        session.next_order += 1;
        let photo_note = if saved.photo_file_id.is_some() {
            " 📷"
        } else {
            ""
        };
        let text = format!(
            "✅ Упражнение {} сохранено: {} {}×{}, {:.1} кг{}\n\nОтправьте следующее упражнение или нажмите «{}».",
            saved.order, saved.name, saved.sets, saved.reps, saved.weight, photo_note, menu::FINISH
        );
        self.store
            .set(turn.user_id(), DialogState::AddingExercises { session, resume })
            .await;
        self.reply(turn, &text).await
    }

    pub(crate) async fn finish_workout(
        &self,
        turn: &Turn<'_>,
        session: ExerciseSession,
        resume: Resume,
    ) -> Result<()> {
        info!(
            "Workout {} finished with {} exercises",
            session.workout_id,
            session.saved()
        );
        let text = match session.saved() {
            0 => "Тренировка сохранена без упражнений.".to_string(),
            n => format!("Тренировка сохранена! 💪\nУпражнений: {}", n),
        };
        self.leave(turn, resume, &text).await
    }
}
