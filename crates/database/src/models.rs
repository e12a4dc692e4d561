//! Database models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A Telegram user who has talked to the bot at least once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Auto-incrementing ID.
    pub id: i64,
    /// Stable Telegram user id.
    pub telegram_id: i64,
    /// Handle without the leading "@" (may be empty).
    pub username: String,
    /// First and last name as reported by Telegram.
    pub full_name: String,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

/// A gym or studio. Created by the admin only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Organization {
    /// Auto-incrementing ID.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Unique upper-case code.
    pub code: String,
    /// Creation timestamp.
    pub created_at: String,
}

/// Lifecycle of a role grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum GrantStatus {
    /// Granted and currently valid.
    Active,
    /// Revoked but kept for history.
    Archived,
}

impl GrantStatus {
    /// Whether the grant is currently valid.
    pub fn is_active(self) -> bool {
        matches!(self, GrantStatus::Active)
    }

    /// Get the stored string value.
    pub fn as_str(self) -> &'static str {
        match self {
            GrantStatus::Active => "active",
            GrantStatus::Archived => "archived",
        }
    }
}

/// Which grant table a [`RoleGrant`] lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantKind {
    /// Manager of an organization.
    Manager,
    /// Trainer of an organization.
    Trainer,
    /// Client of a trainer.
    Client,
}

impl GrantKind {
    pub(crate) fn table(self) -> &'static str {
        match self {
            GrantKind::Manager => "organization_managers",
            GrantKind::Trainer => "organization_trainers",
            GrantKind::Client => "trainer_clients",
        }
    }

    pub(crate) fn scope_column(self) -> &'static str {
        match self {
            GrantKind::Manager | GrantKind::Trainer => "organization_id",
            GrantKind::Client => "trainer_id",
        }
    }

    /// Entity name used in errors and logs.
    pub fn entity(self) -> &'static str {
        match self {
            GrantKind::Manager => "Manager",
            GrantKind::Trainer => "Trainer",
            GrantKind::Client => "Client",
        }
    }
}

/// A manager-of-org, trainer-of-org or client-of-trainer record.
///
/// `scope_id` is the organization id for managers and trainers, and the
/// trainer grant id for clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct RoleGrant {
    /// Auto-incrementing ID.
    pub id: i64,
    /// Parent organization or trainer grant.
    pub scope_id: i64,
    /// Grantee handle without "@".
    pub username: String,
    /// Filled in once the grantee sends their first message.
    pub telegram_id: Option<i64>,
    /// Lifecycle state.
    pub status: GrantStatus,
    /// When the grant was archived, if it is.
    pub archived_at: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
}

/// A client grant as seen from the trainer's client list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ClientSummary {
    /// Trainer-client grant id.
    pub id: i64,
    /// Trainer grant id.
    pub trainer_id: i64,
    /// Client handle without "@".
    pub username: String,
    /// Linked Telegram id, if known.
    pub telegram_id: Option<i64>,
    /// Lifecycle state.
    pub status: GrantStatus,
    /// Name from the users table, once the client has talked to the bot.
    pub full_name: Option<String>,
    /// Number of workouts recorded under this grant.
    pub workout_count: i64,
    /// Date of the latest workout.
    pub last_workout: Option<String>,
}

/// A manager or trainer grant joined with its organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct OrgAccess {
    /// Grant id (manager or trainer row).
    pub grant_id: i64,
    pub organization_id: i64,
    pub organization_name: String,
    pub status: GrantStatus,
}

/// A client grant joined with its trainer and organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ClientAccess {
    pub trainer_client_id: i64,
    pub organization_id: i64,
    pub organization_name: String,
    pub trainer_id: i64,
    pub trainer_username: String,
    pub trainer_telegram_id: Option<i64>,
}

/// Point-in-time projection of everything one identity may do.
///
/// Computed for every inbound event and never cached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessInfo {
    /// Handle matches the configured admin handle.
    pub is_admin: bool,
    /// Manager grants, active and archived.
    pub managers: Vec<OrgAccess>,
    /// Trainer grants, active and archived.
    pub trainers: Vec<OrgAccess>,
    /// Active client grants whose trainer is also active.
    pub clients: Vec<ClientAccess>,
    /// Archived client grants.
    pub archived: Vec<ClientAccess>,
}

impl AccessInfo {
    /// True when the identity holds nothing at all.
    pub fn is_empty(&self) -> bool {
        !self.is_admin
            && self.managers.is_empty()
            && self.trainers.is_empty()
            && self.clients.is_empty()
            && self.archived.is_empty()
    }

    /// Manager grants that are currently active.
    pub fn active_managers(&self) -> Vec<&OrgAccess> {
        self.managers.iter().filter(|m| m.status.is_active()).collect()
    }

    /// Trainer grants that are currently active.
    pub fn active_trainers(&self) -> Vec<&OrgAccess> {
        self.trainers.iter().filter(|t| t.status.is_active()).collect()
    }
}

/// Closed set of workout targets.
///
/// Stored in the database by its Russian name, which is also what users see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
pub enum MuscleGroup {
    #[sqlx(rename = "Грудь")]
    #[serde(rename = "Грудь")]
    Chest,
    #[sqlx(rename = "Спина")]
    #[serde(rename = "Спина")]
    Back,
    #[sqlx(rename = "Ноги")]
    #[serde(rename = "Ноги")]
    Legs,
    #[sqlx(rename = "Плечи")]
    #[serde(rename = "Плечи")]
    Shoulders,
    #[sqlx(rename = "Бицепс")]
    #[serde(rename = "Бицепс")]
    Biceps,
    #[sqlx(rename = "Трицепс")]
    #[serde(rename = "Трицепс")]
    Triceps,
    #[sqlx(rename = "Пресс")]
    #[serde(rename = "Пресс")]
    Abs,
    #[sqlx(rename = "Кардио")]
    #[serde(rename = "Кардио")]
    Cardio,
}

impl MuscleGroup {
    /// All groups in menu order.
    pub const ALL: [MuscleGroup; 8] = [
        MuscleGroup::Chest,
        MuscleGroup::Back,
        MuscleGroup::Legs,
        MuscleGroup::Shoulders,
        MuscleGroup::Biceps,
        MuscleGroup::Triceps,
        MuscleGroup::Abs,
        MuscleGroup::Cardio,
    ];

    /// Stored and displayed name.
    pub fn as_str(self) -> &'static str {
        match self {
            MuscleGroup::Chest => "Грудь",
            MuscleGroup::Back => "Спина",
            MuscleGroup::Legs => "Ноги",
            MuscleGroup::Shoulders => "Плечи",
            MuscleGroup::Biceps => "Бицепс",
            MuscleGroup::Triceps => "Трицепс",
            MuscleGroup::Abs => "Пресс",
            MuscleGroup::Cardio => "Кардио",
        }
    }

    /// Short ASCII key used in callback data.
    pub fn key(self) -> &'static str {
        match self {
            MuscleGroup::Chest => "chest",
            MuscleGroup::Back => "back",
            MuscleGroup::Legs => "legs",
            MuscleGroup::Shoulders => "shoulders",
            MuscleGroup::Biceps => "biceps",
            MuscleGroup::Triceps => "triceps",
            MuscleGroup::Abs => "abs",
            MuscleGroup::Cardio => "cardio",
        }
    }

    /// Look up a group by its callback key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.key() == key)
    }

    /// Look up a group by its name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|g| g.as_str().to_lowercase() == name)
    }
}

/// A workout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Workout {
    /// Auto-incrementing ID.
    pub id: i64,
    /// Client-of-trainer grant, or None for self-tracked workouts.
    pub trainer_client_id: Option<i64>,
    /// Telegram id of the client, when known.
    pub client_telegram_id: Option<i64>,
    /// Workout date (YYYY-MM-DD).
    pub date: String,
    pub muscle_group: MuscleGroup,
    pub notes: String,
    /// Creation timestamp.
    pub created_at: String,
}

/// Fields for a new workout row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWorkout {
    pub trainer_client_id: Option<i64>,
    pub client_telegram_id: Option<i64>,
    pub date: String,
    pub muscle_group: MuscleGroup,
    pub notes: String,
}

/// One exercise inside a workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Exercise {
    /// Auto-incrementing ID.
    pub id: i64,
    pub workout_id: i64,
    pub name: String,
    pub sets: i64,
    pub reps: i64,
    pub weight: f64,
    pub rest_seconds: Option<i64>,
    /// Telegram file id of an attached photo.
    pub photo_file_id: Option<String>,
    pub notes: Option<String>,
    /// 1-based position in the workout, assigned by the caller.
    #[sqlx(rename = "exercise_order")]
    pub order: i64,
    /// Creation timestamp.
    pub created_at: String,
}

/// Fields for a new exercise row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExercise {
    pub workout_id: i64,
    pub name: String,
    pub sets: i64,
    pub reps: i64,
    pub weight: f64,
    pub rest_seconds: Option<i64>,
    pub photo_file_id: Option<String>,
    pub notes: Option<String>,
    pub order: i64,
}

/// One data point of an exercise's progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ExerciseStat {
    /// Workout date.
    pub date: String,
    pub sets: i64,
    pub reps: i64,
    pub weight: f64,
    pub photo_file_id: Option<String>,
}

/// A workout together with its exercises, for history views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutDetails {
    pub workout: Workout,
    pub exercises: Vec<Exercise>,
}

/// Whose workouts a history or stats query covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum WorkoutScope {
    /// Workouts recorded under one client-of-trainer grant.
    Grant(i64),
    /// Every workout of a Telegram user, with or without a trainer.
    Identity(i64),
}

/// A scheduled group session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct GroupTraining {
    /// Auto-incrementing ID.
    pub id: i64,
    pub organization_id: i64,
    /// Trainer grant that runs the session.
    pub trainer_id: i64,
    pub name: String,
    pub description: String,
    /// Start time, `YYYY-MM-DD HH:MM:SS` in server local time.
    pub scheduled_at: String,
    pub max_participants: i64,
    /// Creation timestamp.
    pub created_at: String,
}

/// Fields for a new group training.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGroupTraining {
    pub organization_id: i64,
    pub trainer_id: i64,
    pub name: String,
    pub description: String,
    pub scheduled_at: String,
    pub max_participants: i64,
}

/// An upcoming group training with its current head count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct GroupTrainingListing {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub scheduled_at: String,
    pub max_participants: i64,
    /// Participants at the time of the query.
    pub participants: i64,
    pub trainer_username: String,
    pub trainer_telegram_id: Option<i64>,
}

impl GroupTrainingListing {
    /// Whether the listing had free spots when it was loaded.
    pub fn has_free_spots(&self) -> bool {
        self.participants < self.max_participants
    }
}

/// Result of a join attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// Joined; carries the new participant count.
    Joined { participants: i64 },
    /// The user was already on the list.
    AlreadyJoined,
    /// No free spots left.
    Full,
}

/// Numbers shown on the trainer's stats screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainerSummary {
    pub active_clients: i64,
    pub archived_clients: i64,
    pub workouts: i64,
    pub upcoming_trainings: i64,
}
