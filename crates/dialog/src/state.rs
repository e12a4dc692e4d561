//! Dialog states and the context they carry.
//!
//! Every multi-step interaction is one variant of [`DialogState`]. A variant
//! holds exactly what its step needs, including list snapshots that a
//! numbered reply refers back to.

use database::{
    AccessInfo, ClientAccess, ClientSummary, GroupTrainingListing, MuscleGroup, OrgAccess,
    Organization, RoleGrant, WorkoutScope,
};
use serde::{Deserialize, Serialize};

/// Organization picked from a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgContext {
    pub organization_id: i64,
    pub organization_name: String,
}

impl From<&Organization> for OrgContext {
    fn from(org: &Organization) -> Self {
        Self {
            organization_id: org.id,
            organization_name: org.name.clone(),
        }
    }
}

impl From<&OrgAccess> for OrgContext {
    fn from(access: &OrgAccess) -> Self {
        Self {
            organization_id: access.organization_id,
            organization_name: access.organization_name.clone(),
        }
    }
}

/// A trainer grant the user is acting through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainerContext {
    /// Trainer grant id.
    pub trainer_id: i64,
    pub organization_id: i64,
    pub organization_name: String,
}

impl From<&OrgAccess> for TrainerContext {
    fn from(access: &OrgAccess) -> Self {
        Self {
            trainer_id: access.grant_id,
            organization_id: access.organization_id,
            organization_name: access.organization_name.clone(),
        }
    }
}

/// Who a new workout is recorded for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutTarget {
    /// Client-of-trainer grant, or None for a self-tracked workout.
    pub trainer_client_id: Option<i64>,
    pub client_telegram_id: Option<i64>,
    /// Shown in prompts, e.g. "@client".
    pub label: String,
}

/// A workout whose exercises are being entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseSession {
    pub workout_id: i64,
    pub muscle_group: MuscleGroup,
    /// Order assigned to the next saved exercise, starting at 1.
    pub next_order: i64,
    /// Photo received before the exercise text.
    pub staged_photo: Option<String>,
}

impl ExerciseSession {
    pub fn new(workout_id: i64, muscle_group: MuscleGroup) -> Self {
        Self {
            workout_id,
            muscle_group,
            next_order: 1,
            staged_photo: None,
        }
    }

    /// Number of exercises saved so far.
    pub fn saved(&self) -> i64 {
        self.next_order - 1
    }
}

/// Whose progress a stats request covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsTarget {
    pub scope: WorkoutScope,
    pub label: String,
}

/// The single active step of one identity's conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DialogState {
    AdminCreatingOrgName,
    AdminCreatingOrgCode {
        name: String,
    },
    AdminSelectingOrg {
        organizations: Vec<Organization>,
    },
    AdminManagingOrg {
        org: OrgContext,
    },
    AdminAddingManager {
        org: OrgContext,
    },
    AdminRemovingManager {
        org: OrgContext,
        managers: Vec<RoleGrant>,
    },
    ManagerSelectingOrg {
        organizations: Vec<OrgAccess>,
    },
    ManagerManagingOrg {
        org: OrgContext,
    },
    ManagerAddingTrainer {
        org: OrgContext,
    },
    ManagerRemovingTrainer {
        org: OrgContext,
        trainers: Vec<RoleGrant>,
    },
    TrainerSelectingOrg {
        organizations: Vec<OrgAccess>,
    },
    TrainerManagingOrg {
        trainer: TrainerContext,
    },
    TrainerAddingClient {
        trainer: TrainerContext,
    },
    TrainerViewingClients {
        trainer: TrainerContext,
        clients: Vec<ClientSummary>,
    },
    TrainerClientAction {
        trainer: TrainerContext,
        client: ClientSummary,
    },
    ClientSelectingTrainer {
        trainers: Vec<ClientAccess>,
    },
    ClientWithTrainer {
        client: ClientAccess,
    },
    ClientViewingArchive {
        archived: Vec<ClientAccess>,
    },
    AwaitingMuscleGroup {
        target: WorkoutTarget,
        /// State to return to when the workout is done.
        resume: Option<Box<DialogState>>,
    },
    AddingExercises {
        session: ExerciseSession,
        resume: Option<Box<DialogState>>,
    },
    AwaitingExerciseName {
        target: StatsTarget,
        resume: Option<Box<DialogState>>,
    },
    JoiningGroupTraining {
        trainings: Vec<GroupTrainingListing>,
        resume: Option<Box<DialogState>>,
    },
    CreatingGroupTraining {
        trainer: TrainerContext,
    },
}

impl DialogState {
    /// Stable name of the state, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            DialogState::AdminCreatingOrgName => "admin_creating_org_name",
            DialogState::AdminCreatingOrgCode { .. } => "admin_creating_org_code",
            DialogState::AdminSelectingOrg { .. } => "admin_selecting_org",
            DialogState::AdminManagingOrg { .. } => "admin_managing_org",
            DialogState::AdminAddingManager { .. } => "admin_adding_manager",
            DialogState::AdminRemovingManager { .. } => "admin_removing_manager",
            DialogState::ManagerSelectingOrg { .. } => "manager_selecting_org",
            DialogState::ManagerManagingOrg { .. } => "manager_managing_org",
            DialogState::ManagerAddingTrainer { .. } => "manager_adding_trainer",
            DialogState::ManagerRemovingTrainer { .. } => "manager_removing_trainer",
            DialogState::TrainerSelectingOrg { .. } => "trainer_selecting_org",
            DialogState::TrainerManagingOrg { .. } => "trainer_managing_org",
            DialogState::TrainerAddingClient { .. } => "trainer_adding_client",
            DialogState::TrainerViewingClients { .. } => "trainer_viewing_clients",
            DialogState::TrainerClientAction { .. } => "trainer_client_action",
            DialogState::ClientSelectingTrainer { .. } => "client_selecting_trainer",
            DialogState::ClientWithTrainer { .. } => "client_with_trainer",
            DialogState::ClientViewingArchive { .. } => "client_viewing_archive",
            DialogState::AwaitingMuscleGroup { .. } => "awaiting_muscle_group",
            DialogState::AddingExercises { .. } => "adding_exercises",
            DialogState::AwaitingExerciseName { .. } => "awaiting_exercise_name",
            DialogState::JoiningGroupTraining { .. } => "joining_group_training",
            DialogState::CreatingGroupTraining { .. } => "creating_group_training",
        }
    }

    /// Where "cancel" leads from this state, if not to a root menu.
    pub fn parent(&self) -> Option<DialogState> {
        match self {
            DialogState::AdminAddingManager { org } | DialogState::AdminRemovingManager { org, .. } => {
                Some(DialogState::AdminManagingOrg { org: org.clone() })
            }
            DialogState::ManagerAddingTrainer { org }
            | DialogState::ManagerRemovingTrainer { org, .. } => {
                Some(DialogState::ManagerManagingOrg { org: org.clone() })
            }
            DialogState::TrainerAddingClient { trainer }
            | DialogState::TrainerViewingClients { trainer, .. }
            | DialogState::TrainerClientAction { trainer, .. }
            | DialogState::CreatingGroupTraining { trainer } => {
                Some(DialogState::TrainerManagingOrg {
                    trainer: trainer.clone(),
                })
            }
            DialogState::AwaitingMuscleGroup { resume, .. }
            | DialogState::AddingExercises { resume, .. }
            | DialogState::AwaitingExerciseName { resume, .. }
            | DialogState::JoiningGroupTraining { resume, .. } => resume.as_deref().cloned(),
            _ => None,
        }
    }

    /// Whether this is one of the admin-only states.
    pub fn is_admin_flow(&self) -> bool {
        matches!(
            self,
            DialogState::AdminCreatingOrgName
                | DialogState::AdminCreatingOrgCode { .. }
                | DialogState::AdminSelectingOrg { .. }
                | DialogState::AdminManagingOrg { .. }
                | DialogState::AdminAddingManager { .. }
                | DialogState::AdminRemovingManager { .. }
        )
    }

    /// Whether the grants this state acts through are still held.
    ///
    /// States are checked against fresh [`AccessInfo`] on every event, so a
    /// grant archived mid-flow ends the flow instead of acting on it.
    pub fn permitted(&self, access: &AccessInfo) -> bool {
        let manages = |org: &OrgContext| {
            access
                .active_managers()
                .iter()
                .any(|m| m.organization_id == org.organization_id)
        };
        let trains = |trainer: &TrainerContext| {
            access
                .active_trainers()
                .iter()
                .any(|t| t.grant_id == trainer.trainer_id)
        };

        match self {
            DialogState::AdminCreatingOrgName
            | DialogState::AdminCreatingOrgCode { .. }
            | DialogState::AdminSelectingOrg { .. }
            | DialogState::AdminManagingOrg { .. }
            | DialogState::AdminAddingManager { .. }
            | DialogState::AdminRemovingManager { .. } => access.is_admin,
            DialogState::ManagerSelectingOrg { .. } => !access.active_managers().is_empty(),
            DialogState::ManagerManagingOrg { org }
            | DialogState::ManagerAddingTrainer { org }
            | DialogState::ManagerRemovingTrainer { org, .. } => manages(org),
            DialogState::TrainerSelectingOrg { .. } => !access.active_trainers().is_empty(),
            DialogState::TrainerManagingOrg { trainer }
            | DialogState::TrainerAddingClient { trainer }
            | DialogState::TrainerViewingClients { trainer, .. }
            | DialogState::TrainerClientAction { trainer, .. }
            | DialogState::CreatingGroupTraining { trainer } => trains(trainer),
            DialogState::ClientSelectingTrainer { .. } => !access.clients.is_empty(),
            DialogState::ClientWithTrainer { client } => access
                .clients
                .iter()
                .any(|c| c.trainer_client_id == client.trainer_client_id),
            DialogState::ClientViewingArchive { .. } => !access.archived.is_empty(),
            DialogState::AwaitingMuscleGroup { resume, .. }
            | DialogState::AddingExercises { resume, .. }
            | DialogState::AwaitingExerciseName { resume, .. }
            | DialogState::JoiningGroupTraining { resume, .. } => resume
                .as_deref()
                .map_or(true, |parent| parent.permitted(access)),
        }
    }
}
