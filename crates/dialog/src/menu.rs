//! Button labels and keyboard selection.
//!
//! Everything here is pure: keyboards depend only on [`AccessInfo`] or the
//! current [`DialogState`].

use bot_core::{CallbackData, InlineButton, InlineKeyboard, ReplyKeyboard};
use database::{AccessInfo, MuscleGroup};

use crate::state::DialogState;

pub const MAIN_MENU: &str = "🔙 Главное меню";
pub const CANCEL: &str = "❌ Отмена";
pub const FINISH: &str = "✅ Завершить";
pub const BACK: &str = "🔙 Назад";
pub const ABOUT: &str = "ℹ️ О боте";

pub const ADMIN_PANEL: &str = "👑 Админ-панель";
pub const MANAGE_ORG: &str = "🏢 Управление организацией";
pub const TRAINER_PANEL: &str = "🏋️ Панель тренера";
pub const MY_WORKOUTS: &str = "📝 Мои тренировки";
pub const ARCHIVE: &str = "📚 Архив тренировок";

pub const CREATE_ORG: &str = "🏢 Создать организацию";
pub const LIST_ORGS: &str = "📋 Список организаций";
pub const ADD_MANAGER: &str = "➕ Добавить менеджера";
pub const LIST_MANAGERS: &str = "📋 Список менеджеров";
pub const BACK_TO_ORGS: &str = "🔙 К списку организаций";

pub const ADD_TRAINER: &str = "➕ Добавить тренера";
pub const LIST_TRAINERS: &str = "📋 Список тренеров";

pub const ADD_CLIENT: &str = "➕ Добавить клиента";
pub const MY_CLIENTS: &str = "👥 Мои клиенты";
pub const GROUP_TRAININGS: &str = "📅 Групповые тренировки";
pub const CREATE_GROUP: &str = "➕ Групповая тренировка";
pub const TRAINER_STATS: &str = "📊 Статистика";

pub const ADD_WORKOUT: &str = "➕ Добавить тренировку";
pub const HISTORY: &str = "📋 История тренировок";
pub const MY_STATS: &str = "📊 Моя статистика";

/// Client action choices, keyed by the number the trainer sends.
pub const CLIENT_ACTIONS: [(&str, ClientAction); 4] = [
    ("1", ClientAction::Stats),
    ("2", ClientAction::Workout),
    ("3", ClientAction::History),
    ("4", ClientAction::Delete),
];

/// What a trainer can do with one client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientAction {
    Stats,
    Workout,
    History,
    Delete,
}

impl ClientAction {
    /// Verb used in `client_action:<id>:<verb>` callbacks.
    pub fn verb(self) -> &'static str {
        match self {
            ClientAction::Stats => "stats",
            ClientAction::Workout => "workout",
            ClientAction::History => "history",
            ClientAction::Delete => "delete",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ClientAction::Stats => "📊 Статистика клиента",
            ClientAction::Workout => "➕ Создать тренировку",
            ClientAction::History => "📋 История тренировок",
            ClientAction::Delete => "❌ Удалить клиента",
        }
    }

    pub fn from_verb(verb: &str) -> Option<Self> {
        CLIENT_ACTIONS
            .iter()
            .map(|(_, action)| *action)
            .find(|a| a.verb() == verb)
    }

    /// Parse a typed choice: "1".."4" or the verb.
    pub fn from_choice(text: &str) -> Option<Self> {
        let text = text.trim();
        CLIENT_ACTIONS
            .iter()
            .find(|(number, _)| *number == text)
            .map(|(_, action)| *action)
            .or_else(|| Self::from_verb(text))
    }
}

/// Button label of a muscle group.
pub fn muscle_label(group: MuscleGroup) -> &'static str {
    match group {
        MuscleGroup::Chest => "💪 Грудь",
        MuscleGroup::Back => "🦾 Спина",
        MuscleGroup::Legs => "🦵 Ноги",
        MuscleGroup::Shoulders => "🏋️ Плечи",
        MuscleGroup::Biceps => "💪 Бицепс",
        MuscleGroup::Triceps => "💪 Трицепс",
        MuscleGroup::Abs => "🎯 Пресс",
        MuscleGroup::Cardio => "🏃 Кардио",
    }
}

/// Accept a muscle group button label or its plain name.
pub fn muscle_from_label(text: &str) -> Option<MuscleGroup> {
    let text = text.trim();
    MuscleGroup::ALL
        .into_iter()
        .find(|g| muscle_label(*g) == text)
        .or_else(|| MuscleGroup::from_name(text))
}

/// Root menu for the user's current grants. Never empty.
pub fn root_menu(access: &AccessInfo) -> ReplyKeyboard {
    let mut menu = ReplyKeyboard::new();
    if access.is_admin {
        menu = menu.button(ADMIN_PANEL);
    }
    if !access.active_managers().is_empty() {
        menu = menu.button(MANAGE_ORG);
    }
    if !access.active_trainers().is_empty() {
        menu = menu.button(TRAINER_PANEL);
    }
    if !access.clients.is_empty() {
        menu = menu.button(MY_WORKOUTS);
    }
    if !access.archived.is_empty() {
        menu = menu.button(ARCHIVE);
    }
    menu.button(ABOUT)
}

/// Whether the root menu offers anything beyond the about button.
pub fn has_actions(access: &AccessInfo) -> bool {
    root_menu(access).button_count() > 1
}

pub fn admin_menu() -> ReplyKeyboard {
    ReplyKeyboard::new()
        .row([CREATE_ORG, LIST_ORGS])
        .button(MAIN_MENU)
}

fn admin_org_menu() -> ReplyKeyboard {
    ReplyKeyboard::new()
        .row([ADD_MANAGER, LIST_MANAGERS])
        .button(BACK_TO_ORGS)
        .button(MAIN_MENU)
}

fn manager_menu() -> ReplyKeyboard {
    ReplyKeyboard::new()
        .row([ADD_TRAINER, LIST_TRAINERS])
        .button(MAIN_MENU)
}

pub fn trainer_menu() -> ReplyKeyboard {
    ReplyKeyboard::new()
        .row([ADD_CLIENT, MY_CLIENTS])
        .row([GROUP_TRAININGS, CREATE_GROUP])
        .button(TRAINER_STATS)
        .button(MAIN_MENU)
}

fn client_action_menu() -> ReplyKeyboard {
    ReplyKeyboard::new()
        .row(["1", "2"])
        .row(["3", "4"])
        .button(BACK)
        .button(MAIN_MENU)
}

pub fn client_menu() -> ReplyKeyboard {
    ReplyKeyboard::new()
        .row([ADD_WORKOUT, HISTORY])
        .row([MY_STATS, GROUP_TRAININGS])
        .button(MAIN_MENU)
}

fn muscle_menu() -> ReplyKeyboard {
    let mut menu = ReplyKeyboard::new();
    for pair in MuscleGroup::ALL.chunks(2) {
        menu = menu.row(pair.iter().map(|g| muscle_label(*g)));
    }
    menu.button(CANCEL).button(MAIN_MENU)
}

fn input_menu() -> ReplyKeyboard {
    ReplyKeyboard::new().button(CANCEL).button(MAIN_MENU)
}

fn selection_menu() -> ReplyKeyboard {
    ReplyKeyboard::new().button(MAIN_MENU)
}

/// Keyboard shown while a state is active.
pub fn for_state(state: &DialogState) -> ReplyKeyboard {
    match state {
        DialogState::AdminCreatingOrgName
        | DialogState::AdminCreatingOrgCode { .. }
        | DialogState::AdminAddingManager { .. }
        | DialogState::ManagerAddingTrainer { .. }
        | DialogState::TrainerAddingClient { .. }
        | DialogState::AwaitingExerciseName { .. }
        | DialogState::CreatingGroupTraining { .. } => input_menu(),
        DialogState::AdminSelectingOrg { .. }
        | DialogState::ManagerSelectingOrg { .. }
        | DialogState::TrainerSelectingOrg { .. }
        | DialogState::ClientSelectingTrainer { .. }
        | DialogState::ClientViewingArchive { .. }
        | DialogState::JoiningGroupTraining { .. } => selection_menu(),
        DialogState::AdminManagingOrg { .. } | DialogState::AdminRemovingManager { .. } => {
            admin_org_menu()
        }
        DialogState::ManagerManagingOrg { .. } | DialogState::ManagerRemovingTrainer { .. } => {
            manager_menu()
        }
        DialogState::TrainerManagingOrg { .. } | DialogState::TrainerViewingClients { .. } => {
            trainer_menu()
        }
        DialogState::TrainerClientAction { .. } => client_action_menu(),
        DialogState::ClientWithTrainer { .. } => client_menu(),
        DialogState::AwaitingMuscleGroup { .. } => muscle_menu(),
        DialogState::AddingExercises { .. } => ReplyKeyboard::new()
            .button(FINISH)
            .button(CANCEL)
            .button(MAIN_MENU),
    }
}

/// Inline muscle group picker.
pub fn muscle_buttons() -> InlineKeyboard {
    let mut keyboard = InlineKeyboard::new();
    for pair in MuscleGroup::ALL.chunks(2) {
        keyboard = keyboard.row(
            pair.iter()
                .map(|g| {
                    InlineButton::callback(
                        muscle_label(*g),
                        &CallbackData::action("muscle", g.key()),
                    )
                })
                .collect(),
        );
    }
    keyboard
}

/// Inline finish/cancel buttons for the exercise loop.
pub fn exercise_buttons() -> InlineKeyboard {
    InlineKeyboard::new().row(vec![
        InlineButton::callback(FINISH, &CallbackData::action("exercise", "finish")),
        InlineButton::callback(CANCEL, &CallbackData::action("exercise", "cancel")),
    ])
}

/// Inline client actions bound to one client grant.
pub fn client_action_buttons(client_id: i64) -> InlineKeyboard {
    CLIENT_ACTIONS
        .iter()
        .fold(InlineKeyboard::new(), |keyboard, (_, action)| {
            keyboard.button(
                action.title(),
                &CallbackData::new("client_action", client_id, action.verb()),
            )
        })
}

/// One button per `(id, label)` pair, all with the same prefix and action.
pub fn numbered_buttons<'a, I>(prefix: &str, action: &str, items: I) -> InlineKeyboard
where
    I: IntoIterator<Item = (i64, &'a str)>,
{
    items
        .into_iter()
        .enumerate()
        .fold(InlineKeyboard::new(), |keyboard, (i, (id, label))| {
            keyboard.button(
                format!("{}. {}", i + 1, label),
                &CallbackData::new(prefix, id, action),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::{ClientAccess, GrantStatus, OrgAccess};

    fn org_access(status: GrantStatus) -> OrgAccess {
        OrgAccess {
            grant_id: 1,
            organization_id: 1,
            organization_name: "Alpha".to_string(),
            status,
        }
    }

    fn client_access() -> ClientAccess {
        ClientAccess {
            trainer_client_id: 1,
            organization_id: 1,
            organization_name: "Alpha".to_string(),
            trainer_id: 2,
            trainer_username: "coach".to_string(),
            trainer_telegram_id: None,
        }
    }

    #[test]
    fn test_empty_access_still_has_a_button() {
        let menu = root_menu(&AccessInfo::default());
        assert_eq!(menu.button_count(), 1);
        assert!(menu.contains(ABOUT));
        assert!(!has_actions(&AccessInfo::default()));
    }

    #[test]
    fn test_root_menu_shows_every_role() {
        let access = AccessInfo {
            is_admin: true,
            managers: vec![org_access(GrantStatus::Active)],
            trainers: vec![org_access(GrantStatus::Active)],
            clients: vec![client_access()],
            archived: vec![client_access()],
        };
        let menu = root_menu(&access);
        for label in [ADMIN_PANEL, MANAGE_ORG, TRAINER_PANEL, MY_WORKOUTS, ARCHIVE, ABOUT] {
            assert!(menu.contains(label), "missing {}", label);
        }
    }

    #[test]
    fn test_archived_grants_hide_panels() {
        let access = AccessInfo {
            managers: vec![org_access(GrantStatus::Archived)],
            trainers: vec![org_access(GrantStatus::Archived)],
            ..AccessInfo::default()
        };
        let menu = root_menu(&access);
        assert!(!menu.contains(MANAGE_ORG));
        assert!(!menu.contains(TRAINER_PANEL));
        assert!(!has_actions(&access));
    }

    #[test]
    fn test_muscle_labels_roundtrip() {
        for group in MuscleGroup::ALL {
            assert_eq!(muscle_from_label(muscle_label(group)), Some(group));
        }
        assert_eq!(muscle_from_label("грудь"), Some(MuscleGroup::Chest));
        assert_eq!(muscle_from_label("Ягодицы"), None);
    }

    #[test]
    fn test_client_action_choice() {
        assert_eq!(ClientAction::from_choice("1"), Some(ClientAction::Stats));
        assert_eq!(ClientAction::from_choice(" 4 "), Some(ClientAction::Delete));
        assert_eq!(ClientAction::from_choice("delete"), Some(ClientAction::Delete));
        assert_eq!(ClientAction::from_choice("5"), None);
    }

    #[test]
    fn test_inline_payloads() {
        assert_eq!(
            client_action_buttons(9).callback_data(),
            vec![
                "client_action:9:stats",
                "client_action:9:workout",
                "client_action:9:history",
                "client_action:9:delete"
            ]
        );
        assert_eq!(
            exercise_buttons().callback_data(),
            vec!["exercise::finish", "exercise::cancel"]
        );
        assert_eq!(muscle_buttons().callback_data()[0], "muscle::chest");
        assert_eq!(
            numbered_buttons("manager", "remove", [(4, "boss")]).callback_data(),
            vec!["manager:4:remove"]
        );
    }
}
