//! Routing, escapes, callbacks and failure handling.

mod common;

use common::*;
use database::{
    grant, workout, AccessInfo, ClientAccess, ClientSummary, GrantKind, GrantStatus,
    GroupTrainingListing, MuscleGroup, OrgAccess, Organization, RoleGrant, WorkoutScope,
};
use dialog::{
    menu, texts, DialogState, ExerciseSession, OrgContext, StatsTarget, TrainerContext,
    WorkoutTarget,
};
use mock_messenger::{RecordingMessenger, Sent};

fn org_context() -> OrgContext {
    OrgContext {
        organization_id: 1,
        organization_name: "Alpha".to_string(),
    }
}

fn trainer_context() -> TrainerContext {
    TrainerContext {
        trainer_id: 1,
        organization_id: 1,
        organization_name: "Alpha".to_string(),
    }
}

fn client_access() -> ClientAccess {
    ClientAccess {
        trainer_client_id: 1,
        organization_id: 1,
        organization_name: "Alpha".to_string(),
        trainer_id: 1,
        trainer_username: "coach".to_string(),
        trainer_telegram_id: None,
    }
}

fn client_summary() -> ClientSummary {
    ClientSummary {
        id: 1,
        trainer_id: 1,
        username: "client".to_string(),
        telegram_id: None,
        status: GrantStatus::Active,
        full_name: None,
        workout_count: 0,
        last_workout: None,
    }
}

fn role_grant() -> RoleGrant {
    RoleGrant {
        id: 1,
        scope_id: 1,
        username: "someone".to_string(),
        telegram_id: None,
        status: GrantStatus::Active,
        archived_at: None,
        created_at: "2026-01-01 00:00:00".to_string(),
    }
}

/// One instance of every state.
fn every_state() -> Vec<DialogState> {
    let resume = Some(Box::new(DialogState::ClientWithTrainer {
        client: client_access(),
    }));
    vec![
        DialogState::AdminCreatingOrgName,
        DialogState::AdminCreatingOrgCode {
            name: "Alpha".to_string(),
        },
        DialogState::AdminSelectingOrg {
            organizations: vec![Organization {
                id: 1,
                name: "Alpha".to_string(),
                code: "ALPHA".to_string(),
                created_at: "2026-01-01 00:00:00".to_string(),
            }],
        },
        DialogState::AdminManagingOrg { org: org_context() },
        DialogState::AdminAddingManager { org: org_context() },
        DialogState::AdminRemovingManager {
            org: org_context(),
            managers: vec![role_grant()],
        },
        DialogState::ManagerSelectingOrg {
            organizations: vec![OrgAccess {
                grant_id: 1,
                organization_id: 1,
                organization_name: "Alpha".to_string(),
                status: GrantStatus::Active,
            }],
        },
        DialogState::ManagerManagingOrg { org: org_context() },
        DialogState::ManagerAddingTrainer { org: org_context() },
        DialogState::ManagerRemovingTrainer {
            org: org_context(),
            trainers: vec![role_grant()],
        },
        DialogState::TrainerSelectingOrg {
            organizations: Vec::new(),
        },
        DialogState::TrainerManagingOrg {
            trainer: trainer_context(),
        },
        DialogState::TrainerAddingClient {
            trainer: trainer_context(),
        },
        DialogState::TrainerViewingClients {
            trainer: trainer_context(),
            clients: vec![client_summary()],
        },
        DialogState::TrainerClientAction {
            trainer: trainer_context(),
            client: client_summary(),
        },
        DialogState::ClientSelectingTrainer {
            trainers: vec![client_access()],
        },
        DialogState::ClientWithTrainer {
            client: client_access(),
        },
        DialogState::ClientViewingArchive {
            archived: vec![client_access()],
        },
        DialogState::AwaitingMuscleGroup {
            target: WorkoutTarget {
                trainer_client_id: None,
                client_telegram_id: Some(1),
                label: "вас".to_string(),
            },
            resume: None,
        },
        DialogState::AddingExercises {
            session: ExerciseSession::new(1, MuscleGroup::Chest),
            resume: resume.clone(),
        },
        DialogState::AwaitingExerciseName {
            target: StatsTarget {
                scope: WorkoutScope::Identity(1),
                label: "вы".to_string(),
            },
            resume: resume.clone(),
        },
        DialogState::JoiningGroupTraining {
            trainings: vec![GroupTrainingListing {
                id: 1,
                name: "Йога".to_string(),
                description: String::new(),
                scheduled_at: "2030-01-01 10:00:00".to_string(),
                max_participants: 5,
                participants: 0,
                trainer_username: "coach".to_string(),
                trainer_telegram_id: None,
            }],
            resume,
        },
        DialogState::CreatingGroupTraining {
            trainer: trainer_context(),
        },
    ]
}

#[tokio::test]
async fn test_main_menu_escapes_every_state() {
    let engine = setup().await;
    let admin = admin();
    let expected = menu::root_menu(&AccessInfo {
        is_admin: true,
        ..AccessInfo::default()
    });

    for state in every_state() {
        let name = state.name();
        engine.store().set(admin.user_id, state).await;

        say(&engine, &admin, menu::MAIN_MENU).await;

        assert_eq!(state_name(&engine, &admin).await, None, "state {} survived", name);
        assert_eq!(engine.messenger().last_menu().await, Some(expected.clone()), "{}", name);
    }
}

#[tokio::test]
async fn test_no_access_gets_info_and_a_button() {
    let engine = setup().await;
    let stranger = user(50, "stranger");

    say(&engine, &stranger, "/start").await;

    let text = last_text(&engine).await;
    assert!(text.contains("нет доступа"));
    assert!(text.contains("@stranger"));
    let menu = engine.messenger().last_menu().await.unwrap();
    assert_eq!(menu.button_count(), 1);
    assert!(menu.contains(menu::ABOUT));
}

#[tokio::test]
async fn test_all_grants_archived() {
    let engine = setup().await;
    let gym = seed_gym(&engine).await;
    let pool = engine.database().pool();
    grant::archive_grant(pool, GrantKind::Trainer, gym.org.id, "coach")
        .await
        .unwrap();

    say(&engine, &user(2, "coach"), "/start").await;

    assert_eq!(last_text(&engine).await, texts::ALL_ACCESS_ARCHIVED);
    assert_eq!(engine.messenger().last_menu().await.unwrap().button_count(), 1);
}

#[tokio::test]
async fn test_unknown_command_and_free_text() {
    let engine = setup().await;
    let stranger = user(50, "stranger");

    say(&engine, &stranger, "/dance").await;
    assert_eq!(last_text(&engine).await, texts::UNKNOWN_COMMAND);

    say(&engine, &stranger, "привет").await;
    assert_eq!(last_text(&engine).await, texts::USE_MENU);
    assert!(engine.messenger().last_menu().await.is_some());
}

#[tokio::test]
async fn test_photos_do_not_break_exercise_order() {
    let engine = setup().await;
    let athlete = user(7, "solo");
    let pool = engine.database().pool();

    say(&engine, &athlete, "/workout").await;
    say(&engine, &athlete, "Спина").await;
    let workout_id = match engine.store().get(athlete.user_id).await {
        Some(DialogState::AddingExercises { session, .. }) => session.workout_id,
        other => panic!("unexpected state {:?}", other),
    };

    send_photo(&engine, &athlete, "file-a", "").await;
    assert_eq!(last_text(&engine).await, texts::PHOTO_STAGED);
    say(&engine, &athlete, "Тяга\n4\n8\n60").await;

    send_photo(&engine, &athlete, "file-b", "Подтягивания\n3\n10\n0").await;
    send_photo(&engine, &athlete, "file-c", "").await;
    send_photo(&engine, &athlete, "file-d", "").await;
    say(&engine, &athlete, "Гиперэкстензия\n3\n15\n0").await;
    say(&engine, &athlete, "Планка\n3\n1\n0").await;

    let exercises = workout::list_exercises(pool, workout_id).await.unwrap();
    let orders: Vec<i64> = exercises.iter().map(|e| e.order).collect();
    assert_eq!(orders, vec![1, 2, 3, 4]);

    let photos: Vec<Option<&str>> = exercises
        .iter()
        .map(|e| e.photo_file_id.as_deref())
        .collect();
    // The latest staged photo wins
    assert_eq!(photos, vec![Some("file-a"), Some("file-b"), Some("file-d"), None]);
}

#[tokio::test]
async fn test_photo_with_bad_caption_is_kept() {
    let engine = setup().await;
    let athlete = user(7, "solo");
    let pool = engine.database().pool();

    say(&engine, &athlete, "/workout").await;
    say(&engine, &athlete, "Ноги").await;
    let workout_id = match engine.store().get(athlete.user_id).await {
        Some(DialogState::AddingExercises { session, .. }) => session.workout_id,
        other => panic!("unexpected state {:?}", other),
    };

    send_photo(&engine, &athlete, "file-squat", "Присед 3x8x100").await;
    let reply = last_text(&engine).await;
    assert!(reply.starts_with("❌"));
    assert!(reply.contains(texts::PHOTO_KEPT));

    say(&engine, &athlete, "Присед\n3\n8\n100").await;
    let exercises = workout::list_exercises(pool, workout_id).await.unwrap();
    assert_eq!(exercises.len(), 1);
    assert_eq!(exercises[0].photo_file_id.as_deref(), Some("file-squat"));
}

#[tokio::test]
async fn test_cancel_keeps_saved_exercises() {
    let engine = setup().await;
    let athlete = user(7, "solo");

    say(&engine, &athlete, "/workout").await;
    say(&engine, &athlete, "Грудь").await;
    say(&engine, &athlete, "Жим лежа\n4\n10\n80").await;
    say(&engine, &athlete, menu::CANCEL).await;

    assert_eq!(state_name(&engine, &athlete).await, None);
    assert!(last_text(&engine).await.contains("(1)"));

    let history = workout::recent_workouts(
        engine.database().pool(),
        WorkoutScope::Identity(athlete.user_id),
        5,
    )
    .await
    .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].exercises.len(), 1);
}

#[tokio::test]
async fn test_cancel_returns_to_parent_step() {
    let engine = setup().await;
    seed_gym(&engine).await;
    let coach = user(2, "coach");
    let admin = admin();

    say(&engine, &coach, menu::TRAINER_PANEL).await;
    say(&engine, &coach, menu::ADD_CLIENT).await;
    say(&engine, &coach, menu::CANCEL).await;
    assert_eq!(state_name(&engine, &coach).await, Some("trainer_managing_org"));

    say(&engine, &admin, menu::CREATE_ORG).await;
    say(&engine, &admin, "/cancel").await;
    assert_eq!(state_name(&engine, &admin).await, None);
    assert!(engine
        .messenger()
        .last_menu()
        .await
        .unwrap()
        .contains(menu::CREATE_ORG));
}

#[tokio::test]
async fn test_trainer_records_workout_for_client() {
    let engine = setup().await;
    let gym = seed_gym(&engine).await;
    let coach = user(2, "coach");

    say(&engine, &coach, menu::TRAINER_PANEL).await;
    say(&engine, &coach, menu::MY_CLIENTS).await;
    say(&engine, &coach, "1").await;
    say(&engine, &coach, "2").await;
    assert_eq!(state_name(&engine, &coach).await, Some("awaiting_muscle_group"));

    say(&engine, &coach, "Ноги").await;
    say(&engine, &coach, "Присед\n5\n5\n100").await;
    say(&engine, &coach, menu::FINISH).await;

    // Back on the client card
    assert_eq!(state_name(&engine, &coach).await, Some("trainer_client_action"));

    let history = workout::recent_workouts(
        engine.database().pool(),
        WorkoutScope::Grant(gym.client_id),
        5,
    )
    .await
    .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].workout.trainer_client_id, Some(gym.client_id));
    assert_eq!(history[0].exercises[0].name, "Присед");

    say(&engine, &coach, "3").await;
    assert!(last_text(&engine).await.contains("Присед"));
}

#[tokio::test]
async fn test_inline_buttons_drive_the_workout() {
    let engine = setup().await;
    let athlete = user(7, "solo");

    say(&engine, &athlete, "/workout").await;
    let buttons = engine.messenger().last_inline().await.unwrap();
    assert!(buttons.callback_data().contains(&"muscle::legs"));

    press(&engine, &athlete, "muscle::legs").await;
    assert_eq!(state_name(&engine, &athlete).await, Some("adding_exercises"));
    // The muscle picker is gone once the step changed
    assert!(!engine.messenger().deleted().await.is_empty());

    say(&engine, &athlete, "Выпады\n3\n12\n20").await;
    press(&engine, &athlete, "exercise::finish").await;
    assert_eq!(state_name(&engine, &athlete).await, None);

    let answered = engine.messenger().answered_callbacks().await;
    assert_eq!(answered, vec!["cb-muscle::legs", "cb-exercise::finish"]);
}

#[tokio::test]
async fn test_stale_callback_is_answered() {
    let engine = setup().await;
    let athlete = user(7, "solo");

    press(&engine, &athlete, "muscle::legs").await;
    assert_eq!(last_text(&engine).await, texts::STATE_EXPIRED);

    press(&engine, &athlete, "garbage").await;
    assert_eq!(engine.messenger().answered_callbacks().await.len(), 2);
    assert_eq!(state_name(&engine, &athlete).await, None);
}

#[tokio::test]
async fn test_client_view_callback_uses_snapshot() {
    let engine = setup().await;
    let gym = seed_gym(&engine).await;
    let coach = user(2, "coach");

    say(&engine, &coach, menu::TRAINER_PANEL).await;
    say(&engine, &coach, menu::MY_CLIENTS).await;

    press(&engine, &coach, &format!("client:{}:view", gym.client_id)).await;
    assert_eq!(state_name(&engine, &coach).await, Some("trainer_client_action"));

    press(&engine, &coach, &format!("client_action:{}:history", gym.client_id)).await;
    assert_eq!(last_text(&engine).await, texts::NO_WORKOUTS);

    // A button for another client does nothing
    press(&engine, &coach, "client_action:999:delete").await;
    assert_eq!(last_text(&engine).await, texts::STATE_EXPIRED);
}

#[tokio::test]
async fn test_revoked_access_ends_flow() {
    let engine = setup().await;
    let gym = seed_gym(&engine).await;
    let coach = user(2, "coach");

    say(&engine, &coach, menu::TRAINER_PANEL).await;
    say(&engine, &coach, menu::ADD_CLIENT).await;

    grant::archive_grant(engine.database().pool(), GrantKind::Trainer, gym.org.id, "coach")
        .await
        .unwrap();

    say(&engine, &coach, "@late").await;
    assert_eq!(last_text(&engine).await, texts::ACCESS_REVOKED);
    assert_eq!(state_name(&engine, &coach).await, None);
    let late = grant::find_grant(engine.database().pool(), GrantKind::Client, gym.trainer_id, "late")
        .await
        .unwrap();
    assert!(late.is_none());
}

#[tokio::test]
async fn test_failure_clears_state_and_apologizes() {
    let engine = setup_with(RecordingMessenger::failing_on("Введите уникальный код")).await;
    let admin = admin();

    say(&engine, &admin, menu::CREATE_ORG).await;
    say(&engine, &admin, "Alpha Gym").await;

    assert_eq!(state_name(&engine, &admin).await, None);
    assert_eq!(last_text(&engine).await, texts::APOLOGY);

    // The next message starts clean
    say(&engine, &admin, "/start").await;
    assert!(engine
        .messenger()
        .last_menu()
        .await
        .unwrap()
        .contains(menu::ADMIN_PANEL));
}

#[tokio::test]
async fn test_failure_deletes_transient_keyboards() {
    let engine = setup_with(RecordingMessenger::failing_on("сохранено")).await;
    let athlete = user(7, "solo");

    say(&engine, &athlete, "/workout").await;
    say(&engine, &athlete, "Спина").await;
    let finish_buttons: Vec<i64> = engine
        .messenger()
        .sent()
        .await
        .iter()
        .filter_map(|s| match s {
            Sent::Inline { message_id, text, .. } if text == "Когда закончите:" => {
                Some(*message_id)
            }
            _ => None,
        })
        .collect();
    assert_eq!(finish_buttons.len(), 1);

    say(&engine, &athlete, "Тяга\n4\n8\n60").await;

    assert_eq!(state_name(&engine, &athlete).await, None);
    assert_eq!(last_text(&engine).await, texts::APOLOGY);
    assert!(engine
        .messenger()
        .deleted()
        .await
        .contains(&finish_buttons[0]));
}

#[tokio::test]
async fn test_archive_shows_history() {
    let engine = setup().await;
    let gym = seed_gym(&engine).await;
    let client = user(3, "client");

    say(&engine, &client, "/start").await;
    grant::archive_grant(engine.database().pool(), GrantKind::Client, gym.trainer_id, "client")
        .await
        .unwrap();

    say(&engine, &client, menu::ARCHIVE).await;
    assert_eq!(state_name(&engine, &client).await, Some("client_viewing_archive"));
    assert!(last_text(&engine).await.contains("@coach"));

    say(&engine, &client, "1").await;
    assert_eq!(last_text(&engine).await, texts::NO_WORKOUTS);
}
