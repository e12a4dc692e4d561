//! Shared harness for dialog integration tests.

#![allow(dead_code)]

use bot_core::{CallbackQuery, Identity, InboundEvent, InboundMessage};
use database::{organization, grant, Database, GrantKind, Organization};
use dialog::{DialogConfig, DialogEngine};
use mock_messenger::RecordingMessenger;

pub const ADMIN: &str = "boss";

pub type Engine = DialogEngine<RecordingMessenger>;

pub async fn setup() -> Engine {
    setup_with(RecordingMessenger::new()).await
}

pub async fn setup_with(messenger: RecordingMessenger) -> Engine {
    let db = Database::connect_with_pool_size("sqlite::memory:", 1)
        .await
        .unwrap();
    db.migrate().await.unwrap();
    DialogEngine::new(db, messenger, DialogConfig::new(ADMIN))
}

pub fn user(id: i64, handle: &str) -> Identity {
    Identity::new(id, handle).with_name("Test", None)
}

pub fn admin() -> Identity {
    user(1, ADMIN)
}

pub async fn say(engine: &Engine, from: &Identity, text: &str) {
    let message = InboundMessage::text(from.clone(), from.user_id, text);
    engine.handle(InboundEvent::Message(message)).await;
}

pub async fn send_photo(engine: &Engine, from: &Identity, file_id: &str, caption: &str) {
    let message = InboundMessage::photo(from.clone(), from.user_id, file_id, caption);
    engine.handle(InboundEvent::Message(message)).await;
}

pub async fn press(engine: &Engine, from: &Identity, data: &str) {
    let query = CallbackQuery {
        from: from.clone(),
        chat_id: from.user_id,
        message_id: 0,
        callback_id: format!("cb-{}", data),
        data: data.to_string(),
    };
    engine.handle(InboundEvent::Callback(query)).await;
}

pub async fn last_text(engine: &Engine) -> String {
    engine.messenger().last_text().await.unwrap_or_default()
}

pub async fn state_name(engine: &Engine, from: &Identity) -> Option<&'static str> {
    engine.store().get(from.user_id).await.map(|s| s.name())
}

/// An organization with a trainer `coach` and a client `client`.
pub struct Gym {
    pub org: Organization,
    pub trainer_id: i64,
    pub client_id: i64,
}

pub async fn seed_gym(engine: &Engine) -> Gym {
    let pool = engine.database().pool();
    let org = organization::create_organization(pool, "Alpha Gym", "alpha")
        .await
        .unwrap();
    let trainer = grant::add_grant(pool, GrantKind::Trainer, org.id, "coach")
        .await
        .unwrap();
    let client = grant::add_grant(pool, GrantKind::Client, trainer.id, "client")
        .await
        .unwrap();
    Gym {
        org,
        trainer_id: trainer.id,
        client_id: client.id,
    }
}
