//! Dialog engine for the fitness bot.
//!
//! This crate provides the [`DialogEngine`] type which turns inbound chat
//! events into workflow steps: organization provisioning, role grants,
//! workout entry, group trainings and progress stats.
//!
//! # Features
//!
//! - Resolves access from role grants on every event
//! - Keeps one [`DialogState`] per identity in a bounded [`StateStore`]
//! - Re-checks the state against fresh access before acting on it
//! - Handles inline button callbacks against the state's own snapshot
//! - Contains every failure: the user gets an apology and a clean state
//!
//! # Architecture
//!
//! ```text
//! InboundEvent (from message-listener)
//!          ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       DIALOG ENGINE                         │
//! │                                                             │
//! │  1. Link handle → numeric id, resolve AccessInfo            │
//! │         ↓                                                   │
//! │  2. Upsert the user record (best-effort)                    │
//! │         ↓                                                   │
//! │  3. Route:                                                  │
//! │     • "main menu" → clear state, root menu                  │
//! │     • /command    → start, help, cancel, workout, stats     │
//! │     • state       → workflow step                           │
//! │     • callback    → button handler                          │
//! │     • otherwise   → root menu buttons                       │
//! │         ↓                                                   │
//! │  4. Reply through the Messenger                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use bot_core::{Identity, InboundEvent, InboundMessage, LoggingMessenger};
//! use database::Database;
//! use dialog::{DialogConfig, DialogEngine};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("sqlite:fitness.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     let engine = DialogEngine::new(db, LoggingMessenger::new(), DialogConfig::new("boss"));
//!
//!     let from = Identity::new(42, "boss");
//!     engine
//!         .handle(InboundEvent::Message(InboundMessage::text(from, 42, "/start")))
//!         .await;
//!     Ok(())
//! }
//! ```

mod access;
mod callback;
mod engine;
mod error;
pub mod menu;
pub mod parse;
mod state;
mod store;
pub mod texts;
mod workflows;

pub use access::AccessResolver;
pub use engine::{DialogConfig, DialogEngine};
pub use error::{DialogError, Result};
pub use state::{
    DialogState, ExerciseSession, OrgContext, StatsTarget, TrainerContext, WorkoutTarget,
};
pub use store::StateStore;
