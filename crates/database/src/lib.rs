//! SQLite persistence layer for the fitness bot.
//!
//! This crate provides async database operations for organizations, role
//! grants, access resolution, workouts and group trainings using SQLx with
//! SQLite.
//!
//! # Example
//!
//! ```no_run
//! use database::{grant, organization, Database, GrantKind};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:fitness.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     // Create an organization and make someone its manager
//!     let org = organization::create_organization(db.pool(), "Alpha Gym", "alpha").await?;
//!     grant::add_grant(db.pool(), GrantKind::Manager, org.id, "@boss").await?;
//!
//!     Ok(())
//! }
//! ```

pub mod access;
pub mod error;
pub mod grant;
pub mod group_training;
pub mod models;
pub mod organization;
pub mod user;
pub mod validation;
pub mod workout;

pub use error::{DatabaseError, Result};
pub use models::{
    AccessInfo, ClientAccess, ClientSummary, Exercise, ExerciseStat, GrantKind, GrantStatus,
    GroupTraining, GroupTrainingListing, JoinOutcome, MuscleGroup, NewExercise,
    NewGroupTraining, NewWorkout, OrgAccess, Organization, RoleGrant, TrainerSummary, User,
    Workout, WorkoutDetails, WorkoutScope,
};
pub use validation::ValidationError;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    /// Every inbound event runs on its own task, so keep this well above one.
    pub const DEFAULT_POOL_SIZE: u32 = 20;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> database::Result<()> {
    /// // File database
    /// let db = database::Database::connect("sqlite:data/fitness.db?mode=rwc").await?;
    ///
    /// // In-memory database (for testing)
    /// let db = database::Database::connect_with_pool_size("sqlite::memory:", 1).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(
            "Connected to database: {} (pool size: {})",
            url,
            pool_size
        );

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Fresh in-memory database with the schema applied.
#[cfg(test)]
pub(crate) async fn test_db() -> Database {
    let db = Database::connect_with_pool_size("sqlite::memory:", 1)
        .await
        .unwrap();
    db.migrate().await.unwrap();
    db
}
