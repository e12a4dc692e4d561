//! User records keyed by Telegram id.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::User;

/// Insert the user or refresh their handle and name.
///
/// Called for every inbound event, so it is a single upsert.
pub async fn ensure_user(
    pool: &SqlitePool,
    telegram_id: i64,
    username: &str,
    full_name: &str,
) -> Result<User> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (telegram_id, username, full_name)
        VALUES (?, ?, ?)
        ON CONFLICT(telegram_id) DO UPDATE SET
            username = excluded.username,
            full_name = excluded.full_name,
            updated_at = datetime('now')
        RETURNING id, telegram_id, username, full_name, created_at, updated_at
        "#,
    )
    .bind(telegram_id)
    .bind(username)
    .bind(full_name)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

/// Get a user by Telegram id.
pub async fn get_user_by_telegram_id(pool: &SqlitePool, telegram_id: i64) -> Result<User> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, telegram_id, username, full_name, created_at, updated_at
        FROM users
        WHERE telegram_id = ?
        "#,
    )
    .bind(telegram_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "User",
        id: telegram_id.to_string(),
    })
}

/// Get a user by handle, ignoring case.
pub async fn get_user_by_username(pool: &SqlitePool, username: &str) -> Result<User> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, telegram_id, username, full_name, created_at, updated_at
        FROM users
        WHERE username = ?
        ORDER BY updated_at DESC
        LIMIT 1
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "User",
        id: username.to_string(),
    })
}

/// Count total users.
pub async fn count_users(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM users
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_db;

    #[tokio::test]
    async fn test_ensure_user_upserts() {
        let db = test_db().await;

        let first = ensure_user(db.pool(), 42, "alice", "Alice A").await.unwrap();
        let second = ensure_user(db.pool(), 42, "alice_new", "Alice B").await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.username, "alice_new");
        assert_eq!(second.full_name, "Alice B");
        assert_eq!(count_users(db.pool()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_get_user_by_username_ignores_case() {
        let db = test_db().await;
        ensure_user(db.pool(), 7, "CamelCase", "").await.unwrap();

        let user = get_user_by_username(db.pool(), "camelcase").await.unwrap();
        assert_eq!(user.telegram_id, 7);

        let missing = get_user_by_telegram_id(db.pool(), 8).await;
        assert!(matches!(missing, Err(DatabaseError::NotFound { .. })));
    }
}
