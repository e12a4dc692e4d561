//! Role grants: manager-of-org, trainer-of-org and client-of-trainer.
//!
//! All three tables share one shape, so every operation takes a
//! [`GrantKind`] that selects the table and its scope column. Grants are
//! never deleted. Removing one archives it, and granting the same handle
//! again reactivates the archived row in place.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{ClientSummary, GrantKind, RoleGrant};
use crate::validation::validate_username;

fn select_columns(kind: GrantKind) -> String {
    format!(
        "id, {} AS scope_id, username, telegram_id, status, archived_at, created_at",
        kind.scope_column()
    )
}

/// Grant a role to a handle within a scope.
///
/// Inserts a new active row, or reactivates the existing row for the same
/// `(scope, handle)` pair. The returned grant keeps its original id.
pub async fn add_grant(
    pool: &SqlitePool,
    kind: GrantKind,
    scope_id: i64,
    username: &str,
) -> Result<RoleGrant> {
    let username = validate_username(username)?;

    let sql = format!(
        r#"
        INSERT INTO {table} ({scope}, username)
        VALUES (?, ?)
        ON CONFLICT({scope}, username) DO UPDATE SET
            status = 'active',
            archived_at = NULL
        RETURNING {columns}
        "#,
        table = kind.table(),
        scope = kind.scope_column(),
        columns = select_columns(kind),
    );

    let grant = sqlx::query_as::<_, RoleGrant>(&sql)
        .bind(scope_id)
        .bind(&username)
        .fetch_one(pool)
        .await?;

    tracing::info!(
        "Granted {} role to @{} in scope {} (grant {})",
        kind.entity(),
        grant.username,
        scope_id,
        grant.id
    );
    Ok(grant)
}

/// Archive the grant held by `username` in a scope.
///
/// Returns `Ok(false)` when the grant exists but is already archived.
pub async fn archive_grant(
    pool: &SqlitePool,
    kind: GrantKind,
    scope_id: i64,
    username: &str,
) -> Result<bool> {
    let sql = format!(
        r#"
        UPDATE {table}
        SET status = 'archived', archived_at = datetime('now')
        WHERE {scope} = ? AND username = ? AND status = 'active'
        "#,
        table = kind.table(),
        scope = kind.scope_column(),
    );

    let result = sqlx::query(&sql)
        .bind(scope_id)
        .bind(username)
        .execute(pool)
        .await?;

    if result.rows_affected() > 0 {
        tracing::info!(
            "Archived {} grant for @{} in scope {}",
            kind.entity(),
            username,
            scope_id
        );
        return Ok(true);
    }

    // Distinguish "already archived" from "never existed".
    find_grant(pool, kind, scope_id, username)
        .await?
        .map(|_| false)
        .ok_or_else(|| DatabaseError::NotFound {
            entity: kind.entity(),
            id: username.to_string(),
        })
}

/// Get a grant by ID.
pub async fn get_grant(pool: &SqlitePool, kind: GrantKind, id: i64) -> Result<RoleGrant> {
    let sql = format!(
        "SELECT {columns} FROM {table} WHERE id = ?",
        columns = select_columns(kind),
        table = kind.table(),
    );

    sqlx::query_as::<_, RoleGrant>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound {
            entity: kind.entity(),
            id: id.to_string(),
        })
}

/// Find the grant for a handle in a scope, whatever its status.
pub async fn find_grant(
    pool: &SqlitePool,
    kind: GrantKind,
    scope_id: i64,
    username: &str,
) -> Result<Option<RoleGrant>> {
    let sql = format!(
        "SELECT {columns} FROM {table} WHERE {scope} = ? AND username = ?",
        columns = select_columns(kind),
        table = kind.table(),
        scope = kind.scope_column(),
    );

    let grant = sqlx::query_as::<_, RoleGrant>(&sql)
        .bind(scope_id)
        .bind(username)
        .fetch_optional(pool)
        .await?;

    Ok(grant)
}

/// List every grant in a scope, active first, then by creation.
pub async fn list_grants(pool: &SqlitePool, kind: GrantKind, scope_id: i64) -> Result<Vec<RoleGrant>> {
    let sql = format!(
        r#"
        SELECT {columns}
        FROM {table}
        WHERE {scope} = ?
        ORDER BY CASE status WHEN 'active' THEN 0 ELSE 1 END, created_at, id
        "#,
        columns = select_columns(kind),
        table = kind.table(),
        scope = kind.scope_column(),
    );

    let grants = sqlx::query_as::<_, RoleGrant>(&sql)
        .bind(scope_id)
        .fetch_all(pool)
        .await?;

    Ok(grants)
}

/// Count active grants in a scope.
pub async fn count_active_grants(pool: &SqlitePool, kind: GrantKind, scope_id: i64) -> Result<i64> {
    let sql = format!(
        "SELECT COUNT(*) FROM {table} WHERE {scope} = ? AND status = 'active'",
        table = kind.table(),
        scope = kind.scope_column(),
    );

    let count = sqlx::query_scalar::<_, i64>(&sql)
        .bind(scope_id)
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// List a trainer's clients with their workout totals.
pub async fn list_clients(pool: &SqlitePool, trainer_id: i64) -> Result<Vec<ClientSummary>> {
    let clients = sqlx::query_as::<_, ClientSummary>(
        r#"
        SELECT
            tc.id,
            tc.trainer_id,
            tc.username,
            tc.telegram_id,
            tc.status,
            NULLIF(u.full_name, '') AS full_name,
            (SELECT COUNT(*) FROM workouts w WHERE w.trainer_client_id = tc.id) AS workout_count,
            (SELECT MAX(w.date) FROM workouts w WHERE w.trainer_client_id = tc.id) AS last_workout
        FROM trainer_clients tc
        LEFT JOIN users u ON u.telegram_id = tc.telegram_id
        WHERE tc.trainer_id = ?
        ORDER BY CASE tc.status WHEN 'active' THEN 0 ELSE 1 END, tc.created_at, tc.id
        "#,
    )
    .bind(trainer_id)
    .fetch_all(pool)
    .await?;

    Ok(clients)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GrantStatus;
    use crate::{organization, test_db};

    #[tokio::test]
    async fn test_regrant_reactivates_same_row() {
        let db = test_db().await;
        let org = organization::create_organization(db.pool(), "Alpha", "A").await.unwrap();

        let first = add_grant(db.pool(), GrantKind::Manager, org.id, "@boss").await.unwrap();
        assert_eq!(first.status, GrantStatus::Active);
        let after_one = list_grants(db.pool(), GrantKind::Manager, org.id).await.unwrap().len();

        assert!(archive_grant(db.pool(), GrantKind::Manager, org.id, "boss").await.unwrap());
        let archived = get_grant(db.pool(), GrantKind::Manager, first.id).await.unwrap();
        assert_eq!(archived.status, GrantStatus::Archived);
        assert!(archived.archived_at.is_some());

        let again = add_grant(db.pool(), GrantKind::Manager, org.id, "BOSS").await.unwrap();
        assert_eq!(again.id, first.id);
        assert_eq!(again.status, GrantStatus::Active);
        assert!(again.archived_at.is_none());

        let after_regrant = list_grants(db.pool(), GrantKind::Manager, org.id).await.unwrap().len();
        assert_eq!(after_one, after_regrant);
    }

    #[tokio::test]
    async fn test_archive_twice_reports_no_change() {
        let db = test_db().await;
        let org = organization::create_organization(db.pool(), "Alpha", "A").await.unwrap();
        add_grant(db.pool(), GrantKind::Trainer, org.id, "coach").await.unwrap();

        assert!(archive_grant(db.pool(), GrantKind::Trainer, org.id, "coach").await.unwrap());
        assert!(!archive_grant(db.pool(), GrantKind::Trainer, org.id, "coach").await.unwrap());

        let missing = archive_grant(db.pool(), GrantKind::Trainer, org.id, "nobody").await;
        assert!(matches!(missing, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_list_grants_active_first() {
        let db = test_db().await;
        let org = organization::create_organization(db.pool(), "Alpha", "A").await.unwrap();
        add_grant(db.pool(), GrantKind::Trainer, org.id, "first").await.unwrap();
        add_grant(db.pool(), GrantKind::Trainer, org.id, "second").await.unwrap();
        archive_grant(db.pool(), GrantKind::Trainer, org.id, "first").await.unwrap();

        let grants = list_grants(db.pool(), GrantKind::Trainer, org.id).await.unwrap();
        let names: Vec<_> = grants.iter().map(|g| g.username.as_str()).collect();
        assert_eq!(names, vec!["second", "first"]);
        assert_eq!(
            count_active_grants(db.pool(), GrantKind::Trainer, org.id).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_empty_handle_rejected() {
        let db = test_db().await;
        let org = organization::create_organization(db.pool(), "Alpha", "A").await.unwrap();
        let result = add_grant(db.pool(), GrantKind::Manager, org.id, " @ ").await;
        assert!(matches!(result, Err(DatabaseError::Invalid(_))));
    }

    #[tokio::test]
    async fn test_list_clients_includes_totals() {
        let db = test_db().await;
        let org = organization::create_organization(db.pool(), "Alpha", "A").await.unwrap();
        let trainer = add_grant(db.pool(), GrantKind::Trainer, org.id, "coach").await.unwrap();
        add_grant(db.pool(), GrantKind::Client, trainer.id, "client").await.unwrap();

        let clients = list_clients(db.pool(), trainer.id).await.unwrap();
        assert_eq!(clients.len(), 1);
        assert_eq!(clients[0].username, "client");
        assert_eq!(clients[0].workout_count, 0);
        assert!(clients[0].last_workout.is_none());
        assert!(clients[0].full_name.is_none());
    }
}
