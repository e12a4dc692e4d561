//! Access resolution queries.
//!
//! Grants are created for a handle before the grantee ever talks to the bot.
//! [`link_identity`] attaches the Telegram id on first contact, and
//! [`load_access`] matches rows by id, or by handle while the id is still
//! unset.

use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::{AccessInfo, ClientAccess, GrantKind, OrgAccess};

/// Fill in `telegram_id` on every grant recorded for this handle.
///
/// Only rows whose id is still NULL are touched, so an id is never
/// reassigned. Returns the number of rows linked.
pub async fn link_identity(pool: &SqlitePool, telegram_id: i64, username: &str) -> Result<u64> {
    if username.is_empty() {
        return Ok(0);
    }

    let mut linked = 0;
    for kind in [GrantKind::Manager, GrantKind::Trainer, GrantKind::Client] {
        let sql = format!(
            "UPDATE {} SET telegram_id = ? WHERE username = ? AND telegram_id IS NULL",
            kind.table()
        );
        let result = sqlx::query(&sql)
            .bind(telegram_id)
            .bind(username)
            .execute(pool)
            .await?;
        linked += result.rows_affected();
    }

    if linked > 0 {
        tracing::info!("Linked {} grant(s) for @{} to {}", linked, username, telegram_id);
    }
    Ok(linked)
}

async fn org_grants(
    pool: &SqlitePool,
    kind: GrantKind,
    telegram_id: i64,
    username: &str,
) -> Result<Vec<OrgAccess>> {
    let sql = format!(
        r#"
        SELECT g.id AS grant_id, o.id AS organization_id, o.name AS organization_name, g.status
        FROM {table} g
        JOIN organizations o ON o.id = g.organization_id
        WHERE g.telegram_id = ? OR (g.telegram_id IS NULL AND g.username = ?)
        ORDER BY CASE g.status WHEN 'active' THEN 0 ELSE 1 END, o.name, g.id
        "#,
        table = kind.table(),
    );

    let rows = sqlx::query_as::<_, OrgAccess>(&sql)
        .bind(telegram_id)
        .bind(username)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

async fn client_grants(
    pool: &SqlitePool,
    telegram_id: i64,
    username: &str,
    active: bool,
) -> Result<Vec<ClientAccess>> {
    let status_filter = if active {
        "tc.status = 'active' AND ot.status = 'active'"
    } else {
        "(tc.status = 'archived' OR ot.status = 'archived')"
    };

    let sql = format!(
        r#"
        SELECT
            tc.id AS trainer_client_id,
            o.id AS organization_id,
            o.name AS organization_name,
            ot.id AS trainer_id,
            ot.username AS trainer_username,
            ot.telegram_id AS trainer_telegram_id
        FROM trainer_clients tc
        JOIN organization_trainers ot ON ot.id = tc.trainer_id
        JOIN organizations o ON o.id = ot.organization_id
        WHERE (tc.telegram_id = ? OR (tc.telegram_id IS NULL AND tc.username = ?))
          AND {status_filter}
        ORDER BY tc.created_at, tc.id
        "#,
    );

    let rows = sqlx::query_as::<_, ClientAccess>(&sql)
        .bind(telegram_id)
        .bind(username)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Load every grant this identity holds. `is_admin` is left false.
pub async fn load_access(pool: &SqlitePool, telegram_id: i64, username: &str) -> Result<AccessInfo> {
    let managers = org_grants(pool, GrantKind::Manager, telegram_id, username).await?;
    let trainers = org_grants(pool, GrantKind::Trainer, telegram_id, username).await?;
    let clients = client_grants(pool, telegram_id, username, true).await?;
    let archived = client_grants(pool, telegram_id, username, false).await?;

    Ok(AccessInfo {
        is_admin: false,
        managers,
        trainers,
        clients,
        archived,
    })
}
