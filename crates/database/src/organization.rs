//! Organization operations.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::Organization;
use crate::validation::{normalize_org_code, validate_org_name};

/// Create an organization. The code is upper-cased and must be unique.
///
/// Returns [`DatabaseError::AlreadyExists`] when the code is taken.
pub async fn create_organization(pool: &SqlitePool, name: &str, code: &str) -> Result<Organization> {
    let name = validate_org_name(name)?;
    let code = normalize_org_code(code)?;

    let org = sqlx::query_as::<_, Organization>(
        r#"
        INSERT INTO organizations (name, code)
        VALUES (?, ?)
        RETURNING id, name, code, created_at
        "#,
    )
    .bind(&name)
    .bind(&code)
    .fetch_one(pool)
    .await
    .map_err(|e| DatabaseError::conflict(e, "Organization", code.clone()))?;

    tracing::info!("Created organization {} ({})", org.name, org.code);
    Ok(org)
}

/// Get an organization by ID.
pub async fn get_organization(pool: &SqlitePool, id: i64) -> Result<Organization> {
    sqlx::query_as::<_, Organization>(
        r#"
        SELECT id, name, code, created_at
        FROM organizations
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Organization",
        id: id.to_string(),
    })
}

/// List all organizations, oldest first.
pub async fn list_organizations(pool: &SqlitePool) -> Result<Vec<Organization>> {
    let orgs = sqlx::query_as::<_, Organization>(
        r#"
        SELECT id, name, code, created_at
        FROM organizations
        ORDER BY created_at, id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(orgs)
}

/// Count organizations.
pub async fn count_organizations(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM organizations")
        .fetch_one(pool)
        .await?;

    Ok(count)
}
