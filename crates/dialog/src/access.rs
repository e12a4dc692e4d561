//! Access resolution for one identity.

use bot_core::Identity;
use database::validation::normalize_username;
use database::{access, AccessInfo, Database, DatabaseError};

/// Computes [`AccessInfo`] for inbound events.
#[derive(Debug, Clone)]
pub struct AccessResolver {
    /// Lower-cased admin handle without "@".
    admin_username: String,
}

impl AccessResolver {
    /// Create a resolver for the configured admin handle.
    pub fn new(admin_username: &str) -> Self {
        Self {
            admin_username: normalize_username(admin_username).to_lowercase(),
        }
    }

    /// Whether `handle` is the admin, ignoring case and a leading "@".
    pub fn is_admin(&self, handle: &str) -> bool {
        let handle = normalize_username(handle).to_lowercase();
        !handle.is_empty() && handle == self.admin_username
    }

    /// Attach grants recorded by handle to the identity's numeric id.
    ///
    /// Returns the number of grant rows that were linked.
    pub async fn link(&self, db: &Database, identity: &Identity) -> Result<u64, DatabaseError> {
        let handle = identity.handle();
        if handle.is_empty() {
            return Ok(0);
        }
        access::link_identity(db.pool(), identity.user_id, &handle).await
    }

    /// Load every grant the identity holds and overlay the admin flag.
    pub async fn resolve(&self, db: &Database, identity: &Identity) -> Result<AccessInfo, DatabaseError> {
        let handle = identity.handle();
        let mut info = access::load_access(db.pool(), identity.user_id, &handle).await?;
        info.is_admin = self.is_admin(&handle);
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::{grant, organization, GrantKind};

    async fn test_db() -> Database {
        let db = Database::connect_with_pool_size("sqlite::memory:", 1)
            .await
            .unwrap();
        db.migrate().await.unwrap();
        db
    }

    #[test]
    fn test_admin_match_ignores_case_and_at() {
        let resolver = AccessResolver::new("@Boss");
        assert!(resolver.is_admin("boss"));
        assert!(resolver.is_admin("@BOSS "));
        assert!(!resolver.is_admin("bossy"));
        assert!(!resolver.is_admin(""));
    }

    #[test]
    fn test_empty_admin_matches_nobody() {
        let resolver = AccessResolver::new("");
        assert!(!resolver.is_admin(""));
        assert!(!resolver.is_admin("anyone"));
    }

    #[tokio::test]
    async fn test_resolve_links_handle_grants() {
        let db = test_db().await;
        let org = organization::create_organization(db.pool(), "Alpha", "A")
            .await
            .unwrap();
        grant::add_grant(db.pool(), GrantKind::Trainer, org.id, "coach")
            .await
            .unwrap();

        let resolver = AccessResolver::new("boss");
        let coach = Identity::new(77, "Coach");
        assert_eq!(resolver.link(&db, &coach).await.unwrap(), 1);

        let info = resolver.resolve(&db, &coach).await.unwrap();
        assert!(!info.is_admin);
        assert_eq!(info.active_trainers().len(), 1);
        assert_eq!(info.trainers[0].organization_name, "Alpha");
    }

    #[tokio::test]
    async fn test_resolve_without_handle() {
        let db = test_db().await;
        let resolver = AccessResolver::new("boss");
        let anon = Identity::new(5, "");

        assert_eq!(resolver.link(&db, &anon).await.unwrap(), 0);
        assert!(resolver.resolve(&db, &anon).await.unwrap().is_empty());
    }
}
