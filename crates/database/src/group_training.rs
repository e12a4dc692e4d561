//! Group trainings and their participants.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{GroupTraining, GroupTrainingListing, JoinOutcome, NewGroupTraining};

/// Schedule a group training.
pub async fn create_group_training(
    pool: &SqlitePool,
    training: &NewGroupTraining,
) -> Result<GroupTraining> {
    let created = sqlx::query_as::<_, GroupTraining>(
        r#"
        INSERT INTO group_trainings
            (organization_id, trainer_id, name, description, scheduled_at, max_participants)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING id, organization_id, trainer_id, name, description, scheduled_at,
                  max_participants, created_at
        "#,
    )
    .bind(training.organization_id)
    .bind(training.trainer_id)
    .bind(&training.name)
    .bind(&training.description)
    .bind(&training.scheduled_at)
    .bind(training.max_participants)
    .fetch_one(pool)
    .await?;

    tracing::info!(
        "Created group training {} '{}' at {} (max {})",
        created.id,
        created.name,
        created.scheduled_at,
        created.max_participants
    );
    Ok(created)
}

/// Get a group training by ID.
pub async fn get_group_training(pool: &SqlitePool, id: i64) -> Result<GroupTraining> {
    sqlx::query_as::<_, GroupTraining>(
        r#"
        SELECT id, organization_id, trainer_id, name, description, scheduled_at,
               max_participants, created_at
        FROM group_trainings
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "GroupTraining",
        id: id.to_string(),
    })
}

/// Trainings of an organization that have not started yet, soonest first.
pub async fn upcoming_group_trainings(
    pool: &SqlitePool,
    organization_id: i64,
) -> Result<Vec<GroupTrainingListing>> {
    let trainings = sqlx::query_as::<_, GroupTrainingListing>(
        r#"
        SELECT
            gt.id,
            gt.name,
            gt.description,
            gt.scheduled_at,
            gt.max_participants,
            (SELECT COUNT(*) FROM group_training_participants p
                WHERE p.group_training_id = gt.id) AS participants,
            ot.username AS trainer_username,
            ot.telegram_id AS trainer_telegram_id
        FROM group_trainings gt
        JOIN organization_trainers ot ON ot.id = gt.trainer_id
        WHERE gt.organization_id = ? AND gt.scheduled_at > datetime('now', 'localtime')
        ORDER BY gt.scheduled_at, gt.id
        "#,
    )
    .bind(organization_id)
    .fetch_all(pool)
    .await?;

    Ok(trainings)
}

/// Current number of participants.
pub async fn participant_count(pool: &SqlitePool, group_training_id: i64) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM group_training_participants WHERE group_training_id = ?",
    )
    .bind(group_training_id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

async fn is_participant(pool: &SqlitePool, group_training_id: i64, user_id: i64) -> Result<bool> {
    let exists = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM group_training_participants
        WHERE group_training_id = ? AND user_id = ?
        "#,
    )
    .bind(group_training_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(exists > 0)
}

/// Add a user to a group training.
///
/// Capacity is checked by the insert itself, so a listing that was loaded
/// earlier cannot push the head count past `max_participants`. A user who is
/// already on the list gets [`JoinOutcome::AlreadyJoined`] even when the
/// training is full.
pub async fn join_group_training(
    pool: &SqlitePool,
    group_training_id: i64,
    user_id: i64,
) -> Result<JoinOutcome> {
    // Fails with NotFound for unknown trainings.
    get_group_training(pool, group_training_id).await?;

    if is_participant(pool, group_training_id, user_id).await? {
        return Ok(JoinOutcome::AlreadyJoined);
    }

    let result = sqlx::query(
        r#"
        INSERT INTO group_training_participants (group_training_id, user_id)
        SELECT ?1, ?2
        WHERE (SELECT COUNT(*) FROM group_training_participants WHERE group_training_id = ?1)
            < (SELECT max_participants FROM group_trainings WHERE id = ?1)
        "#,
    )
    .bind(group_training_id)
    .bind(user_id)
    .execute(pool)
    .await;

    let result = match result {
        Ok(result) => result,
        Err(e) => {
            return match DatabaseError::conflict(e, "Participant", user_id.to_string()) {
                DatabaseError::AlreadyExists { .. } => Ok(JoinOutcome::AlreadyJoined),
                other => Err(other),
            };
        }
    };

    if result.rows_affected() == 0 {
        return Ok(JoinOutcome::Full);
    }

    let participants = participant_count(pool, group_training_id).await?;
    tracing::info!(
        "User {} joined group training {} ({} participants)",
        user_id,
        group_training_id,
        participants
    );
    Ok(JoinOutcome::Joined { participants })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grant::add_grant;
    use crate::models::GrantKind;
    use crate::{organization, test_db, user, Database};

    async fn setup(db: &Database, max_participants: i64) -> GroupTraining {
        let org = organization::create_organization(db.pool(), "Alpha", "A").await.unwrap();
        let coach = add_grant(db.pool(), GrantKind::Trainer, org.id, "coach").await.unwrap();
        create_group_training(
            db.pool(),
            &NewGroupTraining {
                organization_id: org.id,
                trainer_id: coach.id,
                name: "Stretching".to_string(),
                description: "Morning session".to_string(),
                scheduled_at: "2999-01-01 09:00:00".to_string(),
                max_participants,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_capacity_enforced() {
        let db = test_db().await;
        let training = setup(&db, 1).await;
        let first = user::ensure_user(db.pool(), 1, "one", "").await.unwrap();
        let second = user::ensure_user(db.pool(), 2, "two", "").await.unwrap();

        let outcome = join_group_training(db.pool(), training.id, first.id).await.unwrap();
        assert_eq!(outcome, JoinOutcome::Joined { participants: 1 });

        let outcome = join_group_training(db.pool(), training.id, second.id).await.unwrap();
        assert_eq!(outcome, JoinOutcome::Full);

        let outcome = join_group_training(db.pool(), training.id, first.id).await.unwrap();
        assert_eq!(outcome, JoinOutcome::AlreadyJoined);

        assert_eq!(participant_count(db.pool(), training.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_join_below_capacity_adds_one() {
        let db = test_db().await;
        let training = setup(&db, 3).await;
        let member = user::ensure_user(db.pool(), 1, "one", "").await.unwrap();

        let before = participant_count(db.pool(), training.id).await.unwrap();
        join_group_training(db.pool(), training.id, member.id).await.unwrap();
        let after = participant_count(db.pool(), training.id).await.unwrap();
        assert_eq!(after, before + 1);

        join_group_training(db.pool(), training.id, member.id).await.unwrap();
        assert_eq!(participant_count(db.pool(), training.id).await.unwrap(), after);
    }

    #[tokio::test]
    async fn test_upcoming_lists_counts() {
        let db = test_db().await;
        let training = setup(&db, 2).await;
        let member = user::ensure_user(db.pool(), 1, "one", "").await.unwrap();
        join_group_training(db.pool(), training.id, member.id).await.unwrap();

        let upcoming = upcoming_group_trainings(db.pool(), training.organization_id)
            .await
            .unwrap();
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].participants, 1);
        assert_eq!(upcoming[0].trainer_username, "coach");
        assert!(upcoming[0].has_free_spots());
    }

    #[tokio::test]
    async fn test_unknown_training() {
        let db = test_db().await;
        let result = join_group_training(db.pool(), 404, 1).await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }
}
