//! Workouts, exercises and progress queries.
//!
//! Both are append-only: rows are written while the user is in the
//! exercise entry loop and never edited afterwards.

use sqlx::sqlite::SqliteArguments;
use sqlx::query::QueryAs;
use sqlx::{Sqlite, SqlitePool};

use crate::error::{DatabaseError, Result};
use crate::models::{
    Exercise, ExerciseStat, NewExercise, NewWorkout, TrainerSummary, Workout, WorkoutDetails,
    WorkoutScope,
};

const WORKOUT_COLUMNS: &str =
    "w.id, w.trainer_client_id, w.client_telegram_id, w.date, w.muscle_group, w.notes, w.created_at";

fn scope_filter(scope: WorkoutScope) -> &'static str {
    match scope {
        WorkoutScope::Grant(_) => "w.trainer_client_id = ?",
        WorkoutScope::Identity(_) => {
            "(w.client_telegram_id = ? OR w.trainer_client_id IN \
             (SELECT id FROM trainer_clients WHERE telegram_id = ?))"
        }
    }
}

fn bind_scope<'q, O>(
    query: QueryAs<'q, Sqlite, O, SqliteArguments<'q>>,
    scope: WorkoutScope,
) -> QueryAs<'q, Sqlite, O, SqliteArguments<'q>> {
    match scope {
        WorkoutScope::Grant(id) => query.bind(id),
        WorkoutScope::Identity(telegram_id) => query.bind(telegram_id).bind(telegram_id),
    }
}

/// Lookup key for an exercise name: trimmed and lower-cased.
pub fn exercise_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Create a workout row.
pub async fn create_workout(pool: &SqlitePool, workout: &NewWorkout) -> Result<Workout> {
    let created = sqlx::query_as::<_, Workout>(
        r#"
        INSERT INTO workouts (trainer_client_id, client_telegram_id, date, muscle_group, notes)
        VALUES (?, ?, ?, ?, ?)
        RETURNING id, trainer_client_id, client_telegram_id, date, muscle_group, notes, created_at
        "#,
    )
    .bind(workout.trainer_client_id)
    .bind(workout.client_telegram_id)
    .bind(&workout.date)
    .bind(workout.muscle_group)
    .bind(&workout.notes)
    .fetch_one(pool)
    .await?;

    tracing::debug!(
        "Created workout {} ({}) for client {:?}",
        created.id,
        created.muscle_group.as_str(),
        created.trainer_client_id
    );
    Ok(created)
}

/// Get a workout by ID.
pub async fn get_workout(pool: &SqlitePool, id: i64) -> Result<Workout> {
    let sql = format!("SELECT {WORKOUT_COLUMNS} FROM workouts w WHERE w.id = ?");
    sqlx::query_as::<_, Workout>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "Workout",
            id: id.to_string(),
        })
}

/// Append an exercise to a workout. The caller assigns `order`.
pub async fn add_exercise(pool: &SqlitePool, exercise: &NewExercise) -> Result<Exercise> {
    let created = sqlx::query_as::<_, Exercise>(
        r#"
        INSERT INTO exercises
            (workout_id, name, name_key, sets, reps, weight, rest_seconds, photo_file_id, notes,
             exercise_order)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id, workout_id, name, sets, reps, weight, rest_seconds, photo_file_id, notes,
                  exercise_order, created_at
        "#,
    )
    .bind(exercise.workout_id)
    .bind(exercise.name.trim())
    .bind(exercise_key(&exercise.name))
    .bind(exercise.sets)
    .bind(exercise.reps)
    .bind(exercise.weight)
    .bind(exercise.rest_seconds)
    .bind(&exercise.photo_file_id)
    .bind(&exercise.notes)
    .bind(exercise.order)
    .fetch_one(pool)
    .await?;

    Ok(created)
}

/// List a workout's exercises in entry order.
pub async fn list_exercises(pool: &SqlitePool, workout_id: i64) -> Result<Vec<Exercise>> {
    let exercises = sqlx::query_as::<_, Exercise>(
        r#"
        SELECT id, workout_id, name, sets, reps, weight, rest_seconds, photo_file_id, notes,
               exercise_order, created_at
        FROM exercises
        WHERE workout_id = ?
        ORDER BY exercise_order, id
        "#,
    )
    .bind(workout_id)
    .fetch_all(pool)
    .await?;

    Ok(exercises)
}

/// Most recent workouts in a scope, newest first, with their exercises.
pub async fn recent_workouts(
    pool: &SqlitePool,
    scope: WorkoutScope,
    limit: i64,
) -> Result<Vec<WorkoutDetails>> {
    let sql = format!(
        "SELECT {WORKOUT_COLUMNS} FROM workouts w WHERE {} ORDER BY w.date DESC, w.id DESC LIMIT ?",
        scope_filter(scope)
    );

    let workouts = bind_scope(sqlx::query_as::<_, Workout>(&sql), scope)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    let mut details = Vec::with_capacity(workouts.len());
    for workout in workouts {
        let exercises = list_exercises(pool, workout.id).await?;
        details.push(WorkoutDetails { workout, exercises });
    }

    Ok(details)
}

/// Progress of one exercise since `since` (YYYY-MM-DD), newest first.
///
/// The name is matched ignoring case.
pub async fn exercise_stats(
    pool: &SqlitePool,
    scope: WorkoutScope,
    name: &str,
    since: &str,
) -> Result<Vec<ExerciseStat>> {
    let sql = format!(
        r#"
        SELECT w.date, e.sets, e.reps, e.weight, e.photo_file_id
        FROM exercises e
        JOIN workouts w ON w.id = e.workout_id
        WHERE {} AND e.name_key = ? AND w.date >= ?
        ORDER BY w.date DESC, e.id DESC
        "#,
        scope_filter(scope)
    );

    let stats = bind_scope(sqlx::query_as::<_, ExerciseStat>(&sql), scope)
        .bind(exercise_key(name))
        .bind(since)
        .fetch_all(pool)
        .await?;

    Ok(stats)
}

/// Counts shown on a trainer's stats screen.
pub async fn trainer_summary(pool: &SqlitePool, trainer_id: i64) -> Result<TrainerSummary> {
    let (active_clients, archived_clients, workouts, upcoming_trainings) =
        sqlx::query_as::<_, (i64, i64, i64, i64)>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM trainer_clients WHERE trainer_id = ?1 AND status = 'active'),
                (SELECT COUNT(*) FROM trainer_clients WHERE trainer_id = ?1 AND status = 'archived'),
                (SELECT COUNT(*) FROM workouts w
                    JOIN trainer_clients tc ON tc.id = w.trainer_client_id
                    WHERE tc.trainer_id = ?1),
                (SELECT COUNT(*) FROM group_trainings
                    WHERE trainer_id = ?1 AND scheduled_at > datetime('now', 'localtime'))
            "#,
        )
        .bind(trainer_id)
        .fetch_one(pool)
        .await?;

    Ok(TrainerSummary {
        active_clients,
        archived_clients,
        workouts,
        upcoming_trainings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grant::add_grant;
    use crate::models::{GrantKind, MuscleGroup};
    use crate::{organization, test_db};

    fn new_workout(trainer_client_id: Option<i64>, telegram_id: i64, date: &str) -> NewWorkout {
        NewWorkout {
            trainer_client_id,
            client_telegram_id: Some(telegram_id),
            date: date.to_string(),
            muscle_group: MuscleGroup::Chest,
            notes: String::new(),
        }
    }

    fn bench(workout_id: i64, weight: f64, order: i64) -> NewExercise {
        NewExercise {
            workout_id,
            name: "Жим лежа".to_string(),
            sets: 4,
            reps: 10,
            weight,
            rest_seconds: None,
            photo_file_id: None,
            notes: None,
            order,
        }
    }

    #[tokio::test]
    async fn test_workout_and_exercises() {
        let db = test_db().await;
        let workout = create_workout(db.pool(), &new_workout(None, 1, "2026-01-10"))
            .await
            .unwrap();
        assert_eq!(workout.muscle_group, MuscleGroup::Chest);
        assert!(workout.trainer_client_id.is_none());

        add_exercise(db.pool(), &bench(workout.id, 80.0, 1)).await.unwrap();
        add_exercise(db.pool(), &bench(workout.id, 85.0, 2)).await.unwrap();

        let exercises = list_exercises(db.pool(), workout.id).await.unwrap();
        let orders: Vec<i64> = exercises.iter().map(|e| e.order).collect();
        assert_eq!(orders, vec![1, 2]);
        assert_eq!(exercises[1].weight, 85.0);

        let fetched = get_workout(db.pool(), workout.id).await.unwrap();
        assert_eq!(fetched, workout);
    }

    #[tokio::test]
    async fn test_exercise_stats_by_scope() {
        let db = test_db().await;
        let org = organization::create_organization(db.pool(), "Alpha", "A").await.unwrap();
        let coach = add_grant(db.pool(), GrantKind::Trainer, org.id, "coach").await.unwrap();
        let client = add_grant(db.pool(), GrantKind::Client, coach.id, "client").await.unwrap();

        let old = create_workout(db.pool(), &new_workout(Some(client.id), 7, "2026-01-01"))
            .await
            .unwrap();
        let new = create_workout(db.pool(), &new_workout(None, 7, "2026-02-01"))
            .await
            .unwrap();
        add_exercise(db.pool(), &bench(old.id, 70.0, 1)).await.unwrap();
        add_exercise(db.pool(), &bench(new.id, 75.0, 1)).await.unwrap();

        let by_identity = exercise_stats(db.pool(), WorkoutScope::Identity(7), "жим лежа", "2025-12-01")
            .await
            .unwrap();
        assert_eq!(by_identity.len(), 2);
        assert_eq!(by_identity[0].weight, 75.0);

        let by_grant = exercise_stats(db.pool(), WorkoutScope::Grant(client.id), "Жим лежа", "2025-12-01")
            .await
            .unwrap();
        assert_eq!(by_grant.len(), 1);
        assert_eq!(by_grant[0].date, "2026-01-01");

        let recent = exercise_stats(db.pool(), WorkoutScope::Identity(7), "Жим лежа", "2026-01-15")
            .await
            .unwrap();
        assert_eq!(recent.len(), 1);
    }

    #[tokio::test]
    async fn test_recent_workouts_and_summary() {
        let db = test_db().await;
        let org = organization::create_organization(db.pool(), "Alpha", "A").await.unwrap();
        let coach = add_grant(db.pool(), GrantKind::Trainer, org.id, "coach").await.unwrap();
        let client = add_grant(db.pool(), GrantKind::Client, coach.id, "client").await.unwrap();

        for day in ["2026-03-01", "2026-03-02", "2026-03-03"] {
            let w = create_workout(db.pool(), &new_workout(Some(client.id), 3, day))
                .await
                .unwrap();
            add_exercise(db.pool(), &bench(w.id, 60.0, 1)).await.unwrap();
        }

        let recent = recent_workouts(db.pool(), WorkoutScope::Grant(client.id), 2)
            .await
            .unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].workout.date, "2026-03-03");
        assert_eq!(recent[0].exercises.len(), 1);

        let summary = trainer_summary(db.pool(), coach.id).await.unwrap();
        assert_eq!(summary.active_clients, 1);
        assert_eq!(summary.archived_clients, 0);
        assert_eq!(summary.workouts, 3);
        assert_eq!(summary.upcoming_trainings, 0);
    }
}
