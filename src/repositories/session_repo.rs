use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior};
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::{AppError, Result};
use crate::models::{
    DayBoundary, ExerciseResult, FromSqliteRow, SessionWithWorkout, UserStats, Workout,
    WorkoutSession,
};
use crate::streak;

/// How many sessions a history listing returns at most.
const SESSION_LIST_LIMIT: i64 = 20;

/// Owns the workout-session lifecycle: open, close exactly once, and fold the
/// completion into the user's stats within the same transaction.
#[derive(Clone)]
pub struct SessionRepository {
    pool: DbPool,
}

impl SessionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Open a session for `(user, workout)`.
    ///
    /// If the user already has an open session for this workout it is returned
    /// instead of inserting a second one, so a double-tapped start cannot
    /// produce two sessions that both complete and double-count stats.
    pub async fn start(&self, user_id: &str, workout_id: &str) -> Result<WorkoutSession> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        let workout_id = workout_id.to_string();

        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let existing = tx
                .query_row(
                    "SELECT * FROM workout_sessions
                     WHERE user_id = ? AND workout_id = ? AND completed = 0
                     ORDER BY started_at DESC LIMIT 1",
                    [&user_id, &workout_id],
                    WorkoutSession::from_row_without_results,
                )
                .optional()?;

            if let Some(session) = existing {
                tracing::debug!(session_id = %session.id, "Reusing open session");
                tx.commit()?;
                return Ok(session);
            }

            let session = WorkoutSession {
                id: Uuid::new_v4().to_string(),
                user_id: user_id.clone(),
                workout_id: workout_id.clone(),
                started_at: Utc::now(),
                ended_at: None,
                completed: false,
                results: Vec::new(),
            };
            tx.execute(
                "INSERT INTO workout_sessions (id, user_id, workout_id, started_at, completed)
                 VALUES (?, ?, ?, ?, 0)",
                rusqlite::params![session.id, session.user_id, session.workout_id, session.started_at],
            )?;
            tx.commit()?;
            Ok(session)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Close a session and fold it into the owner's stats.
    ///
    /// One immediate transaction covers the closing write, the result
    /// replacement and the stats read-modify-write, so concurrent completions
    /// for the same user serialize and a reader never sees one record updated
    /// without the other. Errors: `NotFound` for an unknown session,
    /// `Forbidden` when the session belongs to another user, `AlreadyClosed`
    /// when the closing transition already happened.
    pub async fn complete(
        &self,
        session_id: &str,
        user_id: &str,
        results: Vec<ExerciseResult>,
        boundary: DayBoundary,
    ) -> Result<(WorkoutSession, UserStats)> {
        let pool = self.pool.clone();
        let session_id = session_id.to_string();
        let user_id = user_id.to_string();

        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let session = tx
                .query_row(
                    "SELECT * FROM workout_sessions WHERE id = ?",
                    [&session_id],
                    WorkoutSession::from_row_without_results,
                )
                .optional()?
                .ok_or_else(|| AppError::NotFound("Session not found".to_string()))?;

            if session.user_id != user_id {
                tracing::warn!(
                    session_id = %session_id,
                    caller = %user_id,
                    "Completion attempt against another user's session"
                );
                return Err(AppError::Forbidden(
                    "Session belongs to another user".to_string(),
                ));
            }
            if session.completed {
                return Err(AppError::AlreadyClosed);
            }

            let ended_at = Utc::now();
            let elapsed_ms = (ended_at - session.started_at).num_milliseconds();
            let duration_minutes = ((elapsed_ms as f64) / 60_000.0).round() as i64;

            tx.execute(
                "UPDATE workout_sessions SET ended_at = ?, completed = 1 WHERE id = ?",
                rusqlite::params![ended_at, session_id],
            )?;

            // The supplied list is the full, final result set.
            tx.execute(
                "DELETE FROM exercise_results WHERE session_id = ?",
                [&session_id],
            )?;
            for (position, result) in results.iter().enumerate() {
                tx.execute(
                    "INSERT INTO exercise_results
                     (session_id, position, exercise_id, reps_completed, duration_completed, sets_completed)
                     VALUES (?, ?, ?, ?, ?, ?)",
                    rusqlite::params![
                        session_id,
                        position as i64,
                        result.exercise_id,
                        result.reps_completed,
                        result.duration_completed,
                        result.sets_completed,
                    ],
                )?;
            }

            let existing = tx
                .query_row(
                    "SELECT * FROM user_stats WHERE user_id = ?",
                    [&user_id],
                    UserStats::from_row,
                )
                .optional()?;
            let stats =
                streak::aggregate(existing.as_ref(), &user_id, ended_at, duration_minutes, boundary);
            tx.execute(
                "INSERT INTO user_stats
                 (user_id, total_workouts, total_minutes, current_streak, longest_streak, last_workout_at)
                 VALUES (?, ?, ?, ?, ?, ?)
                 ON CONFLICT(user_id) DO UPDATE SET
                     total_workouts = excluded.total_workouts,
                     total_minutes = excluded.total_minutes,
                     current_streak = excluded.current_streak,
                     longest_streak = excluded.longest_streak,
                     last_workout_at = excluded.last_workout_at",
                rusqlite::params![
                    stats.user_id,
                    stats.total_workouts,
                    stats.total_minutes,
                    stats.current_streak,
                    stats.longest_streak,
                    stats.last_workout_at,
                ],
            )?;

            tx.commit()?;

            tracing::info!(
                session_id = %session_id,
                user_id = %user_id,
                duration_minutes,
                "Session completed"
            );

            Ok((
                WorkoutSession {
                    ended_at: Some(ended_at),
                    completed: true,
                    results,
                    ..session
                },
                stats,
            ))
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// The user's sessions, newest-first, capped at 20, each joined with its
    /// workout. Sessions whose workout has been removed from the catalog are
    /// dropped by the join rather than surfaced as errors.
    pub async fn list_recent_with_workout(&self, user_id: &str) -> Result<Vec<SessionWithWorkout>> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();

        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare(
                "SELECT s.id, s.user_id, s.workout_id, s.started_at, s.ended_at, s.completed,
                        w.id AS w_id, w.name AS w_name, w.description AS w_description,
                        w.difficulty AS w_difficulty, w.estimated_duration AS w_estimated_duration,
                        w.category AS w_category
                 FROM workout_sessions s
                 JOIN workouts w ON s.workout_id = w.id
                 WHERE s.user_id = ?
                 ORDER BY s.started_at DESC
                 LIMIT ?",
            )?;
            let mut entries = stmt
                .query_map(rusqlite::params![user_id, SESSION_LIST_LIMIT], |row| {
                    Ok(SessionWithWorkout {
                        session: WorkoutSession {
                            id: row.get("id")?,
                            user_id: row.get("user_id")?,
                            workout_id: row.get("workout_id")?,
                            started_at: row.get("started_at")?,
                            ended_at: row.get("ended_at")?,
                            completed: row.get("completed")?,
                            results: Vec::new(),
                        },
                        workout: Workout {
                            id: row.get("w_id")?,
                            name: row.get("w_name")?,
                            description: row.get("w_description")?,
                            difficulty: row.get("w_difficulty")?,
                            estimated_duration: row.get("w_estimated_duration")?,
                            category: row.get("w_category")?,
                            exercises: Vec::new(),
                        },
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            for entry in &mut entries {
                entry.session.results = load_results(&conn, &entry.session.id)?;
            }
            Ok(entries)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<WorkoutSession>> {
        let pool = self.pool.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let session = conn
                .query_row(
                    "SELECT * FROM workout_sessions WHERE id = ?",
                    [&id],
                    WorkoutSession::from_row_without_results,
                )
                .optional()?;
            match session {
                Some(mut session) => {
                    session.results = load_results(&conn, &session.id)?;
                    Ok(Some(session))
                }
                None => Ok(None),
            }
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Count sessions still open since before `cutoff`. Abandoned sessions are
    /// reported, never force-closed.
    pub async fn count_stale_open(&self, cutoff: DateTime<Utc>) -> Result<i64> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let count = conn.query_row(
                "SELECT COUNT(*) FROM workout_sessions WHERE completed = 0 AND started_at < ?",
                rusqlite::params![cutoff],
                |row| row.get(0),
            )?;
            Ok(count)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }
}

fn load_results(conn: &Connection, session_id: &str) -> Result<Vec<ExerciseResult>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM exercise_results WHERE session_id = ? ORDER BY position",
    )?;
    let results = stmt
        .query_map([session_id], ExerciseResult::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(results)
}
