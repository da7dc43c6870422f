use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::{FromSqliteRow, Workout};

/// One user's attempt at a workout, from start to completion or abandonment.
///
/// `ended_at` and `completed` are set together, exactly once, by the closing
/// transition; `results` is frozen afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutSession {
    pub id: String,
    pub user_id: String,
    pub workout_id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub completed: bool,
    pub results: Vec<ExerciseResult>,
}

impl WorkoutSession {
    /// Maps the workout_sessions table row; results are loaded separately.
    pub fn from_row_without_results(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            workout_id: row.get("workout_id")?,
            started_at: row.get("started_at")?,
            ended_at: row.get("ended_at")?,
            completed: row.get("completed")?,
            results: Vec::new(),
        })
    }
}

/// Outcome of one exercise within a session. Each field is populated only if
/// the workout plan defined the corresponding target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseResult {
    pub exercise_id: String,
    pub reps_completed: Option<i64>,
    pub duration_completed: Option<i64>,
    pub sets_completed: Option<i64>,
}

impl FromSqliteRow for ExerciseResult {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            exercise_id: row.get("exercise_id")?,
            reps_completed: row.get("reps_completed")?,
            duration_completed: row.get("duration_completed")?,
            sets_completed: row.get("sets_completed")?,
        })
    }
}

/// A session joined with the workout it was an attempt at.
#[derive(Debug, Clone, Serialize)]
pub struct SessionWithWorkout {
    pub session: WorkoutSession,
    pub workout: Workout,
}
