use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::{AppError, Result};
use crate::models::{
    Category, Difficulty, Exercise, FromSqliteRow, Workout, WorkoutDetail, WorkoutExercise,
    WorkoutExerciseDetail,
};

#[derive(Clone)]
pub struct WorkoutRepository {
    pool: DbPool,
}

impl WorkoutRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Workout>> {
        let pool = self.pool.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            load_workout(&conn, &id)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// A workout with each plan entry joined against the exercise catalog,
    /// preserving plan order. Entries whose exercise has been removed from the
    /// catalog are skipped rather than erroring.
    pub async fn find_detail_by_id(&self, id: &str) -> Result<Option<WorkoutDetail>> {
        let pool = self.pool.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let Some(workout) = load_workout(&conn, &id)? else {
                return Ok(None);
            };

            let mut stmt = conn.prepare("SELECT * FROM exercises WHERE id = ?")?;
            let mut exercise_details = Vec::with_capacity(workout.exercises.len());
            for entry in &workout.exercises {
                let exercise: Option<Exercise> = stmt
                    .query_row([&entry.exercise_id], Exercise::from_row)
                    .optional()?;
                if let Some(exercise) = exercise {
                    exercise_details.push(WorkoutExerciseDetail {
                        exercise,
                        reps: entry.reps,
                        duration_seconds: entry.duration_seconds,
                        sets: entry.sets,
                    });
                }
            }

            Ok(Some(WorkoutDetail {
                workout,
                exercise_details,
            }))
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn find_all(&self) -> Result<Vec<Workout>> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare("SELECT * FROM workouts ORDER BY name")?;
            let mut workouts = stmt
                .query_map([], Workout::from_row_without_exercises)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            for workout in &mut workouts {
                workout.exercises = load_plan(&conn, &workout.id)?;
            }
            Ok(workouts)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn find_by_category(&self, category: Category) -> Result<Vec<Workout>> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare("SELECT * FROM workouts WHERE category = ? ORDER BY name")?;
            let mut workouts = stmt
                .query_map([&category], Workout::from_row_without_exercises)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            for workout in &mut workouts {
                workout.exercises = load_plan(&conn, &workout.id)?;
            }
            Ok(workouts)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Insert a catalog workout with its plan. Seeding/test use.
    pub async fn create(
        &self,
        name: &str,
        description: &str,
        difficulty: Difficulty,
        estimated_duration: i64,
        category: Category,
        exercises: Vec<WorkoutExercise>,
    ) -> Result<Workout> {
        let workout = Workout {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: description.to_string(),
            difficulty,
            estimated_duration,
            category,
            exercises,
        };
        let workout_clone = workout.clone();

        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut conn = pool.get()?;
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO workouts (id, name, description, difficulty, estimated_duration, category)
                 VALUES (?, ?, ?, ?, ?, ?)",
                rusqlite::params![
                    workout_clone.id,
                    workout_clone.name,
                    workout_clone.description,
                    workout_clone.difficulty,
                    workout_clone.estimated_duration,
                    workout_clone.category,
                ],
            )?;
            for (position, entry) in workout_clone.exercises.iter().enumerate() {
                tx.execute(
                    "INSERT INTO workout_exercises (workout_id, position, exercise_id, reps, duration_seconds, sets)
                     VALUES (?, ?, ?, ?, ?, ?)",
                    rusqlite::params![
                        workout_clone.id,
                        position as i64,
                        entry.exercise_id,
                        entry.reps,
                        entry.duration_seconds,
                        entry.sets,
                    ],
                )?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

        Ok(workout)
    }

    /// Remove a workout from the catalog. Test use: sessions referencing a
    /// removed workout must degrade gracefully, not error.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let pool = self.pool.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let affected = conn.execute("DELETE FROM workouts WHERE id = ?", [&id])?;
            Ok(affected > 0)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }
}

fn load_workout(conn: &Connection, id: &str) -> Result<Option<Workout>> {
    let mut stmt = conn.prepare("SELECT * FROM workouts WHERE id = ?")?;
    let workout = stmt
        .query_row([id], Workout::from_row_without_exercises)
        .optional()?;
    match workout {
        Some(mut workout) => {
            workout.exercises = load_plan(conn, &workout.id)?;
            Ok(Some(workout))
        }
        None => Ok(None),
    }
}

fn load_plan(conn: &Connection, workout_id: &str) -> Result<Vec<WorkoutExercise>> {
    let mut stmt =
        conn.prepare("SELECT * FROM workout_exercises WHERE workout_id = ? ORDER BY position")?;
    let entries = stmt
        .query_map([workout_id], WorkoutExercise::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(entries)
}
