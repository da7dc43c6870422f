use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::Row;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::{Difficulty, Exercise, FromSqliteRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Strength,
    Cardio,
    Hiit,
    Flexibility,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Strength => "strength",
            Category::Cardio => "cardio",
            Category::Hiit => "hiit",
            Category::Flexibility => "flexibility",
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strength" => Ok(Category::Strength),
            "cardio" => Ok(Category::Cardio),
            "hiit" => Ok(Category::Hiit),
            "flexibility" => Ok(Category::Flexibility),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

impl ToSql for Category {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Category {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

/// One entry in a workout's ordered exercise plan. At least one of
/// `reps`/`duration_seconds` is expected to be set; `sets` is independent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutExercise {
    pub exercise_id: String,
    pub reps: Option<i64>,
    pub duration_seconds: Option<i64>,
    pub sets: Option<i64>,
}

impl FromSqliteRow for WorkoutExercise {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            exercise_id: row.get("exercise_id")?,
            reps: row.get("reps")?,
            duration_seconds: row.get("duration_seconds")?,
            sets: row.get("sets")?,
        })
    }
}

/// A catalog workout definition with its ordered exercise plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workout {
    pub id: String,
    pub name: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub estimated_duration: i64,
    pub category: Category,
    pub exercises: Vec<WorkoutExercise>,
}

impl Workout {
    /// Maps the workouts table row; the plan is loaded separately.
    pub fn from_row_without_exercises(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            difficulty: row.get("difficulty")?,
            estimated_duration: row.get("estimated_duration")?,
            category: row.get("category")?,
            exercises: Vec::new(),
        })
    }
}

/// A plan entry joined with its exercise definition, as the runner consumes it.
#[derive(Debug, Clone, Serialize)]
pub struct WorkoutExerciseDetail {
    #[serde(flatten)]
    pub exercise: Exercise,
    pub reps: Option<i64>,
    pub duration_seconds: Option<i64>,
    pub sets: Option<i64>,
}

/// A workout with its plan entries resolved against the exercise catalog.
#[derive(Debug, Clone, Serialize)]
pub struct WorkoutDetail {
    #[serde(flatten)]
    pub workout: Workout,
    pub exercise_details: Vec<WorkoutExerciseDetail>,
}
