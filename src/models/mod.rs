pub mod exercise;
pub mod from_row;
pub mod user_stats;
pub mod workout;
pub mod workout_session;

pub use exercise::{Difficulty, Equipment, Exercise};
pub use from_row::FromSqliteRow;
pub use user_stats::{DayBoundary, UserStats};
pub use workout::{Category, Workout, WorkoutDetail, WorkoutExercise, WorkoutExerciseDetail};
pub use workout_session::{ExerciseResult, SessionWithWorkout, WorkoutSession};
