pub mod exercises;
pub mod health;
pub mod sessions;
pub mod stats;
pub mod workouts;
