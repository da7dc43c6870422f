use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{exercises, health, sessions, stats, workouts};

pub fn create_router(
    sessions_state: sessions::SessionsState,
    stats_state: stats::StatsState,
    workouts_state: workouts::WorkoutsState,
    exercises_state: exercises::ExercisesState,
) -> Router {
    Router::new()
        // Session lifecycle
        .route("/sessions", post(sessions::start).get(sessions::list))
        .route("/sessions/{id}/complete", post(sessions::complete))
        .with_state(sessions_state)
        // Stats
        .route("/stats", get(stats::index))
        .with_state(stats_state)
        // Catalog (read-only)
        .route("/workouts", get(workouts::list))
        .route("/workouts/{id}", get(workouts::show))
        .with_state(workouts_state)
        .route("/exercises", get(exercises::list))
        .route("/exercises/{id}", get(exercises::show))
        .with_state(exercises_state)
        // Health
        .route("/health", get(health::health_check))
}
