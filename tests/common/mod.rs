#![allow(dead_code)] // Each test binary uses a subset of these helpers

use axum::{body::Body, Router};
use http::{header, Request};
use http_body_util::BodyExt;

use fitstreak::db::{create_memory_pool, DbPool};
use fitstreak::handlers::{exercises, sessions, stats, workouts};
use fitstreak::migrations::run_migrations_for_tests;
use fitstreak::models::{Category, DayBoundary, Difficulty, Equipment, WorkoutExercise};
use fitstreak::repositories::{
    ExerciseRepository, SessionRepository, StatsRepository, WorkoutRepository,
};

pub fn setup_test_db() -> DbPool {
    let pool = create_memory_pool().expect("Failed to create test database");
    run_migrations_for_tests(&pool).expect("Failed to run migrations");
    pool
}

pub fn create_test_app(pool: DbPool) -> Router {
    let sessions_state = sessions::SessionsState {
        session_repo: SessionRepository::new(pool.clone()),
        day_boundary: DayBoundary::Utc,
    };
    let stats_state = stats::StatsState {
        stats_repo: StatsRepository::new(pool.clone()),
    };
    let workouts_state = workouts::WorkoutsState {
        workout_repo: WorkoutRepository::new(pool.clone()),
    };
    let exercises_state = exercises::ExercisesState {
        exercise_repo: ExerciseRepository::new(pool.clone()),
    };

    fitstreak::routes::create_router(sessions_state, stats_state, workouts_state, exercises_state)
}

// Test data creation helpers

pub async fn create_test_exercise(pool: &DbPool, name: &str) -> fitstreak::models::Exercise {
    let exercise_repo = ExerciseRepository::new(pool.clone());
    exercise_repo
        .create(
            name,
            "A bodyweight exercise",
            &["Get into position".to_string(), "Do the movement".to_string()],
            &["core".to_string()],
            Difficulty::Beginner,
            Equipment::None,
        )
        .await
        .unwrap()
}

pub async fn create_test_workout(
    pool: &DbPool,
    name: &str,
    category: Category,
    exercises: Vec<WorkoutExercise>,
) -> fitstreak::models::Workout {
    let workout_repo = WorkoutRepository::new(pool.clone());
    workout_repo
        .create(name, "A test workout", Difficulty::Beginner, 20, category, exercises)
        .await
        .unwrap()
}

/// A one-exercise workout with a rep target, enough for lifecycle tests.
pub async fn create_simple_workout(pool: &DbPool, name: &str) -> fitstreak::models::Workout {
    let exercise = create_test_exercise(pool, &format!("{name} exercise")).await;
    create_test_workout(
        pool,
        name,
        Category::Strength,
        vec![WorkoutExercise {
            exercise_id: exercise.id,
            reps: Some(10),
            duration_seconds: None,
            sets: Some(3),
        }],
    )
    .await
}

// Request helpers

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_as(uri: &str, user_id: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-user-id", user_id)
        .body(Body::empty())
        .unwrap()
}

pub fn post_json_as(uri: &str, user_id: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("x-user-id", user_id)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
