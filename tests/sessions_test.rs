mod common;

use http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use fitstreak::repositories::{SessionRepository, StatsRepository, WorkoutRepository};

#[tokio::test]
async fn start_requires_identity() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool);

    let response = app
        .oneshot(common::post_json("/sessions", json!({ "workout_id": "w1" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn start_creates_open_session() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool.clone());
    let workout = common::create_simple_workout(&pool, "Morning routine").await;

    let response = app
        .oneshot(common::post_json_as(
            "/sessions",
            "alice",
            json!({ "workout_id": workout.id }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["user_id"], "alice");
    assert_eq!(body["workout_id"], workout.id.as_str());
    assert_eq!(body["completed"], false);
    assert!(body["ended_at"].is_null());
    assert_eq!(body["results"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn double_start_reuses_open_session() {
    // Scenario: start invoked twice in quick succession must not produce two
    // open sessions that both complete and double-count stats.
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool.clone());
    let workout = common::create_simple_workout(&pool, "Morning routine").await;

    let first = common::body_json(
        app.clone()
            .oneshot(common::post_json_as(
                "/sessions",
                "alice",
                json!({ "workout_id": workout.id }),
            ))
            .await
            .unwrap(),
    )
    .await;
    let second = common::body_json(
        app.oneshot(common::post_json_as(
            "/sessions",
            "alice",
            json!({ "workout_id": workout.id }),
        ))
        .await
        .unwrap(),
    )
    .await;

    assert_eq!(first["id"], second["id"]);
}

#[tokio::test]
async fn start_after_completion_creates_new_session() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool.clone());
    let workout = common::create_simple_workout(&pool, "Morning routine").await;

    let first = common::body_json(
        app.clone()
            .oneshot(common::post_json_as(
                "/sessions",
                "alice",
                json!({ "workout_id": workout.id }),
            ))
            .await
            .unwrap(),
    )
    .await;
    let first_id = first["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(common::post_json_as(
            &format!("/sessions/{first_id}/complete"),
            "alice",
            json!({ "exercise_results": [] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let second = common::body_json(
        app.oneshot(common::post_json_as(
            "/sessions",
            "alice",
            json!({ "workout_id": workout.id }),
        ))
        .await
        .unwrap(),
    )
    .await;
    assert_ne!(second["id"].as_str().unwrap(), first_id);
}

#[tokio::test]
async fn complete_closes_session_and_updates_stats() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool.clone());
    let workout = common::create_simple_workout(&pool, "Morning routine").await;
    let exercise_id = workout.exercises[0].exercise_id.clone();

    let session = common::body_json(
        app.clone()
            .oneshot(common::post_json_as(
                "/sessions",
                "alice",
                json!({ "workout_id": workout.id }),
            ))
            .await
            .unwrap(),
    )
    .await;
    let session_id = session["id"].as_str().unwrap().to_string();

    let response = app
        .oneshot(common::post_json_as(
            &format!("/sessions/{session_id}/complete"),
            "alice",
            json!({
                "exercise_results": [{
                    "exercise_id": exercise_id,
                    "reps_completed": 8,
                    "duration_completed": null,
                    "sets_completed": 3
                }]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    assert_eq!(body["session"]["completed"], true);
    assert_eq!(body["session"]["results"][0]["reps_completed"], 8);
    assert_eq!(body["stats"]["total_workouts"], 1);
    assert_eq!(body["stats"]["current_streak"], 1);
    assert_eq!(body["stats"]["longest_streak"], 1);

    // ended_at is set together with the completion flag, after started_at.
    let started: chrono::DateTime<chrono::Utc> =
        serde_json::from_value(body["session"]["started_at"].clone()).unwrap();
    let ended: chrono::DateTime<chrono::Utc> =
        serde_json::from_value(body["session"]["ended_at"].clone()).unwrap();
    assert!(ended > started);

    // Repo view agrees with the response.
    let session_repo = SessionRepository::new(pool.clone());
    let stored = session_repo.find_by_id(&session_id).await.unwrap().unwrap();
    assert!(stored.completed);
    assert!(stored.ended_at.is_some());
    assert_eq!(stored.results.len(), 1);
}

#[tokio::test]
async fn complete_unknown_session_is_not_found() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool);

    let response = app
        .oneshot(common::post_json_as(
            "/sessions/nope/complete",
            "alice",
            json!({ "exercise_results": [] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn complete_foreign_session_is_forbidden_and_leaves_records_untouched() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool.clone());
    let workout = common::create_simple_workout(&pool, "Morning routine").await;

    let session = common::body_json(
        app.clone()
            .oneshot(common::post_json_as(
                "/sessions",
                "alice",
                json!({ "workout_id": workout.id }),
            ))
            .await
            .unwrap(),
    )
    .await;
    let session_id = session["id"].as_str().unwrap().to_string();

    let response = app
        .oneshot(common::post_json_as(
            &format!("/sessions/{session_id}/complete"),
            "mallory",
            json!({ "exercise_results": [] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The session is still open and neither user gained stats.
    let session_repo = SessionRepository::new(pool.clone());
    let stored = session_repo.find_by_id(&session_id).await.unwrap().unwrap();
    assert!(!stored.completed);
    assert!(stored.ended_at.is_none());

    let stats_repo = StatsRepository::new(pool);
    assert!(stats_repo.find_by_user("alice").await.unwrap().is_none());
    assert!(stats_repo.find_by_user("mallory").await.unwrap().is_none());
}

#[tokio::test]
async fn completing_twice_is_rejected_without_double_counting() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool.clone());
    let workout = common::create_simple_workout(&pool, "Morning routine").await;

    let session = common::body_json(
        app.clone()
            .oneshot(common::post_json_as(
                "/sessions",
                "alice",
                json!({ "workout_id": workout.id }),
            ))
            .await
            .unwrap(),
    )
    .await;
    let session_id = session["id"].as_str().unwrap().to_string();

    let first = app
        .clone()
        .oneshot(common::post_json_as(
            &format!("/sessions/{session_id}/complete"),
            "alice",
            json!({ "exercise_results": [] }),
        ))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .oneshot(common::post_json_as(
            &format!("/sessions/{session_id}/complete"),
            "alice",
            json!({ "exercise_results": [] }),
        ))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);

    let stats_repo = StatsRepository::new(pool);
    let stats = stats_repo.find_by_user("alice").await.unwrap().unwrap();
    assert_eq!(stats.total_workouts, 1);
}

#[tokio::test]
async fn list_without_identity_returns_empty() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool);

    let response = app.oneshot(common::get("/sessions")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn list_returns_own_sessions_newest_first_capped_at_twenty() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool.clone());
    let workout = common::create_simple_workout(&pool, "Morning routine").await;

    for _ in 0..25 {
        let session = common::body_json(
            app.clone()
                .oneshot(common::post_json_as(
                    "/sessions",
                    "alice",
                    json!({ "workout_id": workout.id }),
                ))
                .await
                .unwrap(),
        )
        .await;
        let session_id = session["id"].as_str().unwrap().to_string();
        app.clone()
            .oneshot(common::post_json_as(
                &format!("/sessions/{session_id}/complete"),
                "alice",
                json!({ "exercise_results": [] }),
            ))
            .await
            .unwrap();
        // Distinct start timestamps keep the ordering assertion meaningful.
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    // Another user's session must not appear.
    app.clone()
        .oneshot(common::post_json_as(
            "/sessions",
            "bob",
            json!({ "workout_id": workout.id }),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(common::get_as("/sessions", "alice"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 20);

    for entry in entries {
        assert_eq!(entry["session"]["user_id"], "alice");
        assert_eq!(entry["workout"]["id"], workout.id.as_str());
    }

    let timestamps: Vec<chrono::DateTime<chrono::Utc>> = entries
        .iter()
        .map(|e| serde_json::from_value(e["session"]["started_at"].clone()).unwrap())
        .collect();
    for pair in timestamps.windows(2) {
        assert!(pair[0] >= pair[1], "sessions must be newest-first");
    }
}

#[tokio::test]
async fn list_drops_sessions_whose_workout_was_removed() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool.clone());
    let kept = common::create_simple_workout(&pool, "Kept workout").await;
    let removed = common::create_simple_workout(&pool, "Removed workout").await;

    for workout_id in [&kept.id, &removed.id] {
        app.clone()
            .oneshot(common::post_json_as(
                "/sessions",
                "alice",
                json!({ "workout_id": workout_id }),
            ))
            .await
            .unwrap();
    }

    let workout_repo = WorkoutRepository::new(pool.clone());
    assert!(workout_repo.delete(&removed.id).await.unwrap());

    let response = app
        .oneshot(common::get_as("/sessions", "alice"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["workout"]["id"], kept.id.as_str());
}
