use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::middleware::{AuthUser, OptionalAuthUser};
use crate::models::{DayBoundary, ExerciseResult, SessionWithWorkout, UserStats, WorkoutSession};
use crate::repositories::SessionRepository;

#[derive(Clone)]
pub struct SessionsState {
    pub session_repo: SessionRepository,
    pub day_boundary: DayBoundary,
}

#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    pub workout_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CompleteSessionRequest {
    pub exercise_results: Vec<ExerciseResult>,
}

#[derive(Debug, Serialize)]
pub struct CompleteSessionResponse {
    pub session: WorkoutSession,
    pub stats: UserStats,
}

/// `POST /sessions` — open a session for the caller. The workout reference is
/// trusted; a dangling id degrades at read time instead of failing here.
pub async fn start(
    State(state): State<SessionsState>,
    auth_user: AuthUser,
    Json(req): Json<StartSessionRequest>,
) -> Result<Json<WorkoutSession>> {
    let session = state.session_repo.start(&auth_user.id, &req.workout_id).await?;
    Ok(Json(session))
}

/// `POST /sessions/{id}/complete` — the single closing transition. Rejects
/// with 409 if the session is already closed and 403 if it belongs to another
/// user.
pub async fn complete(
    State(state): State<SessionsState>,
    auth_user: AuthUser,
    Path(session_id): Path<String>,
    Json(req): Json<CompleteSessionRequest>,
) -> Result<Json<CompleteSessionResponse>> {
    let (session, stats) = state
        .session_repo
        .complete(&session_id, &auth_user.id, req.exercise_results, state.day_boundary)
        .await?;
    Ok(Json(CompleteSessionResponse { session, stats }))
}

/// `GET /sessions` — the caller's history, newest-first, max 20. Anonymous
/// callers get an empty list, not an error.
pub async fn list(
    State(state): State<SessionsState>,
    OptionalAuthUser(auth_user): OptionalAuthUser,
) -> Result<Json<Vec<SessionWithWorkout>>> {
    let Some(auth_user) = auth_user else {
        return Ok(Json(Vec::new()));
    };
    let sessions = state
        .session_repo
        .list_recent_with_workout(&auth_user.id)
        .await?;
    Ok(Json(sessions))
}
