use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{Category, Workout, WorkoutDetail};
use crate::repositories::WorkoutRepository;

#[derive(Clone)]
pub struct WorkoutsState {
    pub workout_repo: WorkoutRepository,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<Category>,
}

pub async fn list(
    State(state): State<WorkoutsState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Workout>>> {
    let workouts = match query.category {
        Some(category) => state.workout_repo.find_by_category(category).await?,
        None => state.workout_repo.find_all().await?,
    };
    Ok(Json(workouts))
}

pub async fn show(
    State(state): State<WorkoutsState>,
    Path(id): Path<String>,
) -> Result<Json<WorkoutDetail>> {
    let detail = state
        .workout_repo
        .find_detail_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Workout not found".to_string()))?;
    Ok(Json(detail))
}
