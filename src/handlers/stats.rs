use axum::{extract::State, Json};

use crate::error::Result;
use crate::middleware::OptionalAuthUser;
use crate::models::UserStats;
use crate::repositories::StatsRepository;

#[derive(Clone)]
pub struct StatsState {
    pub stats_repo: StatsRepository,
}

/// `GET /stats` — the caller's aggregate, `null` when anonymous or when no
/// session was ever completed.
pub async fn index(
    State(state): State<StatsState>,
    OptionalAuthUser(auth_user): OptionalAuthUser,
) -> Result<Json<Option<UserStats>>> {
    let Some(auth_user) = auth_user else {
        return Ok(Json(None));
    };
    let stats = state.stats_repo.find_by_user(&auth_user.id).await?;
    Ok(Json(stats))
}
