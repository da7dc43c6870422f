use rusqlite::OptionalExtension;

use crate::db::DbPool;
use crate::error::{AppError, Result};
use crate::models::{FromSqliteRow, UserStats};

/// Read access to the per-user stats aggregate. Writes happen only inside the
/// session completion transaction.
#[derive(Clone)]
pub struct StatsRepository {
    pool: DbPool,
}

impl StatsRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_user(&self, user_id: &str) -> Result<Option<UserStats>> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let stats = conn
                .query_row(
                    "SELECT * FROM user_stats WHERE user_id = ?",
                    [&user_id],
                    UserStats::from_row,
                )
                .optional()?;
            Ok(stats)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }
}
