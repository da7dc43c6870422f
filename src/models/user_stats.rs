use chrono::{DateTime, Local, NaiveDate, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::FromSqliteRow;

/// Which timezone defines the calendar day for streak accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayBoundary {
    Local,
    Utc,
}

impl DayBoundary {
    pub fn date_of(&self, ts: DateTime<Utc>) -> NaiveDate {
        match self {
            DayBoundary::Local => ts.with_timezone(&Local).date_naive(),
            DayBoundary::Utc => ts.date_naive(),
        }
    }
}

impl FromStr for DayBoundary {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(DayBoundary::Local),
            "utc" => Ok(DayBoundary::Utc),
            other => Err(format!("unknown day boundary: {other}")),
        }
    }
}

/// Cumulative per-user fitness totals, one row per user, upserted on every
/// session completion. `longest_streak >= current_streak` always holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStats {
    pub user_id: String,
    pub total_workouts: i64,
    pub total_minutes: i64,
    pub current_streak: i64,
    pub longest_streak: i64,
    pub last_workout_at: Option<DateTime<Utc>>,
}

impl FromSqliteRow for UserStats {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            user_id: row.get("user_id")?,
            total_workouts: row.get("total_workouts")?,
            total_minutes: row.get("total_minutes")?,
            current_streak: row.get("current_streak")?,
            longest_streak: row.get("longest_streak")?,
            last_workout_at: row.get("last_workout_at")?,
        })
    }
}
