use std::env;

use crate::models::DayBoundary;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Which timezone defines the calendar day for streak accounting.
    pub day_boundary: DayBoundary,
    /// Open sessions older than this are reported at startup, never force-closed.
    pub stale_session_hours: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:fitstreak.db?mode=rwc".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            day_boundary: env::var("DAY_BOUNDARY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DayBoundary::Local),
            stale_session_hours: env::var("STALE_SESSION_HOURS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(24),
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
