//! Streak and totals aggregation, run once per completed session.
//!
//! Streaks count consecutive calendar days with at least one completion,
//! compared by calendar date (not a rolling 24h window). Two sessions
//! straddling midnight therefore land on different days.

use chrono::{DateTime, Duration, Utc};

use crate::models::{DayBoundary, UserStats};

/// Fold one completion event into a user's stats.
///
/// Pure: returns the next stats row without touching storage. The caller is
/// responsible for invoking this exactly once per completion event, inside the
/// same transaction that closes the session.
pub fn aggregate(
    existing: Option<&UserStats>,
    user_id: &str,
    completed_at: DateTime<Utc>,
    duration_minutes: i64,
    boundary: DayBoundary,
) -> UserStats {
    let Some(stats) = existing else {
        return UserStats {
            user_id: user_id.to_string(),
            total_workouts: 1,
            total_minutes: duration_minutes,
            current_streak: 1,
            longest_streak: 1,
            last_workout_at: Some(completed_at),
        };
    };

    let today = boundary.date_of(completed_at);
    let last_date = stats.last_workout_at.map(|ts| boundary.date_of(ts));

    let current_streak = match last_date {
        // Second completion on the same calendar day: streak unchanged.
        Some(d) if d == today => stats.current_streak,
        // Consecutive day: streak extends.
        Some(d) if d == today - Duration::days(1) => stats.current_streak + 1,
        // Gap of 2+ days or no prior date: streak resets.
        _ => 1,
    };

    UserStats {
        user_id: stats.user_id.clone(),
        total_workouts: stats.total_workouts + 1,
        total_minutes: stats.total_minutes + duration_minutes,
        current_streak,
        longest_streak: stats.longest_streak.max(current_streak),
        last_workout_at: Some(completed_at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn first_completion_initializes_stats() {
        // Scenario A: 25 minutes, no prior stats.
        let stats = aggregate(None, "u1", ts(2024, 3, 1, 9), 25, DayBoundary::Utc);
        assert_eq!(stats.total_workouts, 1);
        assert_eq!(stats.total_minutes, 25);
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.longest_streak, 1);
        assert_eq!(stats.last_workout_at, Some(ts(2024, 3, 1, 9)));
    }

    #[test]
    fn next_day_completion_extends_streak() {
        // Scenario B: second session the next calendar day.
        let first = aggregate(None, "u1", ts(2024, 3, 1, 9), 25, DayBoundary::Utc);
        let second = aggregate(Some(&first), "u1", ts(2024, 3, 2, 7), 10, DayBoundary::Utc);
        assert_eq!(second.total_workouts, 2);
        assert_eq!(second.total_minutes, 35);
        assert_eq!(second.current_streak, 2);
        assert_eq!(second.longest_streak, 2);
    }

    #[test]
    fn gap_resets_streak_but_keeps_longest() {
        // Scenario C: third session 3 calendar days later.
        let first = aggregate(None, "u1", ts(2024, 3, 1, 9), 25, DayBoundary::Utc);
        let second = aggregate(Some(&first), "u1", ts(2024, 3, 2, 7), 10, DayBoundary::Utc);
        let third = aggregate(Some(&second), "u1", ts(2024, 3, 5, 18), 15, DayBoundary::Utc);
        assert_eq!(third.current_streak, 1);
        assert_eq!(third.longest_streak, 2);
        assert_eq!(third.total_workouts, 3);
        assert_eq!(third.total_minutes, 50);
    }

    #[test]
    fn same_day_repeat_does_not_increment_streak() {
        let first = aggregate(None, "u1", ts(2024, 3, 1, 9), 25, DayBoundary::Utc);
        let repeat = aggregate(Some(&first), "u1", ts(2024, 3, 1, 21), 10, DayBoundary::Utc);
        assert_eq!(repeat.current_streak, 1);
        assert_eq!(repeat.total_workouts, 2);
        assert_eq!(repeat.total_minutes, 35);
    }

    #[test]
    fn streak_rebuilds_after_reset_without_lowering_longest() {
        let mut stats = aggregate(None, "u1", ts(2024, 3, 1, 9), 10, DayBoundary::Utc);
        for day in 2..=4 {
            stats = aggregate(Some(&stats), "u1", ts(2024, 3, day, 9), 10, DayBoundary::Utc);
        }
        assert_eq!(stats.current_streak, 4);
        assert_eq!(stats.longest_streak, 4);

        // Break the streak, then rebuild two days.
        stats = aggregate(Some(&stats), "u1", ts(2024, 3, 10, 9), 10, DayBoundary::Utc);
        stats = aggregate(Some(&stats), "u1", ts(2024, 3, 11, 9), 10, DayBoundary::Utc);
        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.longest_streak, 4);
    }

    #[test]
    fn longest_streak_never_below_current() {
        let mut stats = aggregate(None, "u1", ts(2024, 1, 1, 12), 5, DayBoundary::Utc);
        for day in 2..=20 {
            stats = aggregate(Some(&stats), "u1", ts(2024, 1, day, 12), 5, DayBoundary::Utc);
            assert!(stats.longest_streak >= stats.current_streak);
        }
    }

    #[test]
    fn sessions_straddling_midnight_count_as_different_days() {
        let before = aggregate(None, "u1", ts(2024, 3, 1, 23), 30, DayBoundary::Utc);
        let after = aggregate(Some(&before), "u1", ts(2024, 3, 2, 0), 30, DayBoundary::Utc);
        assert_eq!(after.current_streak, 2);
    }

    #[test]
    fn missing_last_workout_date_resets_streak() {
        let stats = UserStats {
            user_id: "u1".to_string(),
            total_workouts: 5,
            total_minutes: 100,
            current_streak: 3,
            longest_streak: 4,
            last_workout_at: None,
        };
        let next = aggregate(Some(&stats), "u1", ts(2024, 3, 1, 9), 10, DayBoundary::Utc);
        assert_eq!(next.current_streak, 1);
        assert_eq!(next.longest_streak, 4);
        assert_eq!(next.total_workouts, 6);
    }
}
