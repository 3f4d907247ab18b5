//! Progression rules for Terra Worlds
//!
//! This crate provides the pure reward and ranking logic shared by the API:
//! mission status transitions, the XP level curve, and the calendar windows
//! used to bucket leaderboard snapshots.

use chrono::{Datelike, Days, NaiveDate};

/// Completion state of a mission for a single user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissionStatus {
    /// The mission has been started but not finished.
    InProgress,
    /// The mission has been finished (completion percentage reached 100).
    Completed,
}

impl MissionStatus {
    /// The value stored in the `user_progress.status` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

/// Derive the mission status from a completion percentage.
///
/// A mission is completed exactly when the percentage reaches 100; every
/// other value (including values the client should never send) maps to
/// `in_progress`.
#[must_use]
pub const fn status_for_completion(completion_percentage: i32) -> MissionStatus {
    if completion_percentage == 100 {
        MissionStatus::Completed
    } else {
        MissionStatus::InProgress
    }
}

/// Compute a user's level from their cumulative XP.
///
/// The curve is linear: every 100 XP is one level, and new users start at
/// level 1. This matches [`xp_for_next_level`] so that a user at level `n`
/// reaches level `n + 1` once their total XP passes `n * 100`.
#[must_use]
pub const fn level_for_xp(total_xp: i64) -> i32 {
    if total_xp <= 0 {
        return 1;
    }
    (total_xp / 100) as i32 + 1
}

/// XP total required to reach the level after `level`.
#[must_use]
pub const fn xp_for_next_level(level: i32) -> i64 {
    (level as i64 + 1) * 100
}

/// A leaderboard bucketing window, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// The Sunday-to-Saturday week containing `today`.
#[must_use]
pub fn week_window(today: NaiveDate) -> Period {
    let days_from_sunday = u64::from(today.weekday().num_days_from_sunday());
    let start = today - Days::new(days_from_sunday);
    Period {
        start,
        end: start + Days::new(6),
    }
}

/// The calendar month containing `today`.
#[must_use]
pub fn month_window(today: NaiveDate) -> Period {
    let start = today.with_day(1).expect("day 1 exists in every month");
    let next_month = if start.month() == 12 {
        NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)
    }
    .expect("first day of the following month exists");
    Period {
        start,
        end: next_month - Days::new(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_status_for_completion() {
        assert_eq!(status_for_completion(100), MissionStatus::Completed);
        assert_eq!(status_for_completion(0), MissionStatus::InProgress);
        assert_eq!(status_for_completion(99), MissionStatus::InProgress);
        assert_eq!(status_for_completion(50), MissionStatus::InProgress);
        // Out-of-range values never complete a mission
        assert_eq!(status_for_completion(101), MissionStatus::InProgress);
        assert_eq!(status_for_completion(-1), MissionStatus::InProgress);
    }

    #[test]
    fn test_status_as_str() {
        assert_eq!(MissionStatus::Completed.as_str(), "completed");
        assert_eq!(MissionStatus::InProgress.as_str(), "in_progress");
    }

    #[test]
    fn test_level_for_xp() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(99), 1);
        assert_eq!(level_for_xp(100), 2);
        assert_eq!(level_for_xp(150), 2);
        assert_eq!(level_for_xp(1000), 11);
        // Negative totals never drop below level 1
        assert_eq!(level_for_xp(-50), 1);
    }

    #[test]
    fn test_xp_for_next_level() {
        assert_eq!(xp_for_next_level(1), 200);
        assert_eq!(xp_for_next_level(2), 300);
        // level_for_xp and xp_for_next_level agree: passing the threshold
        // puts the user exactly one level higher
        for level in 1..20 {
            let threshold = xp_for_next_level(level);
            assert_eq!(level_for_xp(threshold), level + 2);
            assert_eq!(level_for_xp(threshold - 1), level + 1);
        }
    }

    #[test]
    fn test_week_window_midweek() {
        // 2024-06-12 is a Wednesday; the window runs Sunday 9th to Saturday 15th
        let window = week_window(date(2024, 6, 12));
        assert_eq!(window.start, date(2024, 6, 9));
        assert_eq!(window.end, date(2024, 6, 15));
    }

    #[test]
    fn test_week_window_on_sunday_and_saturday() {
        let sunday = date(2024, 6, 9);
        let window = week_window(sunday);
        assert_eq!(window.start, sunday);
        assert_eq!(window.end, date(2024, 6, 15));

        let saturday = date(2024, 6, 15);
        let window = week_window(saturday);
        assert_eq!(window.start, sunday);
        assert_eq!(window.end, saturday);
    }

    #[test]
    fn test_week_window_spans_month_boundary() {
        // 2024-07-02 is a Tuesday; the week started Sunday June 30th
        let window = week_window(date(2024, 7, 2));
        assert_eq!(window.start, date(2024, 6, 30));
        assert_eq!(window.end, date(2024, 7, 6));
    }

    #[test]
    fn test_month_window() {
        let window = month_window(date(2024, 6, 12));
        assert_eq!(window.start, date(2024, 6, 1));
        assert_eq!(window.end, date(2024, 6, 30));
    }

    #[test]
    fn test_month_window_december() {
        let window = month_window(date(2024, 12, 25));
        assert_eq!(window.start, date(2024, 12, 1));
        assert_eq!(window.end, date(2024, 12, 31));
    }

    #[test]
    fn test_month_window_leap_february() {
        let window = month_window(date(2024, 2, 10));
        assert_eq!(window.end, date(2024, 2, 29));

        let window = month_window(date(2023, 2, 10));
        assert_eq!(window.end, date(2023, 2, 28));
    }
}
