//! Streak and rolling-stat computation over habit completion history.
//!
//! Works on the raw set of completion dates for one habit. A current streak
//! counts consecutive days ending today or yesterday -- not completing
//! *today* does not break a run that ran through yesterday. Cold days count
//! days since the last completion, excluding today, so a habit done
//! yesterday shows zero cold days. A streak of 1 is reported as 1.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Aggregated streak and rolling-average figures for one habit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RollingStats {
    /// Consecutive run ending today or yesterday; 0 when lapsed.
    pub current_streak: u32,
    /// Longest historical run.
    pub longest_streak: u32,
    /// Completions per week, from the trailing 7-day window.
    pub weekly_avg: f64,
    /// Completions per month, from the trailing 30-day window.
    pub monthly_avg: f64,
    /// Completions per 90 days, from the trailing 90-day window.
    pub ninety_day_avg: f64,
    /// Days since last completion excluding today; None with no history.
    pub cold_days: Option<i64>,
}

/// Computes [`RollingStats`] relative to a fixed "today".
#[derive(Debug, Clone, Copy)]
pub struct StreakAnalyzer {
    pub today: NaiveDate,
}

impl StreakAnalyzer {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Analyze a habit's completion dates.
    ///
    /// Dates may arrive unsorted and with duplicates; future-dated entries
    /// are ignored.
    pub fn analyze(&self, completions: &[NaiveDate]) -> RollingStats {
        let mut dates: Vec<NaiveDate> = completions
            .iter()
            .copied()
            .filter(|d| *d <= self.today)
            .collect();
        dates.sort();
        dates.dedup();

        if dates.is_empty() {
            return RollingStats::default();
        }

        RollingStats {
            current_streak: self.current_streak(&dates),
            longest_streak: longest_streak(&dates),
            weekly_avg: self.window_avg(&dates, 7),
            monthly_avg: self.window_avg(&dates, 30),
            ninety_day_avg: self.window_avg(&dates, 90),
            cold_days: self.cold_days(&dates),
        }
    }

    /// Run of consecutive days ending today or yesterday.
    fn current_streak(&self, sorted: &[NaiveDate]) -> u32 {
        let Some(&last) = sorted.last() else {
            return 0;
        };
        let lapse = self.today.signed_duration_since(last).num_days();
        if lapse > 1 {
            return 0;
        }
        let mut streak = 1u32;
        let mut cursor = last;
        for date in sorted.iter().rev().skip(1) {
            if cursor.signed_duration_since(*date).num_days() == 1 {
                streak += 1;
                cursor = *date;
            } else {
                break;
            }
        }
        streak
    }

    /// Completions in the trailing `window` days, scaled from the daily
    /// rate back to the window period. Elapsed days are clamped to the
    /// habit's observed history so a week-old habit isn't diluted by an
    /// empty 90-day window.
    fn window_avg(&self, sorted: &[NaiveDate], window: i64) -> f64 {
        let Some(&first) = sorted.first() else {
            return 0.0;
        };
        let window_start = self.today - Duration::days(window - 1);
        let count = sorted.iter().filter(|d| **d >= window_start).count();
        let observed = self.today.signed_duration_since(first).num_days() + 1;
        let elapsed = observed.clamp(1, window);
        count as f64 / elapsed as f64 * window as f64
    }

    /// Days since last completion, excluding today.
    fn cold_days(&self, sorted: &[NaiveDate]) -> Option<i64> {
        let last = *sorted.last()?;
        let gap = self.today.signed_duration_since(last).num_days();
        Some((gap - 1).max(0))
    }
}

/// Longest run of consecutive days anywhere in history.
fn longest_streak(sorted: &[NaiveDate]) -> u32 {
    if sorted.is_empty() {
        return 0;
    }
    let mut longest = 1u32;
    let mut run = 1u32;
    for pair in sorted.windows(2) {
        if pair[1].signed_duration_since(pair[0]).num_days() == 1 {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 1;
        }
    }
    longest
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, day).unwrap()
    }

    fn analyzer() -> StreakAnalyzer {
        StreakAnalyzer::new(d(28))
    }

    #[test]
    fn three_consecutive_days_ending_today() {
        let stats = analyzer().analyze(&[d(26), d(27), d(28)]);
        assert_eq!(stats.current_streak, 3);
        assert_eq!(stats.longest_streak, 3);
    }

    #[test]
    fn run_ending_yesterday_still_counts() {
        let stats = analyzer().analyze(&[d(25), d(26), d(27)]);
        assert_eq!(stats.current_streak, 3);
    }

    #[test]
    fn lapsed_run_is_zero() {
        let stats = analyzer().analyze(&[d(22), d(23), d(24)]);
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.longest_streak, 3);
    }

    #[test]
    fn single_completion_reports_streak_of_one() {
        let stats = analyzer().analyze(&[d(28)]);
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.longest_streak, 1);
    }

    #[test]
    fn longest_run_survives_later_gaps() {
        let stats = analyzer().analyze(&[d(1), d(2), d(3), d(4), d(10), d(11), d(28)]);
        assert_eq!(stats.longest_streak, 4);
        assert_eq!(stats.current_streak, 1);
    }

    #[test]
    fn cold_days_exclude_today() {
        // last completion 5 days before today -> 4 cold days
        let stats = analyzer().analyze(&[d(23)]);
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.cold_days, Some(4));
    }

    #[test]
    fn done_yesterday_is_zero_cold_days() {
        let stats = analyzer().analyze(&[d(27)]);
        assert_eq!(stats.cold_days, Some(0));
    }

    #[test]
    fn done_today_is_zero_cold_days() {
        let stats = analyzer().analyze(&[d(28)]);
        assert_eq!(stats.cold_days, Some(0));
    }

    #[test]
    fn no_history_yields_defaults() {
        let stats = analyzer().analyze(&[]);
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.longest_streak, 0);
        assert_eq!(stats.cold_days, None);
        assert_eq!(stats.weekly_avg, 0.0);
    }

    #[test]
    fn duplicates_and_order_do_not_matter() {
        let stats = analyzer().analyze(&[d(28), d(26), d(27), d(27)]);
        assert_eq!(stats.current_streak, 3);
    }

    #[test]
    fn future_entries_are_ignored() {
        let stats = analyzer().analyze(&[d(27), d(31)]);
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.cold_days, Some(0));
    }

    #[test]
    fn full_week_gives_weekly_avg_of_seven() {
        let dates: Vec<NaiveDate> = (22..=28).map(d).collect();
        let stats = analyzer().analyze(&dates);
        assert!((stats.weekly_avg - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn short_history_is_not_diluted_by_long_windows() {
        // habit is 2 days old, done both days: rate is 1/day
        let stats = analyzer().analyze(&[d(27), d(28)]);
        assert!((stats.weekly_avg - 7.0).abs() < 1e-9);
        assert!((stats.monthly_avg - 30.0).abs() < 1e-9);
        assert!((stats.ninety_day_avg - 90.0).abs() < 1e-9);
    }

    #[test]
    fn partial_week_counts_window_completions() {
        let stats = StreakAnalyzer::new(d(28)).analyze(&[d(1), d(22), d(24), d(26), d(28)]);
        // 4 of the last 7 days completed, habit older than the window
        assert!((stats.weekly_avg - 4.0).abs() < 1e-9);
    }
}
