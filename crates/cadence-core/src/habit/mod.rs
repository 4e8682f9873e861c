//! Habit types: tracked habits and their daily completion entries.

pub mod streaks;

pub use streaks::{RollingStats, StreakAnalyzer};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A tracked habit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    pub name: String,
    /// Optional free-text rule ("after lunch", "at least 20 min").
    pub rule: Option<String>,
    /// Display ordering, lowest first.
    pub position: i64,
}

/// A daily completion entry, keyed by (habit, date).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitEntry {
    pub date: NaiveDate,
    pub completed: bool,
}
