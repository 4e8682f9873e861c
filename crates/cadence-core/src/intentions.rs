//! Daily intentions: a short committed list of what today is for.
//!
//! Intentions are committed once per day and individually completable.
//! They are deliberately lighter-weight than tasks -- free text, no
//! scheduling, gone tomorrow.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One committed intention for a given day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intention {
    pub id: String,
    pub date: NaiveDate,
    pub text: String,
    pub committed_at: DateTime<Utc>,
    pub completed: bool,
}

impl Intention {
    pub fn new(date: NaiveDate, text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            date,
            text: text.into(),
            committed_at: Utc::now(),
            completed: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_intention_starts_incomplete() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 28).unwrap();
        let intent = Intention::new(date, "ship the report");
        assert!(!intent.completed);
        assert_eq!(intent.date, date);
    }
}
