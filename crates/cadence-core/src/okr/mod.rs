//! OKR types: pillars, key results, and quarterly objectives.
//!
//! Objectives are created per quarter and archived (soft-deleted) rather
//! than removed. A key result can be "punted" -- deprioritized and excluded
//! from challenge selection -- without losing its recorded progress.

pub mod progress;

pub use progress::normalize_progress;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Life-domain pillar grouping objectives and priorities.
///
/// The declaration order is the canonical display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pillar {
    Power,
    Passion,
    Purpose,
    Production,
}

impl Pillar {
    /// All pillars in canonical display order.
    pub const ALL: [Pillar; 4] = [
        Pillar::Power,
        Pillar::Passion,
        Pillar::Purpose,
        Pillar::Production,
    ];

    /// Position in the canonical sort order.
    pub fn sort_key(self) -> usize {
        match self {
            Pillar::Power => 0,
            Pillar::Passion => 1,
            Pillar::Purpose => 2,
            Pillar::Production => 3,
        }
    }
}

/// How a numeric key result moves toward its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KrDirection {
    /// Higher current value is better (build up to target).
    Increasing,
    /// Lower current value is better (count down from baseline to target).
    Decreasing,
}

/// Measurement kind of a key result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KrKind {
    /// Done / not done.
    Boolean,
    /// Current value is already a percentage.
    Percent,
    /// Current value measured against target (and baseline when decreasing).
    Numeric,
}

/// A single key result under an objective.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyResult {
    pub id: String,
    pub description: String,
    pub current_value: f64,
    pub target_value: f64,
    /// Starting value for decreasing (countdown) KRs.
    pub baseline_value: Option<f64>,
    pub direction: KrDirection,
    pub kind: KrKind,
    /// Explicit progress override. Values <= 1 are ratios, > 1 are percents.
    /// When present it wins over the kind-based computation.
    pub progress: Option<f64>,
    /// Deprioritized: excluded from selection and aggregates, not deleted.
    pub punted: bool,
}

impl KeyResult {
    /// Normalized progress percentage, recomputed from raw fields.
    pub fn progress_pct(&self) -> i64 {
        normalize_progress(self)
    }

    /// Whether this KR is done (at or past 100%).
    pub fn is_completed(&self) -> bool {
        self.progress_pct() >= 100
    }
}

/// A quarterly objective with its ordered key results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Objective {
    pub id: String,
    pub pillar: Pillar,
    pub objective: String,
    pub key_results: Vec<KeyResult>,
    pub quarter_start: NaiveDate,
    pub quarter_end: NaiveDate,
    /// Soft delete flag; archived objectives are kept but hidden.
    pub archived: bool,
}

impl Objective {
    /// Aggregate progress: mean of non-punted KR progress, 0 when empty.
    pub fn progress_pct(&self) -> i64 {
        let active: Vec<i64> = self
            .key_results
            .iter()
            .filter(|kr| !kr.punted)
            .map(|kr| kr.progress_pct())
            .collect();
        if active.is_empty() {
            return 0;
        }
        let sum: i64 = active.iter().sum();
        (sum as f64 / active.len() as f64).round() as i64
    }
}

/// Sort objectives in place by the canonical pillar order.
pub fn sort_by_pillar(objectives: &mut [Objective]) {
    objectives.sort_by_key(|o| o.pillar.sort_key());
}
