//! Weekly challenge slot selection.
//!
//! Fills N weekly slots from the enabled protocols under one of two
//! strategies:
//!
//! - **GuaranteedDiversity**: protocols are visited in fixed priority order
//!   (habits-slipping, priorities-progress, OKRs-progress, placeholder),
//!   each taking up to its per-week cap while its pool lasts. Guarantees
//!   category variety subject to caps.
//! - **SlotBySlot**: each slot independently picks uniformly at random among
//!   the protocols still eligible for that slot. May under-represent
//!   categories.
//!
//! A pool item is consumed once picked, so one week never doubles up on the
//! same habit or key result within a protocol.

use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

use super::{action_text, ProtocolKey, StoryItem, WeeklyChallenge};
use chrono::NaiveDate;

/// Slot-filling strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    GuaranteedDiversity,
    SlotBySlot,
}

impl Default for SelectionStrategy {
    fn default() -> Self {
        SelectionStrategy::GuaranteedDiversity
    }
}

/// A protocol offered to the selector for one week.
///
/// `pool` holds the per-protocol content items still available (e.g.
/// slipping habits, non-completed non-punted KRs). Callers filter the pool
/// before handing it over; the selector only consumes it.
#[derive(Debug, Clone)]
pub struct ProtocolCandidate {
    pub key: ProtocolKey,
    pub enabled: bool,
    pub max_per_week: u32,
    pub pool: Vec<StoryItem>,
}

impl ProtocolCandidate {
    fn eligible(&self, taken: u32) -> bool {
        self.enabled && taken < self.max_per_week && !self.pool.is_empty()
    }
}

/// Fills weekly challenge slots from protocol candidates.
#[derive(Debug, Clone)]
pub struct SlotSelector {
    /// Total weekly slots to fill.
    pub slots: usize,
    pub strategy: SelectionStrategy,
    /// Random seed for reproducibility (None = random).
    pub seed: Option<u64>,
}

impl SlotSelector {
    pub fn new(slots: usize, strategy: SelectionStrategy) -> Self {
        Self {
            slots,
            strategy,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Generate a full week of challenges.
    ///
    /// Returns at most `slots` challenges in slot order; fewer when the
    /// eligible pools run dry. Candidates may arrive in any order -- the
    /// guaranteed-diversity strategy always walks them in priority order.
    pub fn generate_week(
        &self,
        week_start: NaiveDate,
        candidates: Vec<ProtocolCandidate>,
    ) -> Vec<WeeklyChallenge> {
        let mut rng = match self.seed {
            Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
            None => Mcg128Xsl64::from_entropy(),
        };
        let assignments = match self.strategy {
            SelectionStrategy::GuaranteedDiversity => self.assign_diverse(candidates, &mut rng),
            SelectionStrategy::SlotBySlot => self.assign_slot_by_slot(candidates, &mut rng),
        };

        assignments
            .into_iter()
            .enumerate()
            .map(|(slot, (protocol, item))| WeeklyChallenge {
                slot,
                protocol,
                action: action_text(protocol, &item),
                story: challenge_story(protocol, &item),
                completed: false,
                week_start,
            })
            .collect()
    }

    /// Regenerate content for one existing challenge.
    ///
    /// Slot index, protocol key, and completion state are fixed; only the
    /// story payload and action text change. Returns None when the pool has
    /// nothing to offer.
    pub fn reroll(
        &self,
        challenge: &WeeklyChallenge,
        mut pool: Vec<StoryItem>,
    ) -> Option<WeeklyChallenge> {
        if pool.is_empty() {
            return None;
        }
        let mut rng = match self.seed {
            Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
            None => Mcg128Xsl64::from_entropy(),
        };
        let item = pool.swap_remove(rng.gen_range(0..pool.len()));
        Some(WeeklyChallenge {
            slot: challenge.slot,
            protocol: challenge.protocol,
            action: action_text(challenge.protocol, &item),
            story: challenge_story(challenge.protocol, &item),
            completed: challenge.completed,
            week_start: challenge.week_start,
        })
    }

    fn assign_diverse(
        &self,
        mut candidates: Vec<ProtocolCandidate>,
        rng: &mut Mcg128Xsl64,
    ) -> Vec<(ProtocolKey, StoryItem)> {
        let mut out = Vec::with_capacity(self.slots);
        for key in ProtocolKey::PRIORITY_ORDER {
            let Some(candidate) = candidates.iter_mut().find(|c| c.key == key) else {
                continue;
            };
            let mut taken = 0u32;
            while out.len() < self.slots && candidate.eligible(taken) {
                let item = draw(&mut candidate.pool, rng);
                out.push((key, item));
                taken += 1;
            }
            if out.len() == self.slots {
                break;
            }
        }
        out
    }

    fn assign_slot_by_slot(
        &self,
        mut candidates: Vec<ProtocolCandidate>,
        rng: &mut Mcg128Xsl64,
    ) -> Vec<(ProtocolKey, StoryItem)> {
        let mut taken = vec![0u32; candidates.len()];
        let mut out = Vec::with_capacity(self.slots);
        for _ in 0..self.slots {
            let eligible: Vec<usize> = candidates
                .iter()
                .enumerate()
                .filter(|(i, c)| c.eligible(taken[*i]))
                .map(|(i, _)| i)
                .collect();
            if eligible.is_empty() {
                break;
            }
            let idx = eligible[rng.gen_range(0..eligible.len())];
            let item = draw(&mut candidates[idx].pool, rng);
            out.push((candidates[idx].key, item));
            taken[idx] += 1;
        }
        out
    }
}

fn draw(pool: &mut Vec<StoryItem>, rng: &mut Mcg128Xsl64) -> StoryItem {
    pool.swap_remove(rng.gen_range(0..pool.len()))
}

fn challenge_story(protocol: ProtocolKey, item: &StoryItem) -> serde_json::Value {
    serde_json::json!({
        "protocol": protocol.as_str(),
        "item_id": item.id,
        "title": item.title,
        "detail": item.payload,
    })
}
