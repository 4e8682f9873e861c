//! Weekly challenge types.
//!
//! A week has a fixed number of slots (indexed 0..N-1). Each slot is filled
//! by a protocol -- a named source of challenge content -- and carries the
//! generated action text plus a protocol-specific story payload. Challenges
//! are individually completable and individually re-rollable in place.

pub mod selector;

pub use selector::{ProtocolCandidate, SelectionStrategy, SlotSelector};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A named source of weekly-challenge content.
///
/// The declaration order is the fixed priority order used by the
/// guaranteed-diversity strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolKey {
    /// Habits that have gone cold or are below their usual rate.
    HabitsSlipping,
    /// Pillar priorities that need a push.
    PrioritiesProgress,
    /// Key results behind schedule.
    OkrsProgress,
    /// Generic fallback content when nothing else is eligible.
    Placeholder,
}

impl ProtocolKey {
    /// All protocols in fixed priority order.
    pub const PRIORITY_ORDER: [ProtocolKey; 4] = [
        ProtocolKey::HabitsSlipping,
        ProtocolKey::PrioritiesProgress,
        ProtocolKey::OkrsProgress,
        ProtocolKey::Placeholder,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProtocolKey::HabitsSlipping => "habits_slipping",
            ProtocolKey::PrioritiesProgress => "priorities_progress",
            ProtocolKey::OkrsProgress => "okrs_progress",
            ProtocolKey::Placeholder => "placeholder",
        }
    }

    pub fn parse(s: &str) -> Option<ProtocolKey> {
        match s {
            "habits_slipping" => Some(ProtocolKey::HabitsSlipping),
            "priorities_progress" => Some(ProtocolKey::PrioritiesProgress),
            "okrs_progress" => Some(ProtocolKey::OkrsProgress),
            "placeholder" => Some(ProtocolKey::Placeholder),
            _ => None,
        }
    }
}

/// One item in a protocol's content pool: a slipping habit, a pillar
/// priority, or a key result. The payload rides along into the generated
/// challenge's story.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// A single weekly challenge occupying one slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyChallenge {
    /// Fixed position in the weekly list, 0..slots-1.
    pub slot: usize,
    pub protocol: ProtocolKey,
    pub action: String,
    /// Protocol-specific payload describing what the action is about.
    pub story: serde_json::Value,
    pub completed: bool,
    /// Monday of the week this challenge belongs to.
    pub week_start: NaiveDate,
}

/// Generate the action text for a protocol/item pair.
pub(crate) fn action_text(protocol: ProtocolKey, item: &StoryItem) -> String {
    match protocol {
        ProtocolKey::HabitsSlipping => {
            format!("Get back on track: complete '{}' three times this week", item.title)
        }
        ProtocolKey::PrioritiesProgress => {
            format!("Move the needle on a priority: {}", item.title)
        }
        ProtocolKey::OkrsProgress => {
            format!("Advance a key result: {}", item.title)
        }
        ProtocolKey::Placeholder => item.title.clone(),
    }
}

/// Fallback content used when the placeholder protocol is selected.
pub fn placeholder_pool() -> Vec<StoryItem> {
    const PROMPTS: [&str; 4] = [
        "Take a 30-minute walk without your phone",
        "Write down three things that went well this week",
        "Clear one nagging item off your backlog",
        "Reach out to someone you haven't spoken to in a month",
    ];
    PROMPTS
        .iter()
        .enumerate()
        .map(|(i, p)| StoryItem {
            id: format!("placeholder-{i}"),
            title: (*p).to_string(),
            payload: serde_json::Value::Null,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_key_round_trips_through_str() {
        for key in ProtocolKey::PRIORITY_ORDER {
            assert_eq!(ProtocolKey::parse(key.as_str()), Some(key));
        }
        assert_eq!(ProtocolKey::parse("bogus"), None);
    }

    #[test]
    fn priority_order_starts_with_habits() {
        assert_eq!(ProtocolKey::PRIORITY_ORDER[0], ProtocolKey::HabitsSlipping);
        assert_eq!(ProtocolKey::PRIORITY_ORDER[3], ProtocolKey::Placeholder);
    }
}
