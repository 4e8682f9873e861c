//! Integration tests for weekly challenge generation.
//!
//! Covers the full path: habits and OKRs in the store, protocol
//! configuration, weekly regeneration, slot completion, and single-slot
//! reroll.

use cadence_core::challenge::ProtocolKey;
use cadence_core::okr::{KrDirection, KrKind, Pillar};
use cadence_core::storage::{week_of, Config, Database};
use cadence_core::DatabaseError;
use chrono::NaiveDate;

fn d(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, month, day).unwrap()
}

/// A store with one cold habit, one active objective, and one open KR,
/// plus a config that enables them all.
fn seeded_store() -> (Database, Config, NaiveDate) {
    let db = Database::open_memory().unwrap();
    let today = d(8, 28);

    let habit = db.add_habit("Meditate", None).unwrap();
    db.set_entry(&habit.id, d(8, 20), true).unwrap();

    let objective = db
        .create_objective(Pillar::Power, "Get stronger", d(7, 1), d(9, 30))
        .unwrap();
    let kr = db
        .add_key_result(
            &objective.id,
            "Squat 100kg",
            KrKind::Numeric,
            KrDirection::Increasing,
            100.0,
            None,
        )
        .unwrap();
    db.update_kr_current(&kr.id, 60.0).unwrap();

    let mut config = Config::default();
    config.protocols.habits_slipping.enabled_habits = vec![habit.id];
    config.protocols.okrs_progress.enabled_krs = vec![kr.id];

    (db, config, today)
}

#[test]
fn test_regenerated_week_covers_protocols_in_priority_order() {
    let (db, config, today) = seeded_store();
    let week_start = week_of(today);

    let week = db.regenerate_week(&config, week_start, today, Some(1)).unwrap();
    let protocols: Vec<ProtocolKey> = week.iter().map(|c| c.protocol).collect();
    assert_eq!(
        protocols,
        vec![
            ProtocolKey::HabitsSlipping,
            ProtocolKey::PrioritiesProgress,
            ProtocolKey::OkrsProgress,
        ]
    );

    // fetch returns the same assignment in slot order
    let fetched = db.fetch_week(week_start).unwrap();
    assert_eq!(fetched.len(), 3);
    for (slot, challenge) in fetched.iter().enumerate() {
        assert_eq!(challenge.slot, slot);
        assert!(!challenge.completed);
    }
}

#[test]
fn test_punted_and_completed_krs_are_never_selected() {
    let (db, mut config, today) = seeded_store();
    let objective_id = db.list_objectives(None, false).unwrap()[0].id.clone();

    let punted = db
        .add_key_result(
            &objective_id,
            "Punted KR",
            KrKind::Percent,
            KrDirection::Increasing,
            0.0,
            None,
        )
        .unwrap();
    db.punt_kr(&punted.id, true).unwrap();

    let done = db
        .add_key_result(
            &objective_id,
            "Finished KR",
            KrKind::Boolean,
            KrDirection::Increasing,
            0.0,
            None,
        )
        .unwrap();
    db.update_kr_current(&done.id, 1.0).unwrap();

    // put them in the enabled set anyway; exclusion must still hold
    config
        .protocols
        .okrs_progress
        .enabled_krs
        .extend([punted.id.clone(), done.id.clone()]);
    config.protocols.okrs_progress.max_per_week = 5;
    config.protocols.habits_slipping.enabled = false;
    config.protocols.priorities_progress.enabled = false;
    config.protocols.placeholder.enabled = false;

    let week = db
        .regenerate_week(&config, week_of(today), today, Some(7))
        .unwrap();
    assert_eq!(week.len(), 1, "only the open KR is eligible");
    assert_eq!(week[0].protocol, ProtocolKey::OkrsProgress);
    let item_id = week[0].story["item_id"].as_str().unwrap();
    assert_ne!(item_id, punted.id);
    assert_ne!(item_id, done.id);
}

#[test]
fn test_zero_cap_skips_to_next_protocol() {
    let (db, mut config, today) = seeded_store();
    config.protocols.habits_slipping.max_per_week = 0;

    let week = db
        .regenerate_week(&config, week_of(today), today, Some(3))
        .unwrap();
    assert_eq!(week[0].protocol, ProtocolKey::PrioritiesProgress);
}

#[test]
fn test_slot_completion_persists() {
    let (db, config, today) = seeded_store();
    let week_start = week_of(today);
    db.regenerate_week(&config, week_start, today, Some(1)).unwrap();

    db.set_challenge_completed(week_start, 1, true).unwrap();
    let week = db.fetch_week(week_start).unwrap();
    assert!(!week[0].completed);
    assert!(week[1].completed);
}

#[test]
fn test_reroll_changes_content_but_not_slot_or_protocol() {
    let (db, mut config, today) = seeded_store();
    // give the habit protocol more than one cold habit so a reroll has
    // something fresh to draw
    let second = db.add_habit("Journal", None).unwrap();
    let third = db.add_habit("Stretch", None).unwrap();
    config
        .protocols
        .habits_slipping
        .enabled_habits
        .extend([second.id, third.id]);

    let week_start = week_of(today);
    let week = db.regenerate_week(&config, week_start, today, Some(2)).unwrap();
    let original = week[0].clone();
    assert_eq!(original.protocol, ProtocolKey::HabitsSlipping);

    let rerolled = db
        .reroll_slot(&config, week_start, 0, today, Some(11))
        .unwrap();
    assert_eq!(rerolled.slot, original.slot);
    assert_eq!(rerolled.protocol, original.protocol);
    assert_ne!(rerolled.story["item_id"], original.story["item_id"]);

    // other slots untouched
    let fetched = db.fetch_week(week_start).unwrap();
    assert_eq!(fetched.len(), week.len());
    assert_eq!(fetched[1].action, week[1].action);
}

#[test]
fn test_reroll_keeps_completion_state() {
    let (db, mut config, today) = seeded_store();
    let second = db.add_habit("Journal", None).unwrap();
    config
        .protocols
        .habits_slipping
        .enabled_habits
        .push(second.id);

    let week_start = week_of(today);
    db.regenerate_week(&config, week_start, today, Some(2)).unwrap();
    db.set_challenge_completed(week_start, 0, true).unwrap();

    let rerolled = db
        .reroll_slot(&config, week_start, 0, today, Some(11))
        .unwrap();
    assert!(rerolled.completed, "a completed slot stays completed across a reroll");
    assert!(db.fetch_week(week_start).unwrap()[0].completed);
}

#[test]
fn test_fetch_rejects_malformed_protocol_row() {
    let (db, config, today) = seeded_store();
    let week_start = week_of(today);
    db.regenerate_week(&config, week_start, today, Some(1)).unwrap();

    db.conn()
        .execute(
            "UPDATE weekly_challenges SET protocol = 'mystery_protocol' WHERE slot = 0",
            [],
        )
        .unwrap();

    let err = db.fetch_week(week_start).unwrap_err();
    assert!(matches!(err, DatabaseError::MalformedRow { .. }));
}

#[test]
fn test_regeneration_replaces_previous_week() {
    let (db, config, today) = seeded_store();
    let week_start = week_of(today);

    db.regenerate_week(&config, week_start, today, Some(1)).unwrap();
    db.set_challenge_completed(week_start, 0, true).unwrap();

    let week = db.regenerate_week(&config, week_start, today, Some(1)).unwrap();
    assert!(week.iter().all(|c| !c.completed), "completion is reset");
    assert_eq!(db.fetch_week(week_start).unwrap().len(), week.len());
}
