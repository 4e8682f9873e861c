//! Integration tests for the daily-intentions flow.

use cadence_core::storage::Database;
use chrono::NaiveDate;

fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, day).unwrap()
}

#[test]
fn test_commit_and_complete() {
    let db = Database::open_memory().unwrap();
    let committed = db
        .commit_intentions(d(28), &["write report".into(), "call dentist".into()])
        .unwrap();
    assert_eq!(committed.len(), 2);

    db.set_intention_completed(&committed[0].id, true).unwrap();

    let today = db.intentions_for(d(28)).unwrap();
    assert_eq!(today.len(), 2);
    assert!(today.iter().any(|i| i.completed));
    assert!(today.iter().any(|i| !i.completed));
}

#[test]
fn test_recommit_replaces_the_day() {
    let db = Database::open_memory().unwrap();
    db.commit_intentions(d(28), &["old plan".into()]).unwrap();
    db.commit_intentions(d(28), &["new plan".into(), "second".into()])
        .unwrap();

    let today = db.intentions_for(d(28)).unwrap();
    assert_eq!(today.len(), 2);
    assert!(today.iter().all(|i| i.text != "old plan"));
}

#[test]
fn test_days_are_independent() {
    let db = Database::open_memory().unwrap();
    db.commit_intentions(d(27), &["yesterday".into()]).unwrap();
    db.commit_intentions(d(28), &["today".into()]).unwrap();

    assert_eq!(db.intentions_for(d(27)).unwrap().len(), 1);
    assert_eq!(db.intentions_for(d(28)).unwrap().len(), 1);
}
