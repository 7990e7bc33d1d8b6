use chrono::{TimeZone, Utc};

use roster::history::RecentQueries;
use roster::test_utils::RosterFixture;

#[test]
fn history_round_trips_through_disk() {
    let fixture = RosterFixture::new();
    let mut history = RecentQueries::load(&fixture.history_path, 10).unwrap();
    assert!(history.is_empty());

    assert!(history.record("designer"));
    assert!(history.record("エンジニア"));
    history.save().unwrap();

    let reloaded = RecentQueries::load(&fixture.history_path, 10).unwrap();
    let queries: Vec<&str> = reloaded.entries().iter().map(|q| q.query.as_str()).collect();
    assert_eq!(queries, vec!["エンジニア", "designer"]);
}

#[test]
fn history_moves_repeats_to_front() {
    let fixture = RosterFixture::new();
    let mut history = RecentQueries::load(&fixture.history_path, 10).unwrap();
    let first = Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap();
    let later = Utc.with_ymd_and_hms(2026, 1, 5, 9, 5, 0).unwrap();

    history.record_at("Python", first);
    history.record_at("go", first);
    history.record_at("  python ", later);

    assert_eq!(history.entries().len(), 2);
    assert_eq!(history.entries()[0].query, "python");
    assert_eq!(history.entries()[0].searched_at, later);
}

#[test]
fn history_is_capped() {
    let fixture = RosterFixture::new();
    let mut history = RecentQueries::load(&fixture.history_path, 3).unwrap();
    for query in ["a1", "b2", "c3", "d4"] {
        history.record(query);
    }

    let queries: Vec<&str> = history.entries().iter().map(|q| q.query.as_str()).collect();
    assert_eq!(queries, vec!["d4", "c3", "b2"]);
}

#[test]
fn history_ignores_blank_queries() {
    let fixture = RosterFixture::new();
    let mut history = RecentQueries::load(&fixture.history_path, 3).unwrap();
    assert!(!history.record("  ,, "));
    assert!(history.is_empty());
}

#[test]
fn history_tolerates_corrupt_file() {
    let fixture = RosterFixture::new();
    std::fs::write(&fixture.history_path, "not json").unwrap();

    let mut history = RecentQueries::load(&fixture.history_path, 5).unwrap();
    assert!(history.is_empty());

    history.record("figma");
    history.save().unwrap();
    let reloaded = RecentQueries::load(&fixture.history_path, 5).unwrap();
    assert_eq!(reloaded.entries().len(), 1);
}

#[test]
fn history_clear_persists() {
    let fixture = RosterFixture::new();
    let mut history = RecentQueries::load(&fixture.history_path, 5).unwrap();
    history.record("figma");
    history.save().unwrap();

    history.clear();
    history.save().unwrap();

    let reloaded = RecentQueries::load(&fixture.history_path, 5).unwrap();
    assert!(reloaded.is_empty());
}
