//! Tests for the search cursor.

use super::*;
use crate::model::{LogIndex, SearchParams};
use crate::source::MemoryLog;
use crate::test_harness::message_at;
use chrono::NaiveDate;

/// Day 1 has "apple" at 0 and 2, day 2 has "apple apple" at 3.
fn fruit_log() -> MemoryLog {
    MemoryLog::from_entries([
        message_at("alice", 0, "apple"),
        message_at("bob", 1, "pear"),
        message_at("alice", 2, "green apple"),
        message_at("bob", 24 * 60, "apple apple"),
        message_at("alice", 24 * 60 + 1, "plum"),
    ])
}

fn query(phrase: &str, period: SearchPeriod) -> SearchQuery {
    SearchQuery::new(
        phrase,
        SearchParams {
            period,
            ..Default::default()
        },
    )
    .unwrap()
}

fn found_index(outcome: SearchOutcome) -> u64 {
    outcome.hit().expect("expected a hit").pos.index.get()
}

#[test]
fn from_end_walks_backwards() {
    let log = fruit_log();
    let mut cursor = SearchCursor::default();

    let first = cursor.start(&log, query("apple", SearchPeriod::FromEnd));
    assert_eq!(first.hit().unwrap().pos.matches, 2);
    assert_eq!(found_index(first), 3);

    assert_eq!(found_index(cursor.step(&log, SearchDirection::Up)), 3);
    assert_eq!(found_index(cursor.step(&log, SearchDirection::Up)), 2);
    assert_eq!(found_index(cursor.step(&log, SearchDirection::Up)), 0);
    assert_eq!(
        cursor.step(&log, SearchDirection::Up),
        SearchOutcome::NotFound(SearchDirection::Up)
    );
}

#[test]
fn from_beginning_walks_forwards() {
    let log = fruit_log();
    let mut cursor = SearchCursor::default();

    assert_eq!(found_index(cursor.start(&log, query("apple", SearchPeriod::FromBeginning))), 0);
    assert_eq!(found_index(cursor.step(&log, SearchDirection::Down)), 2);
}

#[test]
fn not_found_leaves_cursor_in_place() {
    let log = fruit_log();
    let mut cursor = SearchCursor::default();
    cursor.start(&log, query("pear", SearchPeriod::FromBeginning));
    let pos = cursor.pos();

    assert_eq!(
        cursor.step(&log, SearchDirection::Down),
        SearchOutcome::NotFound(SearchDirection::Down)
    );
    assert_eq!(cursor.pos(), pos);

    // Reversing from the same spot still works.
    assert_eq!(
        cursor.step(&log, SearchDirection::Up),
        SearchOutcome::NotFound(SearchDirection::Up)
    );
    assert_eq!(cursor.pos(), pos);
}

#[test]
fn next_then_previous_returns_to_the_same_occurrence() {
    let log = fruit_log();
    let mut cursor = SearchCursor::default();
    cursor.start(&log, query("apple", SearchPeriod::FromBeginning));
    let start = cursor.pos();

    cursor.step(&log, SearchDirection::Down);
    let back = cursor.step(&log, SearchDirection::Up).hit().unwrap();

    assert_eq!(back.pos, start);
}

#[test]
fn date_periods_anchor_at_first_entry_of_date() {
    let log = fruit_log();
    let day2 = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let mut cursor = SearchCursor::default();

    let after = cursor.start(&log, query("apple", SearchPeriod::AfterDate(day2)));
    assert_eq!(found_index(after), 3);

    let before = cursor.start(&log, query("apple", SearchPeriod::BeforeDate(day2)));
    assert_eq!(found_index(before), 2);
}

#[test]
fn date_past_the_log_anchors_at_the_end() {
    let log = fruit_log();
    let later = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();

    assert_eq!(
        SearchCursor::anchor(&log, SearchPeriod::AfterDate(later)),
        SearchPos::before(log.next_index())
    );
}

#[test]
fn step_without_query_is_inactive() {
    let log = fruit_log();
    let mut cursor = SearchCursor::default();
    assert_eq!(cursor.step(&log, SearchDirection::Down), SearchOutcome::Inactive);
}

#[test]
fn cancel_returns_highlight_and_deactivates() {
    let log = fruit_log();
    let mut cursor = SearchCursor::default();
    cursor.start(&log, query("apple", SearchPeriod::FromEnd));
    let key = crate::view_state::LineKey::entry(
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        LogIndex::new(3),
    );
    assert_eq!(cursor.set_highlighted(Some(key)), None);

    assert_eq!(cursor.cancel(), Some(key));
    assert!(!cursor.is_active());
    assert_eq!(cursor.highlighted(), None);
}

#[test]
fn empty_log_finds_nothing() {
    let log = MemoryLog::new();
    let mut cursor = SearchCursor::default();
    assert_eq!(
        cursor.start(&log, query("apple", SearchPeriod::FromEnd)),
        SearchOutcome::NotFound(SearchDirection::Up)
    );
}
