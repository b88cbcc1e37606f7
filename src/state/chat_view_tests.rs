//! Tests for the ChatView facade.

use super::*;
use crate::model::{ChatMessage, FileStatus, SearchFilter, SearchPeriod};
use crate::source::MemoryLog;
use crate::test_harness::{message_at, numbered_log, pending_at, settled_view, transfer_at};

fn indices<M: LineMeasurer>(view: &ChatView<MemoryLog, M>) -> Vec<u64> {
    view.window().store().indices().map(|i| i.get()).collect()
}

fn first_visible(view: &ChatView<MemoryLog>) -> Option<u64> {
    view.window().first_visible_index().map(|i| i.get())
}

fn whole_word(period: SearchPeriod) -> SearchParams {
    SearchParams {
        period,
        filter: SearchFilter {
            whole_words: true,
            ..Default::default()
        },
    }
}

/// Rows: separator at 0, entry `i` at row `2 + 2 * i`; content starts at x 13.
fn small_view() -> ChatView<MemoryLog> {
    let mut view = ChatView::new(numbered_log(5), ChatViewOptions::default());
    view.run_until_settled();
    view.drain_events();
    view
}

// ===== Opening =====

#[test]
fn opening_loads_the_newest_entries_pinned_to_bottom() {
    let view = settled_view(1000);

    assert_eq!(indices(&view), (900..1000).collect::<Vec<_>>());
    assert!(view.window().viewport().is_at_bottom());
    assert!(view.window().store().iter().all(|line| !line.dirty));
}

#[test]
fn opening_emits_window_and_settle_events() {
    let mut view = ChatView::new(numbered_log(10), ChatViewOptions::default());
    view.run_until_settled();
    let events = view.drain_events();

    assert_eq!(
        events[0],
        ViewEvent::WindowChanged {
            first: LogIndex::new(0),
            last: LogIndex::new(9),
        }
    );
    assert!(events.contains(&ViewEvent::RenderSettled));
}

#[test]
fn empty_log_view_is_inert() {
    let mut view = ChatView::new(MemoryLog::new(), ChatViewOptions::default());

    assert_eq!(view.run_until_settled(), 0);
    view.jump_to_index(LogIndex::new(5));
    view.scroll_to(LineOffset::new(0));
    view.select_all();
    assert_eq!(view.selected_text(), "");
    assert_eq!(
        view.start_search("x", SearchParams::default()),
        Ok(SearchOutcome::NotFound(SearchDirection::Up))
    );
    assert!(view.window().store().is_empty());
    assert_eq!(view.pending_continuations(), 0);
}

// ===== Jumps =====

#[test]
fn jump_outside_window_moves_it_and_scrolls_after_settle() {
    let mut view = settled_view(1000);

    view.jump_to_index(LogIndex::new(10));
    assert_eq!(view.pending_continuations(), 1);
    view.run_until_settled();

    assert_eq!(indices(&view), (10..310).collect::<Vec<_>>());
    assert_eq!(first_visible(&view), Some(10));
    assert_eq!(view.pending_continuations(), 0);
}

#[test]
fn later_jump_wins_when_both_settle_together() {
    let mut view = settled_view(1000);

    view.jump_to_index(LogIndex::new(10));
    view.jump_to_index(LogIndex::new(200));
    assert_eq!(view.pending_continuations(), 2);
    view.run_until_settled();

    assert_eq!(indices(&view), (10..310).collect::<Vec<_>>());
    assert_eq!(first_visible(&view), Some(200));
}

#[test]
fn jump_whose_target_was_evicted_before_settle_does_nothing() {
    let mut view = settled_view(1000);

    view.jump_to_index(LogIndex::new(10));
    view.set_window_start(LogIndex::new(600));
    view.run_until_settled();

    assert_eq!(indices(&view), (600..900).collect::<Vec<_>>());
    assert!(!view.window().store().contains_index(LogIndex::new(10)));
    assert_eq!(view.pending_continuations(), 0);
    let top = first_visible(&view).unwrap();
    assert!((600..900).contains(&top), "first visible {top}");
}

#[test]
fn jump_to_materialized_index_scrolls_immediately() {
    let mut view = settled_view(1000);
    view.jump_to_index(LogIndex::new(950));

    assert_eq!(view.pending_continuations(), 0);
    assert_eq!(first_visible(&view), Some(950));
}

#[test]
fn jump_to_next_index_means_last_entry() {
    let mut view = settled_view(1000);
    view.jump_to_index(LogIndex::new(200));
    view.run_until_settled();

    view.jump_to_index(LogIndex::new(1000));
    view.run_until_settled();

    assert_eq!(view.window().store().last_index(), Some(LogIndex::new(999)));
    assert!(view.window().viewport().is_at_bottom());
}

#[test]
fn jump_to_date_uses_first_entry_of_that_day() {
    let mut log = MemoryLog::new();
    for day in 0..5 {
        for i in 0..100 {
            log.append(message_at("alice", day * 24 * 60 + i, "hi"));
        }
    }
    let mut view = ChatView::new(log, ChatViewOptions::default());
    view.run_until_settled();

    view.jump_to_date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    view.run_until_settled();

    assert_eq!(first_visible(&view), Some(100));
}

// ===== Scroll-edge loading =====

#[test]
fn scrolling_to_top_loads_an_older_chunk() {
    let mut view = settled_view(1000);

    view.scroll_to(LineOffset::new(0));
    view.run_until_settled();

    assert_eq!(indices(&view), (800..1000).collect::<Vec<_>>());
    assert_eq!(first_visible(&view), Some(900));
    assert!(view.drain_events().contains(&ViewEvent::WindowChanged {
        first: LogIndex::new(800),
        last: LogIndex::new(999),
    }));
}

#[test]
fn scrolling_to_bottom_loads_a_newer_chunk() {
    let mut view = settled_view(1000);
    view.set_window_start(LogIndex::new(0));
    view.run_until_settled();

    view.scroll_to(LineOffset::new(usize::MAX));
    view.run_until_settled();

    assert_eq!(indices(&view), (100..400).collect::<Vec<_>>());
    assert_eq!(first_visible(&view), Some(299));
}

#[test]
fn bottom_load_near_the_tail_fills_a_whole_window() {
    let mut view = settled_view(1000);
    view.set_window_start(LogIndex::new(650));
    view.run_until_settled();
    assert_eq!(indices(&view), (650..950).collect::<Vec<_>>());

    view.scroll_to(LineOffset::new(usize::MAX));
    view.run_until_settled();

    assert_eq!(indices(&view), (700..1000).collect::<Vec<_>>());
    assert_eq!(first_visible(&view), Some(949));
}

#[test]
fn no_loading_at_the_ends_of_the_log() {
    let mut view = settled_view(50);
    view.scroll_to(LineOffset::new(0));
    view.scroll_to(LineOffset::new(usize::MAX));

    assert!(!view.window().is_relayouting());
    assert_eq!(indices(&view), (0..50).collect::<Vec<_>>());
}

#[test]
fn scrolling_reports_first_visible_line() {
    let mut view = settled_view(1000);
    view.scroll_by(-4);

    let events = view.drain_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, ViewEvent::FirstVisibleLineChanged { .. })));
}

// ===== Appends and updates =====

#[test]
fn pinned_append_stays_at_bottom() {
    let mut view = settled_view(1000);
    let index = view.append(message_at("bob", 1000, "fresh"));
    view.run_until_settled();

    assert_eq!(view.window().store().last_index(), Some(index));
    assert!(view.window().viewport().is_at_bottom());
}

#[test]
fn delivery_confirmation_updates_in_place() {
    let mut view = ChatView::new(
        MemoryLog::from_entries([pending_at("alice", 0, "hi")]),
        ChatViewOptions::default(),
    );
    view.run_until_settled();

    let delivered = EntryContent::Message(ChatMessage::delivered("hi"));
    assert!(view.update_content(LogIndex::new(0), delivered));
    view.run_until_settled();

    view.select_all();
    assert_eq!(view.selected_text(), "[00:00] alice: hi");
}

#[test]
fn clear_keeps_active_transfers_and_drops_selection() {
    let mut view = ChatView::new(
        MemoryLog::from_entries([
            message_at("alice", 0, "a"),
            transfer_at("bob", 1, FileStatus::Initializing),
            message_at("alice", 2, "b"),
        ]),
        ChatViewOptions::default(),
    );
    view.run_until_settled();
    view.select_all();
    view.drain_events();

    view.clear();
    view.run_until_settled();

    assert_eq!(indices(&view), vec![1]);
    assert!(view.selection().is_empty());
    assert!(view.drain_events().contains(&ViewEvent::SelectionChanged));
}

// ===== Selection =====

#[test]
fn selection_is_cleared_when_its_lines_are_evicted() {
    let mut view = settled_view(1000);
    view.select_all();
    view.drain_events();

    view.jump_to_index(LogIndex::new(0));
    view.run_until_settled();

    assert!(view.selection().is_empty());
    assert!(view.drain_events().contains(&ViewEvent::SelectionChanged));
}

#[test]
fn drag_selects_characters_then_lines() {
    let mut view = small_view();

    view.press(PointerPos::new(13, 2));
    view.drag(PointerPos::new(17, 2));
    assert_eq!(view.selected_text(), "mess");

    view.drag(PointerPos::new(13, 6));
    view.release(PointerPos::new(13, 6));
    assert_eq!(
        view.selected_text(),
        "[00:00] alice: message 0\n[00:01] bob: message 1\n[00:02] alice: message 2"
    );
}

#[test]
fn small_movement_is_not_a_drag() {
    let mut view = small_view();
    view.press(PointerPos::new(13, 2));
    view.drag(PointerPos::new(14, 2));
    view.release(PointerPos::new(14, 2));

    assert!(view.selection().is_empty());
    assert!(view.drain_events().is_empty());
}

#[test]
fn press_clears_previous_selection() {
    let mut view = small_view();
    view.select_all();
    view.press(PointerPos::new(13, 2));
    assert!(view.selection().is_empty());
}

#[test]
fn double_and_triple_click() {
    let mut view = small_view();

    view.double_click(PointerPos::new(14, 4));
    assert_eq!(view.selected_text(), "message");

    view.triple_click(PointerPos::new(14, 4));
    assert_eq!(view.selected_text(), "message 1");
}

#[test]
fn dragging_above_the_viewport_autoscrolls() {
    let mut view = settled_view(1000);
    let before = view.window().viewport().offset().get();

    view.press(PointerPos::new(13, 10));
    view.drag(PointerPos::new(13, -5));
    view.tick();
    view.tick();

    assert_eq!(view.window().viewport().offset().get(), before - 6);
    assert!(!view.selection().is_empty());

    view.release(PointerPos::new(13, -5));
    view.tick();
    assert_eq!(view.window().viewport().offset().get(), before - 6);
}

// ===== Search =====

#[test]
fn search_hit_in_window_is_highlighted_immediately() {
    let mut view = settled_view(1000);
    view.start_search("message 950", whole_word(SearchPeriod::FromEnd))
        .unwrap();

    let line = view.window().store().get(LogIndex::new(950)).unwrap();
    assert!(line.column(crate::view_state::ColumnRole::Content).highlight.is_some());
    assert_eq!(first_visible(&view), Some(950));
    assert_eq!(view.pending_continuations(), 0);
}

#[test]
fn search_hit_outside_window_is_revealed_after_settle() {
    let mut view = settled_view(1000);
    let outcome = view
        .start_search("message 42", whole_word(SearchPeriod::FromEnd))
        .unwrap();

    assert_eq!(outcome.hit().map(|h| h.pos.index), Some(LogIndex::new(42)));
    assert_eq!(view.pending_continuations(), 1);
    view.run_until_settled();

    assert_eq!(
        view.search().highlighted(),
        view.window().store().key_of(LogIndex::new(42))
    );
    assert_eq!(first_visible(&view), Some(42));
}

#[test]
fn search_started_during_an_edge_load_reveals_its_match() {
    let mut view = settled_view(1000);
    view.scroll_to(LineOffset::new(0));
    assert_eq!(view.pending_continuations(), 1);

    view.start_search("message 850", whole_word(SearchPeriod::FromEnd))
        .unwrap();
    assert_eq!(view.pending_continuations(), 2);
    view.run_until_settled();

    assert_eq!(
        view.search().highlighted(),
        view.window().store().key_of(LogIndex::new(850))
    );
    assert_eq!(first_visible(&view), Some(850));
}

#[test]
fn exhausted_search_reports_direction_and_keeps_position() {
    let mut view = settled_view(1000);
    view.start_search("message 42", whole_word(SearchPeriod::FromEnd))
        .unwrap();
    view.run_until_settled();
    view.drain_events();
    let pos = view.search().pos();

    assert_eq!(view.search_next(), SearchOutcome::NotFound(SearchDirection::Up));
    assert_eq!(
        view.search_previous(),
        SearchOutcome::NotFound(SearchDirection::Down)
    );

    assert_eq!(view.search().pos(), pos);
    assert_eq!(
        view.drain_events(),
        vec![
            ViewEvent::SearchNotFound(SearchDirection::Up),
            ViewEvent::SearchNotFound(SearchDirection::Down),
        ]
    );
}

#[test]
fn next_then_previous_revisits_the_same_match() {
    let mut view = settled_view(1000);
    let first = view
        .start_search("message 99", SearchParams::default())
        .unwrap()
        .hit()
        .unwrap();
    view.run_until_settled();

    view.search_next();
    view.run_until_settled();
    let back = view.search_previous().hit().unwrap();

    assert_eq!(back.pos, first.pos);
}

#[test]
fn new_match_moves_the_highlight() {
    let mut view = settled_view(1000);
    view.start_search("message 99", SearchParams::default())
        .unwrap();
    let first = view.search().highlighted().unwrap();
    view.search_next();
    let second = view.search().highlighted().unwrap();

    assert_ne!(first, second);
    let old = view.window().store().get_by_key(first).unwrap();
    assert!(old
        .column(crate::view_state::ColumnRole::Content)
        .highlight
        .is_none());
}

#[test]
fn cancelled_search_drops_its_pending_reveal() {
    let mut view = settled_view(1000);
    view.start_search("message 42", whole_word(SearchPeriod::FromEnd))
        .unwrap();
    view.cancel_search();
    view.run_until_settled();

    assert_eq!(view.search().highlighted(), None);
    let line = view.window().store().get(LogIndex::new(42)).unwrap();
    assert!(line
        .column(crate::view_state::ColumnRole::Content)
        .highlight
        .is_none());
}

#[test]
fn invalid_search_is_an_error() {
    let mut view = settled_view(10);
    assert_eq!(
        view.start_search("   ", SearchParams::default()),
        Err(SearchError::EmptyPhrase)
    );
    assert!(!view.search().is_active());
}
