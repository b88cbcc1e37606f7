//! Shared fixtures for integration tests.
//!
//! Everything here goes through the public API only.

#![allow(dead_code)]

use chatlog_view::model::{ChatMessage, EntryContent, LogEntry, SenderId};
use chatlog_view::source::MemoryLog;
use chatlog_view::state::{ChatView, ChatViewOptions};
use chatlog_view::view_state::LineMeasurer;
use chrono::{DateTime, Duration, TimeZone, Utc};

/// Midnight of the first fixture day.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// Delivered message of `sender` at `minutes` after [`base_time`].
pub fn message_at(sender: &str, minutes: i64, text: &str) -> LogEntry {
    LogEntry::new(
        SenderId::new(sender).unwrap(),
        sender,
        base_time() + Duration::minutes(minutes),
        EntryContent::Message(ChatMessage::delivered(text)),
    )
}

/// `n` messages one minute apart, alternating senders, text `message {i}`.
pub fn numbered_log(n: u64) -> MemoryLog {
    MemoryLog::from_entries((0..n).map(|i| {
        let sender = if i % 2 == 0 { "alice" } else { "bob" };
        message_at(sender, i as i64, &format!("message {i}"))
    }))
}

/// Settled view over a numbered log, events drained.
pub fn settled_view(n: u64) -> ChatView<MemoryLog> {
    settled_view_with(numbered_log(n), ChatViewOptions::default())
}

/// Settled view over `log`, events drained.
pub fn settled_view_with(log: MemoryLog, options: ChatViewOptions) -> ChatView<MemoryLog> {
    let mut view = ChatView::new(log, options);
    view.run_until_settled();
    view.drain_events();
    view
}

/// Materialized indices as raw numbers.
pub fn indices<M: LineMeasurer>(view: &ChatView<MemoryLog, M>) -> Vec<u64> {
    view.window().store().indices().map(|i| i.get()).collect()
}

/// Topmost visible entry as a raw number.
pub fn first_visible<M: LineMeasurer>(view: &ChatView<MemoryLog, M>) -> Option<u64> {
    view.window().first_visible_index().map(|i| i.get())
}
