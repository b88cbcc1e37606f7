//! Test fixtures shared by the unit tests.
//!
//! Builds small in-memory logs and settles views so individual tests can
//! focus on one behaviour.

use crate::model::{
    ChatMessage, EntryContent, FileDirection, FileStatus, FileTransfer, LogEntry, SenderId,
    SystemMessage, SystemMessageKind,
};
use crate::source::MemoryLog;
use crate::state::{ChatView, WindowController};
use crate::view_state::LineMeasurer;
use chrono::{DateTime, Duration, TimeZone, Utc};

/// Midnight of the first fixture day.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// Entry of `sender` at `minutes` after [`base_time`].
pub fn entry_at(sender: &str, minutes: i64, content: EntryContent) -> LogEntry {
    LogEntry::new(
        SenderId::new(sender).unwrap(),
        sender,
        base_time() + Duration::minutes(minutes),
        content,
    )
}

/// Delivered message.
pub fn message_at(sender: &str, minutes: i64, text: &str) -> LogEntry {
    entry_at(sender, minutes, EntryContent::Message(ChatMessage::delivered(text)))
}

/// Message still awaiting delivery.
pub fn pending_at(sender: &str, minutes: i64, text: &str) -> LogEntry {
    entry_at(sender, minutes, EntryContent::Message(ChatMessage::pending(text)))
}

/// File transfer in `status`.
pub fn transfer_at(sender: &str, minutes: i64, status: FileStatus) -> LogEntry {
    entry_at(
        sender,
        minutes,
        EntryContent::FileTransfer(FileTransfer {
            file_name: "photo.png".into(),
            file_size: 100,
            bytes_sent: 10,
            status,
            direction: FileDirection::Receiving,
        }),
    )
}

/// System notice.
pub fn notice_at(minutes: i64, text: &str) -> LogEntry {
    entry_at(
        "system",
        minutes,
        EntryContent::System(SystemMessage {
            kind: SystemMessageKind::PeerStateChange,
            text: text.into(),
        }),
    )
}

/// `n` messages one minute apart, alternating senders, text `message {i}`.
pub fn numbered_log(n: u64) -> MemoryLog {
    MemoryLog::from_entries((0..n).map(|i| {
        let sender = if i % 2 == 0 { "alice" } else { "bob" };
        message_at(sender, i as i64, &format!("message {i}"))
    }))
}

/// Run relayout to completion.
pub fn settle<M: LineMeasurer>(window: &mut WindowController<M>) {
    while window.is_relayouting() {
        window.tick();
    }
}

/// Materialized indices of a view, as raw numbers.
pub fn indices<M: LineMeasurer>(window: &WindowController<M>) -> Vec<u64> {
    window.store().indices().map(|i| i.get()).collect()
}

/// Settled view over a numbered log with default options.
pub fn settled_view(n: u64) -> ChatView<MemoryLog> {
    let mut view = ChatView::new(numbered_log(n), Default::default());
    view.run_until_settled();
    view.drain_events();
    view
}
