//! Entry rendering: log entry → `RenderedLine`, and in-place updates.
//!
//! This is the single place that decides what each column shows, so the
//! initial render and later delivery/progress updates never disagree.
//!
//! # Columns
//!
//! | Entry | Author | Content | Timestamp |
//! |---|---|---|---|
//! | message | display name | text | delivery time, empty while pending |
//! | action | `* name` | text | delivery time |
//! | file transfer | display name | `name percent (status)` widget | time |
//! | system notice | empty | notice text | time |

use super::rendered_line::{ColumnRole, ContentColumn, LineKey, LineKind, MessageKind, RenderedLine};
use crate::model::{
    ChatMessage, EntryContent, FileDirection, FileTransfer, LogEntry, LogIndex, MessageState,
    SenderId,
};
use chrono::TimeDelta;
use tracing::debug;

/// Default delivery-time format (chrono syntax).
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%H:%M";

/// Options shared by every render call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Format of the timestamp column.
    pub timestamp_format: String,
    /// Consecutive entries of one sender closer than this share one author label.
    pub repeat_name_after: TimeDelta,
    /// Local user, for `is_self`.
    pub local_sender: Option<SenderId>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            repeat_name_after: TimeDelta::seconds(300),
            local_sender: None,
        }
    }
}

/// Whether `entry` should hide its author because `previous` already shows it.
///
/// `previous` must be the entry directly before `entry` and must currently
/// be materialized; pass `None` otherwise. Actions and system notices always
/// show their author column.
pub fn needs_to_hide_name(
    previous: Option<&LogEntry>,
    entry: &LogEntry,
    options: &RenderOptions,
) -> bool {
    let Some(previous) = previous else {
        return false;
    };
    if entry.is_action() || matches!(entry.content(), EntryContent::System(_)) {
        return false;
    }
    if matches!(previous.content(), EntryContent::System(_)) {
        return false;
    }

    let elapsed = entry.timestamp() - previous.timestamp();
    previous.sender() == entry.sender()
        && elapsed >= TimeDelta::zero()
        && elapsed < options.repeat_name_after
}

/// Materialize entry `index`.
pub fn render_entry(
    index: LogIndex,
    entry: &LogEntry,
    hide_name: bool,
    options: &RenderOptions,
) -> RenderedLine {
    let key = LineKey::entry(entry.date(), index);
    let time = entry.timestamp().format(&options.timestamp_format).to_string();

    let (kind, mut columns) = match entry.content() {
        EntryContent::Message(message) => {
            let kind = if message.is_action {
                MessageKind::Action
            } else if message.self_mention {
                MessageKind::Alert
            } else {
                MessageKind::Normal
            };
            let author = if message.is_action {
                format!("* {}", entry.display_name())
            } else {
                entry.display_name().to_string()
            };
            (
                LineKind::Message {
                    kind,
                    state: message.state,
                },
                [
                    ContentColumn::text(author),
                    ContentColumn::text(message.text.clone()),
                    timestamp_column(message, &time),
                ],
            )
        }
        EntryContent::FileTransfer(file) => (
            LineKind::FileTransfer(file.clone()),
            [
                ContentColumn::text(entry.display_name()),
                ContentColumn::widget(file_summary(file)),
                ContentColumn::text(time),
            ],
        ),
        EntryContent::System(notice) => (
            LineKind::System(notice.kind.severity()),
            [
                ContentColumn::widget(""),
                ContentColumn::text(notice.text.clone()),
                ContentColumn::text(time),
            ],
        ),
    };

    columns[ColumnRole::Author.position()].hidden = hide_name;

    let mut line = RenderedLine::new(key, kind, columns);
    line.is_self = options.local_sender.as_ref() == Some(entry.sender());
    line
}

fn timestamp_column(message: &ChatMessage, time: &str) -> ContentColumn {
    match message.state {
        MessageState::Complete => ContentColumn::text(time),
        MessageState::Pending | MessageState::Broken => ContentColumn::widget(""),
    }
}

/// One-line summary shown for a file transfer.
pub fn file_summary(file: &FileTransfer) -> String {
    let arrow = match file.direction {
        FileDirection::Sending => "↑",
        FileDirection::Receiving => "↓",
    };
    format!(
        "{arrow} {} {}% ({})",
        file.file_name,
        file.percent(),
        file.status.label()
    )
}

/// Text of the typing notification line.
pub fn typing_notice(name: &str) -> String {
    format!("{name} is typing...")
}

/// Apply an updated entry to its materialized line, dispatching on the line
/// variant.
///
/// Returns `true` when the line changed (and needs relayout). A content
/// variant that does not match the line variant is ignored.
pub fn update_line(line: &mut RenderedLine, entry: &LogEntry, options: &RenderOptions) -> bool {
    let time = entry.timestamp().format(&options.timestamp_format).to_string();
    let key = line.key();

    match (&mut line.kind, entry.content()) {
        (LineKind::Message { state, .. }, EntryContent::Message(message)) => {
            let changed = *state != message.state
                || line.columns[ColumnRole::Content.position()].text != message.text;
            *state = message.state;

            let hidden = line.columns[ColumnRole::Timestamp.position()].hidden;
            let mut stamp = timestamp_column(message, &time);
            stamp.hidden = hidden;
            line.columns[ColumnRole::Timestamp.position()] = stamp;

            let content = line.column_mut(ColumnRole::Content);
            if content.text != message.text {
                content.text = message.text.clone();
                content.highlight = None;
            }
            changed
        }
        (LineKind::FileTransfer(current), EntryContent::FileTransfer(file)) => {
            if current == file {
                return false;
            }
            *current = file.clone();
            line.column_mut(ColumnRole::Content).text = file_summary(file);
            true
        }
        (LineKind::System(severity), EntryContent::System(notice)) => {
            *severity = notice.kind.severity();
            let content = line.column_mut(ColumnRole::Content);
            if content.text == notice.text {
                return false;
            }
            content.text = notice.text.clone();
            content.highlight = None;
            true
        }
        _ => {
            debug!(?key, "Ignoring update with mismatched entry kind");
            false
        }
    }
}

#[cfg(test)]
#[path = "renderer_tests.rs"]
mod tests;
