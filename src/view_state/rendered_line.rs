//! RenderedLine - the materialized, positioned form of a log entry or a
//! synthetic date separator.
//!
//! Lines are identified by [`LineKey`], which doubles as their position order:
//! date first, the separator before the entries of that date, then log index.
//! Every reference held outside the store (selection endpoints, scroll
//! anchors, continuations) is a key or a `LogIndex`, re-resolved on access.

use super::types::{LineOffset, LineSpan};
use crate::model::{FileTransfer, LogIndex, MatchSpan, MessageState, Severity};
use chrono::NaiveDate;

// ===== LineKey =====

/// Slot of a line within its date group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    /// The date separator. Sorts before every entry of the date.
    Separator,
    /// A log entry.
    Entry(LogIndex),
}

/// Stable identity and sort key of a rendered line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineKey {
    /// Calendar date the line belongs to.
    pub date: NaiveDate,
    /// Separator or entry slot.
    pub slot: Slot,
}

impl LineKey {
    /// Key of an entry line.
    pub fn entry(date: NaiveDate, index: LogIndex) -> Self {
        Self {
            date,
            slot: Slot::Entry(index),
        }
    }

    /// Key of a date separator line.
    pub fn separator(date: NaiveDate) -> Self {
        Self {
            date,
            slot: Slot::Separator,
        }
    }

    /// Log index, `None` for separators.
    pub fn index(&self) -> Option<LogIndex> {
        match self.slot {
            Slot::Entry(index) => Some(index),
            Slot::Separator => None,
        }
    }
}

// ===== Columns =====

/// The three content columns of a line, left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    /// Sender name (or `*` marker for actions).
    Author,
    /// Message body / notice text / transfer summary.
    Content,
    /// Delivery time.
    Timestamp,
}

impl ColumnRole {
    /// All roles in column order.
    pub const ALL: [ColumnRole; 3] = [ColumnRole::Author, ColumnRole::Content, ColumnRole::Timestamp];

    /// Position of the column in `RenderedLine::columns`.
    pub fn position(&self) -> usize {
        match self {
            ColumnRole::Author => 0,
            ColumnRole::Content => 1,
            ColumnRole::Timestamp => 2,
        }
    }
}

/// One column of a rendered line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContentColumn {
    /// Plain text of the column.
    pub text: String,
    /// Hidden columns keep their text for copying but are not drawn.
    pub hidden: bool,
    /// Whether pointer selection can start inside this column.
    pub selectable: bool,
    /// In-view search highlight.
    pub highlight: Option<MatchSpan>,
    /// Left edge, set by layout.
    pub x: u16,
    /// Width, set by layout.
    pub width: u16,
    /// Wrapped row count, set by layout.
    pub rows: usize,
}

impl ContentColumn {
    /// Selectable text column.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            selectable: true,
            ..Self::default()
        }
    }

    /// Display-only column.
    pub fn widget(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            selectable: false,
            ..Self::default()
        }
    }

    /// Whether column `x` falls inside the column's horizontal extent.
    pub fn contains_x(&self, x: u16) -> bool {
        x >= self.x && x < self.x.saturating_add(self.width)
    }
}

// ===== LineKind =====

/// Flavour of a chat message line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Regular message.
    Normal,
    /// `/me` action.
    Action,
    /// Message mentioning the local user.
    Alert,
}

/// Tagged line variant; in-place updates dispatch on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// Chat message.
    Message {
        /// Display flavour.
        kind: MessageKind,
        /// Delivery state at render time.
        state: MessageState,
    },
    /// File transfer with its latest progress.
    FileTransfer(FileTransfer),
    /// System notice.
    System(Severity),
    /// Synthetic date separator.
    DateSeparator,
}

// ===== RenderedLine =====

/// A materialized line, owned exclusively by the store once inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    key: LineKey,
    /// Variant data.
    pub kind: LineKind,
    /// Author, content and timestamp columns.
    pub columns: [ContentColumn; 3],
    /// Vertical bounding interval, valid once laid out.
    pub span: LineSpan,
    /// Whether any part of the line is inside the viewport.
    pub visible: bool,
    /// Produced by the local user.
    pub is_self: bool,
    /// Needs a layout pass before its span is trustworthy.
    pub dirty: bool,
}

impl RenderedLine {
    /// New, not yet laid out line.
    pub fn new(key: LineKey, kind: LineKind, columns: [ContentColumn; 3]) -> Self {
        Self {
            key,
            kind,
            columns,
            span: LineSpan::default(),
            visible: false,
            is_self: false,
            dirty: true,
        }
    }

    /// Date separator showing `label`.
    pub fn date_separator(date: NaiveDate, label: impl Into<String>) -> Self {
        Self::new(
            LineKey::separator(date),
            LineKind::DateSeparator,
            [
                ContentColumn::widget(""),
                ContentColumn::widget(label),
                ContentColumn::widget(""),
            ],
        )
    }

    /// Stable key.
    pub fn key(&self) -> LineKey {
        self.key
    }

    /// Owning log index, `None` for separators.
    pub fn index(&self) -> Option<LogIndex> {
        self.key.index()
    }

    /// True for synthetic date separators.
    pub fn is_separator(&self) -> bool {
        matches!(self.kind, LineKind::DateSeparator)
    }

    /// Column by role.
    pub fn column(&self, role: ColumnRole) -> &ContentColumn {
        &self.columns[role.position()]
    }

    /// Mutable column by role.
    pub fn column_mut(&mut self, role: ColumnRole) -> &mut ContentColumn {
        &mut self.columns[role.position()]
    }

    /// Top row of the line.
    pub fn top(&self) -> LineOffset {
        self.span.top
    }

    /// One past the bottom row of the line.
    pub fn bottom(&self) -> LineOffset {
        self.span.bottom()
    }

    /// Column under horizontal position `x` and row `row_in_line`, if any.
    pub fn column_at(&self, x: u16, row_in_line: usize) -> Option<ColumnRole> {
        ColumnRole::ALL.into_iter().find(|role| {
            let column = self.column(*role);
            !column.hidden && column.contains_x(x) && row_in_line < column.rows.max(1)
        })
    }

    /// Fields copied by multi-line selection: `(author, timestamp, content)`.
    ///
    /// `None` for rows without selectable message content (separators,
    /// transfer widgets, system notices, empty bodies).
    pub fn copy_fields(&self) -> Option<(&str, &str, &str)> {
        if !matches!(self.kind, LineKind::Message { .. }) {
            return None;
        }
        let content = self.column(ColumnRole::Content);
        if !content.selectable || content.text.is_empty() {
            return None;
        }
        Some((
            self.column(ColumnRole::Author).text.as_str(),
            self.column(ColumnRole::Timestamp).text.as_str(),
            content.text.as_str(),
        ))
    }
}
