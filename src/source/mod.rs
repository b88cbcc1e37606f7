//! Backing log sources.
//!
//! The view never owns the log. It reads entries through the [`IndexedLog`]
//! trait, which any append-only store can implement. This module provides:
//! - [`IndexedLog`]: the collaborator interface (random access, date index,
//!   bidirectional search)
//! - [`MemoryLog`]: an in-memory implementation used by the CLI and tests
//! - [`file`]: JSONL loading into a `MemoryLog`

use crate::model::{LogEntry, LogIndex, SearchHit, SearchPos, SearchQuery};
use chrono::NaiveDate;

pub mod file;
pub mod memory;

pub use file::load_log;
pub use memory::MemoryLog;

/// First entry of a calendar date, as returned by the date index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateIndex {
    /// The calendar date.
    pub date: NaiveDate,
    /// First entry on that date.
    pub index: LogIndex,
}

/// Append-only log addressed by dense, monotonically increasing indices.
///
/// `first_index()..next_index()` is the valid range; `next_index()` is the
/// high-water mark, one past the last entry. An empty log has
/// `first_index() == next_index()`.
///
/// Search steps have default implementations driven by `entry_at`; stores with
/// their own text index can override them. Only chat message text is searched.
pub trait IndexedLog {
    /// Index of the oldest available entry.
    fn first_index(&self) -> LogIndex;

    /// One past the newest entry.
    fn next_index(&self) -> LogIndex;

    /// Random access. `None` outside `first_index()..next_index()`.
    fn entry_at(&self, index: LogIndex) -> Option<&LogEntry>;

    /// First entry of each distinct date on or after `date`, at most `limit`
    /// of them, in ascending date order.
    fn entry_indices_on_date(&self, date: NaiveDate, limit: usize) -> Vec<DateIndex>;

    /// True when the log holds no entries.
    fn is_empty(&self) -> bool {
        self.next_index() <= self.first_index()
    }

    /// True when `index` addresses an existing entry.
    fn contains(&self, index: LogIndex) -> bool {
        index >= self.first_index() && index < self.next_index()
    }

    /// Find the next occurrence after `from`.
    ///
    /// Never returns the occurrence the cursor is already on.
    fn search_forward(&self, from: SearchPos, query: &SearchQuery) -> Option<SearchHit> {
        let first = self.first_index();
        let next = self.next_index();

        let (mut index, mut skip) = if from.index < first {
            (first, 0)
        } else {
            (from.index, from.matches)
        };

        while index < next {
            if let Some(text) = self.entry_at(index).and_then(LogEntry::message_text) {
                if let Some(span) = query.find_all(text).get(skip) {
                    return Some(SearchHit {
                        pos: SearchPos {
                            index,
                            matches: skip + 1,
                        },
                        span: *span,
                    });
                }
            }
            index = index.next();
            skip = 0;
        }

        None
    }

    /// Find the previous occurrence before `from`.
    ///
    /// Never returns the occurrence the cursor is already on.
    fn search_backward(&self, from: SearchPos, query: &SearchQuery) -> Option<SearchHit> {
        let first = self.first_index();
        let next = self.next_index();
        if next <= first {
            return None;
        }

        // Earlier occurrences inside the current entry come first.
        if from.index >= first && from.index < next && from.matches >= 2 {
            if let Some(text) = self.entry_at(from.index).and_then(LogEntry::message_text) {
                if let Some(span) = query.find_all(text).get(from.matches - 2) {
                    return Some(SearchHit {
                        pos: SearchPos {
                            index: from.index,
                            matches: from.matches - 1,
                        },
                        span: *span,
                    });
                }
            }
        }

        let mut index = from.index.min(next);
        while index > first {
            let Some(prev) = index.prev() else {
                break;
            };
            index = prev;

            if let Some(text) = self.entry_at(index).and_then(LogEntry::message_text) {
                let spans = query.find_all(text);
                if let Some(span) = spans.last() {
                    return Some(SearchHit {
                        pos: SearchPos {
                            index,
                            matches: spans.len(),
                        },
                        span: *span,
                    });
                }
            }
        }

        None
    }
}

/// First entry on or after `date`, or `next_index()` when there is none.
pub fn first_item_after_date<L: IndexedLog + ?Sized>(log: &L, date: NaiveDate) -> LogIndex {
    log.entry_indices_on_date(date, 1)
        .first()
        .map(|d| d.index)
        .unwrap_or_else(|| log.next_index())
}
