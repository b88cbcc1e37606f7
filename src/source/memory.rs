//! In-memory `IndexedLog`.

use crate::model::{EntryContent, LogEntry, LogIndex};
use crate::source::{DateIndex, IndexedLog};
use chrono::NaiveDate;

/// Vector-backed append-only log.
///
/// Entry `first_index + i` is stored at `entries[i]`. The first index can be
/// non-zero to model a log whose oldest history was dropped.
#[derive(Debug, Clone, Default)]
pub struct MemoryLog {
    first: LogIndex,
    entries: Vec<LogEntry>,
}

impl MemoryLog {
    /// Empty log starting at index 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty log whose first entry will get `first`.
    pub fn starting_at(first: LogIndex) -> Self {
        Self {
            first,
            entries: Vec::new(),
        }
    }

    /// Build a log from entries, starting at index 0.
    pub fn from_entries(entries: impl IntoIterator<Item = LogEntry>) -> Self {
        Self {
            first: LogIndex::new(0),
            entries: entries.into_iter().collect(),
        }
    }

    /// Append an entry and return its index.
    pub fn append(&mut self, entry: LogEntry) -> LogIndex {
        let index = self.next_index();
        self.entries.push(entry);
        index
    }

    /// Replace the payload of an existing entry (delivery confirmation,
    /// transfer progress). Returns `false` when `index` is out of range.
    pub fn update_content(&mut self, index: LogIndex, content: EntryContent) -> bool {
        match self.slot(index) {
            Some(slot) => {
                *self.entries[slot].content_mut() = content;
                true
            }
            None => false,
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn slot(&self, index: LogIndex) -> Option<usize> {
        if index < self.first {
            return None;
        }
        let slot = usize::try_from(index.get() - self.first.get()).ok()?;
        (slot < self.entries.len()).then_some(slot)
    }
}

impl IndexedLog for MemoryLog {
    fn first_index(&self) -> LogIndex {
        self.first
    }

    fn next_index(&self) -> LogIndex {
        LogIndex::new(self.first.get() + self.entries.len() as u64)
    }

    fn entry_at(&self, index: LogIndex) -> Option<&LogEntry> {
        self.slot(index).map(|slot| &self.entries[slot])
    }

    fn entry_indices_on_date(&self, date: NaiveDate, limit: usize) -> Vec<DateIndex> {
        let mut found: Vec<DateIndex> = Vec::new();
        if limit == 0 {
            return found;
        }

        for (offset, entry) in self.entries.iter().enumerate() {
            let entry_date = entry.date();
            if entry_date < date {
                continue;
            }
            if found.last().is_some_and(|d| d.date >= entry_date) {
                continue;
            }
            found.push(DateIndex {
                date: entry_date,
                index: LogIndex::new(self.first.get() + offset as u64),
            });
            if found.len() == limit {
                break;
            }
        }

        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChatMessage, SearchParams, SearchPos, SearchQuery, SenderId};
    use chrono::{TimeZone, Utc};

    fn message(day: u32, text: &str) -> LogEntry {
        LogEntry::new(
            SenderId::new("bob").unwrap(),
            "Bob",
            Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap(),
            EntryContent::Message(ChatMessage::delivered(text)),
        )
    }

    fn query(phrase: &str) -> SearchQuery {
        SearchQuery::new(phrase, SearchParams::default()).unwrap()
    }

    fn log(texts: &[&str]) -> MemoryLog {
        MemoryLog::from_entries(texts.iter().map(|t| message(1, t)))
    }

    #[test]
    fn append_assigns_dense_indices() {
        let mut log = MemoryLog::starting_at(LogIndex::new(10));
        assert!(log.is_empty());
        assert_eq!(log.append(message(1, "a")), LogIndex::new(10));
        assert_eq!(log.append(message(1, "b")), LogIndex::new(11));
        assert_eq!(log.next_index(), LogIndex::new(12));
        assert!(log.entry_at(LogIndex::new(9)).is_none());
        assert_eq!(
            log.entry_at(LogIndex::new(11)).unwrap().message_text(),
            Some("b")
        );
    }

    #[test]
    fn update_content_rejects_unknown_index() {
        let mut log = log(&["a"]);
        let updated = log.update_content(
            LogIndex::new(5),
            EntryContent::Message(ChatMessage::delivered("x")),
        );
        assert!(!updated);
    }

    #[test]
    fn date_index_returns_first_entry_per_date() {
        let log = MemoryLog::from_entries(vec![
            message(1, "a"),
            message(1, "b"),
            message(3, "c"),
            message(4, "d"),
        ]);
        let date = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();

        let found = log.entry_indices_on_date(date, 5);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].index, LogIndex::new(2));
        assert_eq!(found[1].index, LogIndex::new(3));

        assert_eq!(log.entry_indices_on_date(date, 1).len(), 1);
        assert!(log.entry_indices_on_date(date, 0).is_empty());
    }

    #[test]
    fn search_forward_walks_occurrences_in_order() {
        let log = log(&["foo foo", "bar", "foo"]);
        let q = query("foo");

        let first = log.search_forward(SearchPos::before(LogIndex::new(0)), &q).unwrap();
        assert_eq!(first.pos, SearchPos { index: LogIndex::new(0), matches: 1 });
        assert_eq!(first.span.start, 0);

        let second = log.search_forward(first.pos, &q).unwrap();
        assert_eq!(second.pos, SearchPos { index: LogIndex::new(0), matches: 2 });
        assert_eq!(second.span.start, 4);

        let third = log.search_forward(second.pos, &q).unwrap();
        assert_eq!(third.pos, SearchPos { index: LogIndex::new(2), matches: 1 });

        assert!(log.search_forward(third.pos, &q).is_none());
    }

    #[test]
    fn search_backward_from_end_finds_last_occurrence() {
        let log = log(&["foo", "bar", "foo foo"]);
        let q = query("foo");

        let last = log.search_backward(SearchPos::before(log.next_index()), &q).unwrap();
        assert_eq!(last.pos, SearchPos { index: LogIndex::new(2), matches: 2 });
        assert_eq!(last.span.start, 4);

        let prev = log.search_backward(last.pos, &q).unwrap();
        assert_eq!(prev.pos, SearchPos { index: LogIndex::new(2), matches: 1 });

        let oldest = log.search_backward(prev.pos, &q).unwrap();
        assert_eq!(oldest.pos, SearchPos { index: LogIndex::new(0), matches: 1 });

        assert!(log.search_backward(oldest.pos, &q).is_none());
    }

    #[test]
    fn forward_then_backward_never_repeats_the_same_occurrence() {
        let log = log(&["foo", "foo", "foo"]);
        let q = query("foo");

        let hit = log.search_forward(SearchPos { index: LogIndex::new(1), matches: 0 }, &q).unwrap();
        assert_eq!(hit.pos.index, LogIndex::new(1));

        let back = log.search_backward(hit.pos, &q).unwrap();
        assert_eq!(back.pos.index, LogIndex::new(0));
    }

    #[test]
    fn search_on_empty_log_finds_nothing() {
        let log = MemoryLog::new();
        let q = query("x");
        assert!(log.search_forward(SearchPos::default(), &q).is_none());
        assert!(log.search_backward(SearchPos::default(), &q).is_none());
    }
}
