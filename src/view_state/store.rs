//! RenderedLineStore - ordered container of materialized lines.
//!
//! Lines live in a single vector sorted by [`LineKey`]. Because layout is
//! monotonic top-to-bottom, key order is also vertical position order, so
//! position lookups are binary searches over the same vector. A side map from
//! `LogIndex` to date turns index lookups into key lookups.
//!
//! # Invariants
//! - `lines` is strictly sorted by key.
//! - `dates` holds exactly the indices of the entry lines in `lines`.
//! - Every entry line is preceded (somewhere earlier) by its date separator.
//!   Separators survive `remove_range`; only `clear` and `retain` drop them.

use super::rendered_line::{LineKey, RenderedLine};
use super::types::LineOffset;
use crate::model::LogIndex;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Default label format for synthesized date separators.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Materialized lines of the rendered window.
#[derive(Debug, Clone)]
pub struct RenderedLineStore {
    lines: Vec<RenderedLine>,
    dates: BTreeMap<LogIndex, NaiveDate>,
    date_format: String,
}

impl Default for RenderedLineStore {
    fn default() -> Self {
        Self::new(DEFAULT_DATE_FORMAT)
    }
}

impl RenderedLineStore {
    /// Empty store; separators are labelled with `date_format` (chrono syntax).
    pub fn new(date_format: impl Into<String>) -> Self {
        Self {
            lines: Vec::new(),
            dates: BTreeMap::new(),
            date_format: date_format.into(),
        }
    }

    // ===== Mutation =====

    /// Insert an entry line in key order, replacing any line with the same key.
    ///
    /// Synthesizes the date separator when this is the first line of its date.
    /// Returns the position the line landed at.
    pub fn insert(&mut self, line: RenderedLine) -> usize {
        let key = line.key();

        if let Some(index) = key.index() {
            // An index moving to a different date must not leave a stale copy.
            if let Some(old_date) = self.dates.insert(index, key.date) {
                if old_date != key.date {
                    if let Ok(pos) = self.search(LineKey::entry(old_date, index)) {
                        self.lines.remove(pos);
                    }
                }
            }
            self.ensure_separator(key.date);
        }

        match self.search(key) {
            Ok(pos) => {
                self.lines[pos] = line;
                pos
            }
            Err(pos) => {
                self.lines.insert(pos, line);
                pos
            }
        }
    }

    fn ensure_separator(&mut self, date: NaiveDate) {
        let key = LineKey::separator(date);
        if let Err(pos) = self.search(key) {
            let label = date.format(&self.date_format).to_string();
            self.lines.insert(pos, RenderedLine::date_separator(date, label));
        }
    }

    /// Remove every entry line with index in `[begin, end)`.
    ///
    /// Separators persist. Empty or out-of-range intervals are no-ops.
    pub fn remove_range(&mut self, begin: LogIndex, end: LogIndex) -> usize {
        if begin >= end {
            return 0;
        }
        let doomed: Vec<LogIndex> = self.dates.range(begin..end).map(|(i, _)| *i).collect();
        if doomed.is_empty() {
            return 0;
        }
        for index in &doomed {
            self.dates.remove(index);
        }
        self.lines
            .retain(|line| line.index().is_none_or(|i| i < begin || i >= end));
        doomed.len()
    }

    /// Drop every line, separators included.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.dates.clear();
    }

    /// Keep only lines for which `keep` returns true.
    ///
    /// Separators whose date has no remaining entry are dropped as well.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&RenderedLine) -> bool,
    {
        self.lines.retain(|line| line.is_separator() || keep(line));
        self.dates = self
            .lines
            .iter()
            .filter_map(|line| line.index().map(|i| (i, line.key().date)))
            .collect();
        let dates = &self.dates;
        self.lines
            .retain(|line| !line.is_separator() || dates.values().any(|d| *d == line.key().date));
    }

    // ===== Index lookups =====

    /// Line materialized for `index`.
    pub fn get(&self, index: LogIndex) -> Option<&RenderedLine> {
        let pos = self.position_of_index(index)?;
        self.lines.get(pos)
    }

    /// Mutable line materialized for `index`.
    pub fn get_mut(&mut self, index: LogIndex) -> Option<&mut RenderedLine> {
        let pos = self.position_of_index(index)?;
        self.lines.get_mut(pos)
    }

    /// Whether `index` is materialized.
    pub fn contains_index(&self, index: LogIndex) -> bool {
        self.dates.contains_key(&index)
    }

    /// Key of the line materialized for `index`.
    pub fn key_of(&self, index: LogIndex) -> Option<LineKey> {
        self.dates
            .get(&index)
            .map(|date| LineKey::entry(*date, index))
    }

    /// Lowest materialized index.
    pub fn first_index(&self) -> Option<LogIndex> {
        self.dates.keys().next().copied()
    }

    /// Highest materialized index.
    pub fn last_index(&self) -> Option<LogIndex> {
        self.dates.keys().next_back().copied()
    }

    /// Whether any entry line is materialized.
    pub fn has_any_indexed(&self) -> bool {
        !self.dates.is_empty()
    }

    /// Number of entry lines (separators excluded).
    pub fn indexed_len(&self) -> usize {
        self.dates.len()
    }

    /// Materialized indices in ascending order.
    pub fn indices(&self) -> impl Iterator<Item = LogIndex> + '_ {
        self.dates.keys().copied()
    }

    // ===== Key / position lookups =====

    fn search(&self, key: LineKey) -> Result<usize, usize> {
        self.lines.binary_search_by_key(&key, RenderedLine::key)
    }

    /// Position of `key` in position order.
    pub fn position_of(&self, key: LineKey) -> Option<usize> {
        self.search(key).ok()
    }

    /// Position of the line materialized for `index`.
    pub fn position_of_index(&self, index: LogIndex) -> Option<usize> {
        self.position_of(self.key_of(index)?)
    }

    /// Line at position `pos`.
    pub fn line_at(&self, pos: usize) -> Option<&RenderedLine> {
        self.lines.get(pos)
    }

    /// Line with key `key`.
    pub fn get_by_key(&self, key: LineKey) -> Option<&RenderedLine> {
        self.position_of(key).and_then(|pos| self.lines.get(pos))
    }

    /// Mutable line with key `key`.
    pub fn get_by_key_mut(&mut self, key: LineKey) -> Option<&mut RenderedLine> {
        let pos = self.position_of(key)?;
        self.lines.get_mut(pos)
    }

    /// Whether a line with `key` exists.
    pub fn contains_key(&self, key: LineKey) -> bool {
        self.search(key).is_ok()
    }

    /// Position of the line whose span contains row `y`.
    pub fn position_at(&self, y: LineOffset) -> Option<usize> {
        let pos = self.lines.partition_point(|line| line.bottom() <= y);
        self.lines
            .get(pos)
            .filter(|line| line.span.contains(y))
            .map(|_| pos)
    }

    /// Line whose span contains row `y`; `None` in gaps and past the end.
    pub fn lookup_by_position(&self, y: LineOffset) -> Option<&RenderedLine> {
        self.position_at(y).and_then(|pos| self.lines.get(pos))
    }

    /// First line whose bottom lies below `y`, even if `y` falls in the
    /// spacing gap above it.
    pub fn first_at_or_below(&self, y: LineOffset) -> Option<&RenderedLine> {
        let pos = self.lines.partition_point(|line| line.bottom() <= y);
        self.lines.get(pos)
    }

    /// Lines from `first` to `last` inclusive, in position order.
    ///
    /// Empty when either key is missing or `first` sorts after `last`.
    pub fn lines_between(&self, first: LineKey, last: LineKey) -> &[RenderedLine] {
        match (self.position_of(first), self.position_of(last)) {
            (Some(a), Some(b)) if a <= b => &self.lines[a..=b],
            _ => &[],
        }
    }

    /// Keys of [`lines_between`](Self::lines_between).
    pub fn keys_between(&self, first: LineKey, last: LineKey) -> impl Iterator<Item = LineKey> + '_ {
        self.lines_between(first, last).iter().map(RenderedLine::key)
    }

    /// Key of the first line in position order.
    pub fn front_key(&self) -> Option<LineKey> {
        self.lines.first().map(RenderedLine::key)
    }

    /// Key of the last line in position order.
    pub fn back_key(&self) -> Option<LineKey> {
        self.lines.last().map(RenderedLine::key)
    }

    // ===== Iteration =====

    /// Lines in position order.
    pub fn iter(&self) -> std::slice::Iter<'_, RenderedLine> {
        self.lines.iter()
    }

    /// Mutable lines in position order. Keys cannot be changed through this.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, RenderedLine> {
        self.lines.iter_mut()
    }

    /// Mutable slice for layout passes.
    pub fn as_mut_slice(&mut self) -> &mut [RenderedLine] {
        &mut self.lines
    }

    /// Total number of lines, separators included.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True when no line is materialized.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// One past the bottom row of the last line.
    pub fn content_height(&self) -> usize {
        self.lines.last().map(|line| line.bottom().get()).unwrap_or(0)
    }
}

impl<'a> IntoIterator for &'a RenderedLineStore {
    type Item = &'a RenderedLine;
    type IntoIter = std::slice::Iter<'a, RenderedLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MessageState, Severity};
    use crate::view_state::rendered_line::{ColumnRole, ContentColumn, LineKind, MessageKind};
    use crate::view_state::types::{LineHeight, LineSpan};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn line(day: u32, index: u64) -> RenderedLine {
        RenderedLine::new(
            LineKey::entry(date(day), LogIndex::new(index)),
            LineKind::Message {
                kind: MessageKind::Normal,
                state: MessageState::Complete,
            },
            [
                ContentColumn::text("bob"),
                ContentColumn::text(format!("message {index}")),
                ContentColumn::text("12:00"),
            ],
        )
    }

    /// Lay lines out one row each, back to back.
    fn stack(store: &mut RenderedLineStore) {
        for (row, line) in store.iter_mut().enumerate() {
            line.span = LineSpan::new(LineOffset::new(row), LineHeight::ONE);
        }
    }

    #[test]
    fn insert_synthesizes_one_separator_per_date() {
        let mut store = RenderedLineStore::default();
        store.insert(line(1, 0));
        store.insert(line(1, 1));
        store.insert(line(2, 2));

        let kinds: Vec<bool> = store.iter().map(RenderedLine::is_separator).collect();
        assert_eq!(kinds, vec![true, false, false, true, false]);
        assert_eq!(store.indexed_len(), 3);
        assert_eq!(
            store.line_at(0).unwrap().column(ColumnRole::Content).text,
            "2024-01-01"
        );
    }

    #[test]
    fn insert_out_of_order_keeps_key_order() {
        let mut store = RenderedLineStore::default();
        store.insert(line(1, 5));
        store.insert(line(1, 3));
        store.insert(line(1, 4));

        let indices: Vec<u64> = store.indices().map(|i| i.get()).collect();
        assert_eq!(indices, vec![3, 4, 5]);
        assert_eq!(store.position_of_index(LogIndex::new(3)), Some(1));
    }

    #[test]
    fn reinsert_replaces_existing_line() {
        let mut store = RenderedLineStore::default();
        store.insert(line(1, 0));
        let mut updated = line(1, 0);
        updated.is_self = true;
        store.insert(updated);

        assert_eq!(store.len(), 2);
        assert!(store.get(LogIndex::new(0)).unwrap().is_self);
    }

    #[test]
    fn remove_range_keeps_separators() {
        let mut store = RenderedLineStore::default();
        for i in 0..4 {
            store.insert(line(1, i));
        }

        assert_eq!(store.remove_range(LogIndex::new(0), LogIndex::new(4)), 4);
        assert!(!store.has_any_indexed());
        assert_eq!(store.len(), 1);
        assert!(store.line_at(0).unwrap().is_separator());
    }

    #[test]
    fn remove_range_tolerates_empty_and_out_of_range_intervals() {
        let mut store = RenderedLineStore::default();
        store.insert(line(1, 10));

        assert_eq!(store.remove_range(LogIndex::new(5), LogIndex::new(5)), 0);
        assert_eq!(store.remove_range(LogIndex::new(20), LogIndex::new(10)), 0);
        assert_eq!(store.remove_range(LogIndex::new(0), LogIndex::new(10)), 0);
        assert!(store.contains_index(LogIndex::new(10)));
    }

    #[test]
    fn bounds_queries_on_empty_store_return_none() {
        let store = RenderedLineStore::default();
        assert_eq!(store.first_index(), None);
        assert_eq!(store.last_index(), None);
        assert!(store.get(LogIndex::new(0)).is_none());
        assert!(store.lookup_by_position(LineOffset::new(0)).is_none());
    }

    #[test]
    fn lookup_by_position_finds_containing_line() {
        let mut store = RenderedLineStore::default();
        for i in 0..3 {
            store.insert(line(1, i));
        }
        stack(&mut store);

        let hit = store.lookup_by_position(LineOffset::new(2)).unwrap();
        assert_eq!(hit.index(), Some(LogIndex::new(1)));
        assert!(store.lookup_by_position(LineOffset::new(4)).is_none());
        assert_eq!(store.content_height(), 4);
    }

    #[test]
    fn lookup_by_position_misses_spacing_gap() {
        let mut store = RenderedLineStore::default();
        store.insert(line(1, 0));
        store.insert(line(1, 1));
        for (n, l) in store.iter_mut().enumerate() {
            l.span = LineSpan::new(LineOffset::new(n * 2), LineHeight::ONE);
        }

        assert!(store.lookup_by_position(LineOffset::new(1)).is_none());
        assert_eq!(
            store.first_at_or_below(LineOffset::new(1)).unwrap().index(),
            Some(LogIndex::new(0))
        );
    }

    #[test]
    fn lines_between_is_inclusive_and_ordered() {
        let mut store = RenderedLineStore::default();
        for i in 0..5 {
            store.insert(line(1, i));
        }
        let first = store.key_of(LogIndex::new(1)).unwrap();
        let last = store.key_of(LogIndex::new(3)).unwrap();

        assert_eq!(store.lines_between(first, last).len(), 3);
        assert!(store.lines_between(last, first).is_empty());
        let keys: Vec<_> = store.keys_between(first, last).filter_map(|k| k.index()).collect();
        assert_eq!(keys, vec![LogIndex::new(1), LogIndex::new(2), LogIndex::new(3)]);
    }

    #[test]
    fn retain_drops_orphaned_separators() {
        let mut store = RenderedLineStore::default();
        store.insert(line(1, 0));
        store.insert(line(2, 1));
        store.insert(RenderedLine::new(
            LineKey::entry(date(2), LogIndex::new(2)),
            LineKind::System(Severity::Info),
            Default::default(),
        ));

        store.retain(|l| l.index() != Some(LogIndex::new(0)));

        assert_eq!(store.first_index(), Some(LogIndex::new(1)));
        assert_eq!(store.front_key(), Some(LineKey::separator(date(2))));
        assert_eq!(store.len(), 3);
    }
}
