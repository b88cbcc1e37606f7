//! WindowController - which part of the log is materialized.
//!
//! Owns the line store, the viewport and the relayout job. It reads the log
//! through [`IndexedLog`] but never holds on to it; every operation that needs
//! entries takes the log as a parameter.
//!
//! # Window moves
//!
//! `set_window_start` picks one of three strategies:
//! - unchanged start: nothing happens, so selection and search references stay valid
//! - overlap with the current range: only the non-overlapping slices are removed
//!   and only the missing slices are rendered
//! - disjoint (or a fragmented store): everything is cleared and re-rendered
//!
//! Every move captures the scroll anchor first and then schedules a relayout.

use super::relayout::RelayoutJob;
use crate::model::{LogEntry, LogIndex, MatchSpan};
use crate::source::IndexedLog;
use crate::view_state::hit_test::{hit_test, hit_test_nearest};
use crate::view_state::layout::layout_lines;
use crate::view_state::renderer::{needs_to_hide_name, render_entry, update_line};
use crate::view_state::{
    ColumnRole, HitTestResult, LayoutParams, LineHeight, LineKey, LineKind, LineMeasurer,
    LineOffset, LineSpan, PointerPos, RenderOptions, RenderedLineStore, ScrollAnchor, Viewport,
    ViewportDimensions,
};
use tracing::debug;

/// Sizing knobs of the rendered window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSettings {
    /// Upper bound on materialized entries (soft while not pinned to bottom).
    pub max_window_size: usize,
    /// Entries loaded or evicted at once.
    pub window_chunk_size: usize,
    /// Lines laid out per relayout step.
    pub relayout_step: usize,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            max_window_size: 300,
            window_chunk_size: 100,
            relayout_step: 50,
        }
    }
}

/// What a window operation did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowChange {
    /// Nothing was touched.
    Unchanged,
    /// Slices were added and/or removed at the ends.
    Shifted,
    /// The store was cleared and refilled.
    Replaced,
}

impl WindowChange {
    /// True unless `Unchanged`.
    pub fn is_changed(&self) -> bool {
        !matches!(self, WindowChange::Unchanged)
    }
}

/// `idx + val`, clamped to `[first_index, next_index]` of `log`.
///
/// Moving backwards past the first entry yields the first entry; moving
/// forwards past the end yields `next_index`.
pub fn clamped_add<L: IndexedLog + ?Sized>(log: &L, idx: LogIndex, val: i64) -> LogIndex {
    let first = log.first_index().get() as i128;
    let next = log.next_index().get() as i128;
    let idx = idx.get() as i128;
    let val = val as i128;

    let result = if val < 0 {
        if -val > idx - first {
            first
        } else {
            idx + val
        }
    } else if val > next - idx {
        next
    } else {
        idx + val
    };

    LogIndex::new(result.clamp(0, u64::MAX as i128) as u64)
}

/// The typing notification, laid out below the last line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypingLine {
    /// Notice text.
    pub text: String,
    /// Vertical extent.
    pub span: LineSpan,
}

/// Materialized window over the log plus its layout and scroll state.
#[derive(Debug)]
pub struct WindowController<M> {
    store: RenderedLineStore,
    viewport: Viewport,
    params: LayoutParams,
    measurer: M,
    render: RenderOptions,
    settings: WindowSettings,
    relayout: Option<RelayoutJob>,
    settled: bool,
    typing: Option<TypingLine>,
}

impl<M: LineMeasurer> WindowController<M> {
    /// Empty window.
    pub fn new(
        settings: WindowSettings,
        params: LayoutParams,
        render: RenderOptions,
        date_format: &str,
        dimensions: ViewportDimensions,
        measurer: M,
    ) -> Self {
        Self {
            store: RenderedLineStore::new(date_format),
            viewport: Viewport::new(dimensions),
            params: params.with_width(dimensions.width),
            measurer,
            render,
            settings,
            relayout: None,
            settled: false,
            typing: None,
        }
    }

    // ===== Accessors =====

    /// Materialized lines.
    pub fn store(&self) -> &RenderedLineStore {
        &self.store
    }

    /// Scroll state.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Window sizing.
    pub fn settings(&self) -> &WindowSettings {
        &self.settings
    }

    /// Current layout parameters.
    pub fn params(&self) -> &LayoutParams {
        &self.params
    }

    /// The measurer lines are laid out with.
    pub fn measurer(&self) -> &M {
        &self.measurer
    }

    /// Typing notification, if shown.
    pub fn typing(&self) -> Option<&TypingLine> {
        self.typing.as_ref()
    }

    /// True while a relayout job is in flight.
    pub fn is_relayouting(&self) -> bool {
        self.relayout.is_some()
    }

    /// Position the in-flight relayout will lay out next.
    pub fn relayout_progress(&self) -> Option<usize> {
        self.relayout.map(|job| job.next())
    }

    /// Consume the render-settled notification, if one is pending.
    pub fn take_settled(&mut self) -> bool {
        std::mem::take(&mut self.settled)
    }

    /// True when the materialized indices form one gap-free range.
    pub fn is_contiguous(&self) -> bool {
        match (self.store.first_index(), self.store.last_index()) {
            (Some(first), Some(last)) => {
                first.distance_to(last) + 1 == self.store.indexed_len() as u64
            }
            _ => true,
        }
    }

    // ===== Window moves =====

    /// Materialize `[start, start + max_window_size)`, clamped to the log.
    pub fn set_window_start<L: IndexedLog + ?Sized>(
        &mut self,
        log: &L,
        start: LogIndex,
    ) -> WindowChange {
        let Some(last) = log.next_index().prev().filter(|_| !log.is_empty()) else {
            return WindowChange::Unchanged;
        };
        let start = start.clamp(log.first_index(), last);
        let end = clamped_add(log, start, self.settings.max_window_size as i64);

        if self.store.first_index() == Some(start) {
            return WindowChange::Unchanged;
        }

        let anchor = self.viewport.capture_anchor(&self.store);
        let current = self
            .store
            .first_index()
            .zip(self.store.last_index().map(|l| l.next()));

        let change = match current {
            Some((old_start, old_end))
                if self.is_contiguous() && start < old_end && old_start < end =>
            {
                if old_start < start {
                    self.store.remove_range(old_start, start);
                }
                if end < old_end {
                    self.store.remove_range(end, old_end);
                }
                if start < old_start {
                    self.render_range(log, start, old_start);
                    self.refresh_name(log, old_start);
                } else {
                    self.refresh_name(log, start);
                }
                if old_end < end {
                    self.render_range(log, old_end, end);
                }
                WindowChange::Shifted
            }
            _ => {
                self.store.clear();
                self.render_range(log, start, end);
                WindowChange::Replaced
            }
        };

        debug!(
            start = start.get(),
            end = end.get(),
            ?change,
            lines = self.store.len(),
            "Moved rendered window"
        );

        self.request_relayout(0, anchor);
        change
    }

    /// Materialize the window that ends at `end` (inclusive).
    pub fn set_window_end<L: IndexedLog + ?Sized>(&mut self, log: &L, end: LogIndex) -> WindowChange {
        if log.is_empty() {
            return WindowChange::Unchanged;
        }
        let back = -(self.settings.max_window_size.saturating_sub(1) as i64);
        let start = clamped_add(log, end, back);
        self.set_window_start(log, start)
    }

    /// Incremental path for a freshly appended entry.
    ///
    /// The entry is rendered only if it continues the materialized tail (or
    /// nothing is materialized yet). When pinned to the bottom and over the
    /// size bound, one chunk is evicted from the head, stopping at the first
    /// visible line.
    pub fn on_log_appended<L: IndexedLog + ?Sized>(&mut self, log: &L, index: LogIndex) -> WindowChange {
        if !log.contains(index) {
            return WindowChange::Unchanged;
        }

        let continues_tail = index
            .prev()
            .is_some_and(|prev| self.store.contains_index(prev))
            && index.next() == log.next_index();
        let should_render = self.store.contains_index(index)
            || continues_tail
            || !self.store.has_any_indexed();
        if !should_render {
            return WindowChange::Unchanged;
        }

        let pinned = self.viewport.is_at_bottom();
        let anchor = self.viewport.capture_anchor(&self.store);

        self.render_range(log, index, index.next());

        let evicted = if pinned && self.store.indexed_len() > self.settings.max_window_size {
            self.evict_head(log)
        } else {
            0
        };

        if evicted > 0 || self.relayout.is_some() {
            self.request_relayout(0, anchor);
            return WindowChange::Shifted;
        }

        let Some(pos) = self.store.position_of_index(index) else {
            return WindowChange::Shifted;
        };
        let from = self.first_dirty_before(pos);
        if pos + 1 == self.store.len() {
            let len = self.store.len();
            layout_lines(self.store.as_mut_slice(), from, len - from, &self.params, &self.measurer);
            self.finish_layout(anchor);
        } else {
            self.request_relayout(from, anchor);
        }
        WindowChange::Shifted
    }

    fn evict_head<L: IndexedLog + ?Sized>(&mut self, log: &L) -> usize {
        let Some(first) = self.store.first_index() else {
            return 0;
        };
        let mut bound = first.saturating_offset(self.settings.window_chunk_size as i64);
        if let Some(visible) = self.first_visible_index() {
            bound = bound.min(visible);
        }

        let evicted = self.store.remove_range(first, bound);
        if let Some(new_first) = self.store.first_index() {
            self.refresh_name(log, new_first);
        }
        debug!(first = first.get(), bound = bound.get(), evicted, "Evicted window head");
        evicted
    }

    /// Re-render the materialized line of `index` in place.
    ///
    /// Never materializes anything. Returns `true` if the line changed.
    pub fn on_entry_updated<L: IndexedLog + ?Sized>(&mut self, log: &L, index: LogIndex) -> bool {
        let Some(entry) = log.entry_at(index) else {
            return false;
        };
        let anchor = self.viewport.capture_anchor(&self.store);
        let Some(line) = self.store.get_mut(index) else {
            return false;
        };
        if !update_line(line, entry, &self.render) {
            return false;
        }
        line.dirty = true;

        if let Some(pos) = self.store.position_of_index(index) {
            self.request_relayout(pos, anchor);
        }
        true
    }

    /// Drop every line except active file transfers.
    pub fn clear_keeping_active_transfers<L: IndexedLog + ?Sized>(&mut self, log: &L) {
        self.store.retain(|line| {
            matches!(&line.kind, LineKind::FileTransfer(file) if file.status.is_active())
        });
        let kept: Vec<LogIndex> = self.store.indices().collect();
        for index in kept {
            self.refresh_name(log, index);
        }
        for line in self.store.iter_mut() {
            line.dirty = true;
        }
        debug!(kept = self.store.indexed_len(), "Cleared rendered window");
        self.request_relayout(0, ScrollAnchor::Bottom);
    }

    fn render_range<L: IndexedLog + ?Sized>(&mut self, log: &L, begin: LogIndex, end: LogIndex) {
        let mut index = begin;
        while index < end {
            if let Some(entry) = log.entry_at(index) {
                let previous = self.materialized_previous(log, index);
                let hide = needs_to_hide_name(previous, entry, &self.render);
                self.store.insert(render_entry(index, entry, hide, &self.render));
            }
            index = index.next();
        }
    }

    fn materialized_previous<'l, L: IndexedLog + ?Sized>(
        &self,
        log: &'l L,
        index: LogIndex,
    ) -> Option<&'l LogEntry> {
        index
            .prev()
            .filter(|prev| self.store.contains_index(*prev))
            .and_then(|prev| log.entry_at(prev))
    }

    /// Recompute author hiding for `index` after its predecessor appeared or
    /// disappeared.
    fn refresh_name<L: IndexedLog + ?Sized>(&mut self, log: &L, index: LogIndex) {
        let Some(entry) = log.entry_at(index) else {
            return;
        };
        let hide = needs_to_hide_name(self.materialized_previous(log, index), entry, &self.render);
        if let Some(line) = self.store.get_mut(index) {
            let author = line.column_mut(ColumnRole::Author);
            if author.hidden != hide {
                author.hidden = hide;
                line.dirty = true;
            }
        }
    }

    fn first_dirty_before(&self, pos: usize) -> usize {
        let mut from = pos;
        while from > 0 && self.store.line_at(from - 1).is_some_and(|l| l.dirty) {
            from -= 1;
        }
        from
    }

    // ===== Relayout =====

    /// Relayout every line from position `start_hint` onward.
    pub fn relayout(&mut self, start_hint: usize) {
        let anchor = self.viewport.capture_anchor(&self.store);
        self.request_relayout(start_hint, anchor);
    }

    fn request_relayout(&mut self, from: usize, anchor: ScrollAnchor) {
        match &mut self.relayout {
            Some(job) => job.coalesce(from),
            None => self.relayout = Some(RelayoutJob::new(from, anchor)),
        }
        self.settled = false;
    }

    /// Advance the relayout job by one step. Returns `true` when it finished
    /// on this tick.
    pub fn tick(&mut self) -> bool {
        let Some(job) = self.relayout.as_mut() else {
            return false;
        };
        let done = job.step(
            self.store.as_mut_slice(),
            self.settings.relayout_step,
            &self.params,
            &self.measurer,
        );
        debug!(next = job.next(), done, "Relayout step");

        if done {
            let anchor = job.anchor();
            self.relayout = None;
            self.finish_layout(anchor);
        }
        done
    }

    fn finish_layout(&mut self, anchor: ScrollAnchor) {
        self.layout_typing();
        self.viewport.set_content_height(self.total_height());
        if let Some(offset) = anchor.resolve(&self.store, &self.viewport) {
            self.viewport.scroll_to(offset);
        }
        self.update_visibility();
        self.settled = true;
    }

    fn layout_typing(&mut self) {
        let height = self.store.content_height();
        let top = if self.store.is_empty() {
            0
        } else {
            height + self.params.line_spacing as usize
        };
        let width = self.params.width;
        if let Some(typing) = self.typing.as_mut() {
            let rows = self.measurer.measure(&typing.text, width);
            typing.span = LineSpan::new(LineOffset::new(top), LineHeight::from_rows(rows));
        }
    }

    fn total_height(&self) -> usize {
        match &self.typing {
            Some(typing) => typing.span.bottom().get(),
            None => self.store.content_height(),
        }
    }

    /// Show or hide the typing notification.
    pub fn set_typing(&mut self, text: Option<String>) {
        let pinned = self.viewport.is_at_bottom();
        self.typing = text.map(|text| TypingLine {
            text,
            span: LineSpan::default(),
        });
        if self.relayout.is_some() {
            return;
        }
        self.layout_typing();
        self.viewport.set_content_height(self.total_height());
        if pinned {
            self.viewport.scroll_to_bottom();
        }
        self.update_visibility();
    }

    // ===== Scrolling =====

    fn update_visibility(&mut self) {
        let viewport = self.viewport;
        for line in self.store.iter_mut() {
            line.visible = !line.dirty && viewport.intersects(line.top(), line.bottom());
        }
    }

    /// Move the viewport, clamped.
    pub fn scroll_to(&mut self, offset: LineOffset) -> LineOffset {
        let applied = self.viewport.scroll_to(offset);
        self.update_visibility();
        applied
    }

    /// Move the viewport by a signed number of rows.
    pub fn scroll_by(&mut self, delta: i64) -> LineOffset {
        let applied = self.viewport.scroll_by(delta);
        self.update_visibility();
        applied
    }

    /// Put the line of `index` at the viewport top. `false` if not materialized.
    pub fn scroll_to_index(&mut self, index: LogIndex) -> bool {
        let Some(top) = self.store.get(index).map(|line| line.top()) else {
            return false;
        };
        self.scroll_to(top);
        true
    }

    /// Resize the viewport. A width change relayouts every line.
    pub fn resize(&mut self, dimensions: ViewportDimensions) {
        let anchor = self.viewport.capture_anchor(&self.store);
        let width_changed = dimensions.width != self.params.width;
        self.viewport.resize(dimensions);

        if width_changed {
            self.params = self.params.with_width(dimensions.width);
            for line in self.store.iter_mut() {
                line.dirty = true;
            }
            self.request_relayout(0, anchor);
        } else {
            if anchor == ScrollAnchor::Bottom {
                self.viewport.scroll_to_bottom();
            }
            self.update_visibility();
        }
    }

    /// Topmost line intersecting the viewport.
    pub fn first_visible_key(&self) -> Option<LineKey> {
        self.store.iter().find(|line| line.visible).map(|line| line.key())
    }

    /// Lowest log index intersecting the viewport.
    pub fn first_visible_index(&self) -> Option<LogIndex> {
        self.store
            .iter()
            .filter(|line| line.visible)
            .find_map(|line| line.index())
    }

    // ===== Highlight & hit-testing =====

    /// Highlight `span` in the content column of `index`. `false` if not
    /// materialized.
    pub fn highlight(&mut self, index: LogIndex, span: MatchSpan) -> bool {
        match self.store.get_mut(index) {
            Some(line) => {
                line.column_mut(ColumnRole::Content).highlight = Some(span);
                true
            }
            None => false,
        }
    }

    /// Remove the highlight from `key`, if the line still exists.
    pub fn clear_highlight(&mut self, key: LineKey) {
        if let Some(line) = self.store.get_by_key_mut(key) {
            line.column_mut(ColumnRole::Content).highlight = None;
        }
    }

    /// Hit-test a viewport position.
    pub fn hit_test(&self, pos: PointerPos) -> HitTestResult {
        hit_test(&self.store, &self.viewport, &self.measurer, pos)
    }

    /// Hit-test, snapping to the nearest line.
    pub fn hit_test_nearest(&self, pos: PointerPos) -> HitTestResult {
        hit_test_nearest(&self.store, &self.viewport, &self.measurer, pos)
    }
}

#[cfg(test)]
#[path = "window_tests.rs"]
mod tests;
