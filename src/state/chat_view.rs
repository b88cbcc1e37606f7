//! ChatView - the facade the presentation layer talks to.
//!
//! Owns the log, the window controller, the selection, the search cursor,
//! the continuation queue and the event queue. Every public operation runs to
//! completion on `&mut self`; long relayouts are advanced by [`ChatView::tick`].
//!
//! After each render-settled the view runs the pending continuations (newest
//! first), drops stale selection and highlight references, and emits
//! [`ViewEvent::RenderSettled`].

use super::continuation::{ContinuationQueue, PendingContinuation};
use super::events::{EventQueue, ViewEvent};
use super::search::{SearchCursor, SearchOutcome};
use super::selection::SelectionModel;
use super::window::{clamped_add, WindowChange, WindowController, WindowSettings};
use crate::model::{
    EntryContent, LogEntry, LogIndex, MatchSpan, SearchDirection, SearchError, SearchParams,
    SearchQuery,
};
use crate::source::{first_item_after_date, IndexedLog, MemoryLog};
use crate::view_state::store::DEFAULT_DATE_FORMAT;
use crate::view_state::{
    HitTestResult, LayoutParams, LineKey, LineMeasurer, LineOffset, PointerPos, RenderOptions,
    TextMeasurer, ViewportDimensions,
};
use chrono::NaiveDate;
use tracing::{debug, warn};

/// Upper bound on ticks in [`ChatView::run_until_settled`].
const MAX_SETTLE_TICKS: usize = 10_000;

/// Construction options.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatViewOptions {
    /// Window sizing.
    pub window: WindowSettings,
    /// Column layout.
    pub layout: LayoutParams,
    /// Entry rendering.
    pub render: RenderOptions,
    /// strftime format of date separators.
    pub date_format: String,
    /// Initial viewport size.
    pub dimensions: ViewportDimensions,
    /// Entries materialized when the view opens.
    pub initial_load: usize,
    /// Pointer travel (manhattan, in cells) before a press becomes a drag.
    pub drag_threshold: u32,
    /// Rows scrolled per tick while dragging outside the viewport.
    pub autoscroll_speed: u16,
}

impl Default for ChatViewOptions {
    fn default() -> Self {
        Self {
            window: WindowSettings::default(),
            layout: LayoutParams::default(),
            render: RenderOptions::default(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            dimensions: ViewportDimensions::default(),
            initial_load: 100,
            drag_threshold: 2,
            autoscroll_speed: 3,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct DragState {
    origin: PointerPos,
    origin_hit: HitTestResult,
    last: PointerPos,
    selecting: bool,
}

/// Bounded, scrollable, selectable and searchable view over an [`IndexedLog`].
#[derive(Debug)]
pub struct ChatView<L, M = TextMeasurer> {
    log: L,
    window: WindowController<M>,
    selection: SelectionModel,
    search: SearchCursor,
    continuations: ContinuationQueue,
    events: EventQueue,
    drag: Option<DragState>,
    first_visible: Option<LineKey>,
    initial_load: usize,
    drag_threshold: u32,
    autoscroll_speed: u16,
}

impl<L: IndexedLog> ChatView<L, TextMeasurer> {
    /// Open a view over `log` measuring text by display width.
    pub fn new(log: L, options: ChatViewOptions) -> Self {
        Self::with_measurer(log, options, TextMeasurer)
    }
}

impl<L: IndexedLog, M: LineMeasurer> ChatView<L, M> {
    /// Open a view over `log` with a custom measurer.
    ///
    /// The newest `initial_load` entries are materialized and the view ends
    /// up pinned to the bottom once the first relayout settles.
    pub fn with_measurer(log: L, options: ChatViewOptions, measurer: M) -> Self {
        let window = WindowController::new(
            options.window,
            options.layout,
            options.render,
            &options.date_format,
            options.dimensions,
            measurer,
        );
        let mut view = Self {
            log,
            window,
            selection: SelectionModel::default(),
            search: SearchCursor::default(),
            continuations: ContinuationQueue::default(),
            events: EventQueue::default(),
            drag: None,
            first_visible: None,
            initial_load: options.initial_load,
            drag_threshold: options.drag_threshold,
            autoscroll_speed: options.autoscroll_speed,
        };
        view.load_initial();
        view
    }

    fn load_initial(&mut self) {
        if self.log.is_empty() {
            return;
        }
        let back = -(self.initial_load.max(1) as i64);
        let start = clamped_add(&self.log, self.log.next_index(), back);
        self.set_window_start(start);
    }

    // ===== Accessors =====

    /// The backing log.
    pub fn log(&self) -> &L {
        &self.log
    }

    /// Mutable access to the backing log. Call [`ChatView::on_log_appended`]
    /// or [`ChatView::on_entry_updated`] after changing it.
    pub fn log_mut(&mut self) -> &mut L {
        &mut self.log
    }

    /// Window, store and viewport.
    pub fn window(&self) -> &WindowController<M> {
        &self.window
    }

    /// Selection state.
    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    /// Search state.
    pub fn search(&self) -> &SearchCursor {
        &self.search
    }

    /// Number of continuations waiting for the next render-settled.
    pub fn pending_continuations(&self) -> usize {
        self.continuations.len()
    }

    /// Take every queued event.
    pub fn drain_events(&mut self) -> Vec<ViewEvent> {
        self.events.drain()
    }

    // ===== Window =====

    /// Materialize the window starting at `index`.
    pub fn set_window_start(&mut self, index: LogIndex) -> WindowChange {
        let change = self.window.set_window_start(&self.log, index);
        self.after_window_change(change);
        change
    }

    /// Materialize the window ending at `index`.
    pub fn set_window_end(&mut self, index: LogIndex) -> WindowChange {
        let change = self.window.set_window_end(&self.log, index);
        self.after_window_change(change);
        change
    }

    /// Bring `index` into view, moving the window if needed.
    ///
    /// `next_index` is treated as the last entry; anything outside the log is
    /// clamped.
    pub fn jump_to_index(&mut self, index: LogIndex) {
        let Some(index) = self.clamp_to_log(index) else {
            return;
        };
        let materialized = self.window.store().contains_index(index);
        if materialized && !self.window.is_relayouting() {
            self.window.scroll_to_index(index);
            self.note_first_visible();
            return;
        }
        if !materialized {
            self.move_window_to(index);
        }
        // Line tops are stale until the relayout finishes.
        if self.window.is_relayouting() {
            self.continuations.push(PendingContinuation::ScrollToIndex(index));
        }
    }

    /// Jump to the first entry on or after `date`.
    pub fn jump_to_date(&mut self, date: NaiveDate) {
        let index = first_item_after_date(&self.log, date);
        debug!(%date, index = index.get(), "Jump to date");
        self.jump_to_index(index);
    }

    fn clamp_to_log(&self, index: LogIndex) -> Option<LogIndex> {
        if self.log.is_empty() {
            return None;
        }
        let last = self.log.next_index().prev()?;
        Some(index.clamp(self.log.first_index(), last))
    }

    /// Window move that materializes `index`: newer targets end the window,
    /// older ones start it.
    fn move_window_to(&mut self, index: LogIndex) -> WindowChange {
        let past_tail = self
            .window
            .store()
            .last_index()
            .is_none_or(|last| index > last);
        if past_tail {
            self.set_window_end(index)
        } else {
            self.set_window_start(index)
        }
    }

    fn after_window_change(&mut self, change: WindowChange) {
        if !change.is_changed() {
            return;
        }
        let store = self.window.store();
        if let (Some(first), Some(last)) = (store.first_index(), store.last_index()) {
            self.events.push(ViewEvent::WindowChanged { first, last });
        }
        self.drop_stale_references();
    }

    fn drop_stale_references(&mut self) {
        let store = self.window.store();
        if self.selection.retain_materialized(store) {
            debug!("Selection endpoint left the window");
            self.events.push(ViewEvent::SelectionChanged);
        }
        if let Some(key) = self.search.highlighted() {
            if !store.contains_key(key) {
                self.search.set_highlighted(None);
            }
        }
    }

    // ===== Scrolling =====

    /// User scroll to an absolute offset. Reaching an edge loads a chunk.
    pub fn scroll_to(&mut self, offset: LineOffset) -> LineOffset {
        let applied = self.window.scroll_to(offset);
        self.load_at_edges();
        self.note_first_visible();
        applied
    }

    /// User scroll by a signed number of rows. Reaching an edge loads a chunk.
    pub fn scroll_by(&mut self, delta: i64) -> LineOffset {
        let applied = self.window.scroll_by(delta);
        self.load_at_edges();
        self.note_first_visible();
        applied
    }

    fn load_at_edges(&mut self) {
        if self.window.is_relayouting() || self.log.is_empty() {
            return;
        }
        let chunk = self.window.settings().window_chunk_size as i64;
        let viewport = *self.window.viewport();
        let first = self.window.store().first_index();
        let last = self.window.store().last_index();

        if viewport.is_at_top() {
            if let Some(first) = first.filter(|f| *f > self.log.first_index()) {
                let start = clamped_add(&self.log, first, -chunk);
                debug!(first = first.get(), start = start.get(), "Loading older entries");
                if self.set_window_start(start).is_changed() {
                    self.continuations.push(PendingContinuation::ScrollToIndex(first));
                }
                return;
            }
        }

        if viewport.is_at_bottom() {
            if let Some(last) = last.filter(|l| l.next() < self.log.next_index()) {
                let tail = self.log.next_index().prev().unwrap_or(last);
                let end = clamped_add(&self.log, last, chunk).min(tail);
                debug!(last = last.get(), end = end.get(), "Loading newer entries");
                if self.set_window_end(end).is_changed() {
                    self.continuations.push(PendingContinuation::ScrollToIndex(last));
                }
            }
        }
    }

    /// Resize the viewport.
    pub fn resize(&mut self, dimensions: ViewportDimensions) {
        self.window.resize(dimensions);
        self.note_first_visible();
    }

    fn note_first_visible(&mut self) {
        let first = self.window.first_visible_key();
        if first != self.first_visible {
            let previous = std::mem::replace(&mut self.first_visible, first);
            self.events.push(ViewEvent::FirstVisibleLineChanged { previous, first });
        }
    }

    // ===== Scheduling =====

    /// Advance one scheduler turn: drag auto-scroll, one relayout step, and
    /// settle dispatch. Returns `true` when a relayout finished on this tick.
    pub fn tick(&mut self) -> bool {
        self.autoscroll();
        let finished = self.window.tick();
        self.dispatch_settled();
        finished
    }

    /// Tick until no relayout is in flight. Returns the number of ticks.
    pub fn run_until_settled(&mut self) -> usize {
        self.dispatch_settled();
        let mut ticks = 0;
        while self.window.is_relayouting() {
            if ticks == MAX_SETTLE_TICKS {
                warn!(ticks, "Relayout did not settle");
                break;
            }
            self.tick();
            ticks += 1;
        }
        ticks
    }

    fn dispatch_settled(&mut self) {
        while self.window.take_settled() {
            let batch = self.continuations.take();
            debug!(continuations = batch.len(), "Render settled");
            for continuation in batch {
                self.run_continuation(continuation);
            }
            self.drop_stale_references();
            self.events.push(ViewEvent::RenderSettled);
            self.note_first_visible();
        }
    }

    fn run_continuation(&mut self, continuation: PendingContinuation) {
        match continuation {
            PendingContinuation::ScrollToIndex(index) => {
                self.window.scroll_to_index(index);
            }
            PendingContinuation::RevealMatch { pos, span } => {
                if self.search.is_active() && self.search.pos() == pos {
                    self.reveal_match(pos.index, span);
                }
            }
        }
    }

    // ===== Log notifications =====

    /// The host appended entry `index` to the log.
    pub fn on_log_appended(&mut self, index: LogIndex) -> WindowChange {
        let change = self.window.on_log_appended(&self.log, index);
        self.after_window_change(change);
        self.dispatch_settled();
        change
    }

    /// The host changed entry `index` in place.
    pub fn on_entry_updated(&mut self, index: LogIndex) -> bool {
        self.window.on_entry_updated(&self.log, index)
    }

    /// Show (`Some`) or hide (`None`) the typing notification.
    pub fn set_typing(&mut self, text: Option<String>) {
        self.window.set_typing(text);
        self.note_first_visible();
    }

    /// Drop everything except active file transfers, the selection, the
    /// search and every pending continuation.
    pub fn clear(&mut self) {
        self.window.clear_keeping_active_transfers(&self.log);
        self.continuations.clear();
        if let Some(key) = self.search.cancel() {
            self.window.clear_highlight(key);
        }
        if self.selection.clear() {
            self.events.push(ViewEvent::SelectionChanged);
        }
        let store = self.window.store();
        if let (Some(first), Some(last)) = (store.first_index(), store.last_index()) {
            self.events.push(ViewEvent::WindowChanged { first, last });
        }
    }

    // ===== Selection =====

    /// Select every materialized line.
    pub fn select_all(&mut self) {
        self.selection.select_all(self.window.store());
        self.events.push(ViewEvent::SelectionChanged);
    }

    /// Drop the selection.
    pub fn clear_selection(&mut self) {
        if self.selection.clear() {
            self.events.push(ViewEvent::SelectionChanged);
        }
    }

    /// Plain text of the selection.
    pub fn selected_text(&self) -> String {
        self.selection.selected_text(self.window.store())
    }

    /// Pointer pressed: clear the selection and arm a drag.
    pub fn press(&mut self, pos: PointerPos) {
        self.clear_selection();
        self.drag = Some(DragState {
            origin: pos,
            origin_hit: self.window.hit_test_nearest(pos),
            last: pos,
            selecting: false,
        });
    }

    /// Pointer moved with the button held.
    pub fn drag(&mut self, pos: PointerPos) {
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        drag.last = pos;

        let mut changed = false;
        if !drag.selecting {
            if drag.origin.manhattan_distance(pos) < self.drag_threshold {
                return;
            }
            drag.selecting = true;
            self.selection.begin(drag.origin_hit);
            changed = true;
        }
        changed |= self.selection.extend_to(self.window.hit_test_nearest(pos));
        if changed {
            self.events.push(ViewEvent::SelectionChanged);
        }
    }

    /// Pointer released.
    pub fn release(&mut self, pos: PointerPos) {
        if self.drag.is_some_and(|d| d.selecting) {
            self.drag(pos);
        }
        self.drag = None;
    }

    /// Select the word under the pointer.
    pub fn double_click(&mut self, pos: PointerPos) {
        self.drag = None;
        if let HitTestResult::Content {
            key,
            column,
            char_offset,
        } = self.window.hit_test(pos)
        {
            if self
                .selection
                .select_word(self.window.store(), key, column, char_offset)
            {
                self.events.push(ViewEvent::SelectionChanged);
            }
        }
    }

    /// Select the whole column under the pointer.
    pub fn triple_click(&mut self, pos: PointerPos) {
        self.drag = None;
        if let HitTestResult::Content { key, column, .. } = self.window.hit_test(pos) {
            if self.selection.select_column(self.window.store(), key, column) {
                self.events.push(ViewEvent::SelectionChanged);
            }
        }
    }

    /// Dragging past the top or bottom edge scrolls the viewport. Auto-scroll
    /// never moves the window, so the selection anchor stays materialized.
    fn autoscroll(&mut self) {
        let Some(drag) = self.drag.filter(|d| d.selecting) else {
            return;
        };
        let height = self.window.viewport().dimensions().height as i32;
        let speed = self.autoscroll_speed as i64;
        let delta = if drag.last.y < 0 {
            -speed
        } else if drag.last.y >= height {
            speed
        } else {
            return;
        };

        self.window.scroll_by(delta);
        if self
            .selection
            .extend_to(self.window.hit_test_nearest(drag.last))
        {
            self.events.push(ViewEvent::SelectionChanged);
        }
        self.note_first_visible();
    }

    // ===== Search =====

    /// Start a new search, replacing any active one.
    pub fn start_search(
        &mut self,
        phrase: &str,
        params: SearchParams,
    ) -> Result<SearchOutcome, SearchError> {
        let query = SearchQuery::new(phrase, params)?;
        let outcome = self.search.start(&self.log, query);
        self.apply_search_outcome(outcome);
        Ok(outcome)
    }

    /// Continue the active search in its starting direction.
    pub fn search_next(&mut self) -> SearchOutcome {
        let Some(direction) = self.search_direction() else {
            return SearchOutcome::Inactive;
        };
        self.search_step(direction)
    }

    /// Step the active search against its starting direction.
    pub fn search_previous(&mut self) -> SearchOutcome {
        let Some(direction) = self.search_direction() else {
            return SearchOutcome::Inactive;
        };
        self.search_step(match direction {
            SearchDirection::Up => SearchDirection::Down,
            SearchDirection::Down => SearchDirection::Up,
        })
    }

    /// One step of the active search in an explicit direction.
    pub fn search_step(&mut self, direction: SearchDirection) -> SearchOutcome {
        let outcome = self.search.step(&self.log, direction);
        self.apply_search_outcome(outcome);
        outcome
    }

    fn search_direction(&self) -> Option<SearchDirection> {
        self.search
            .query()
            .map(|query| SearchCursor::initial_direction(query.params().period))
    }

    /// Drop the search and its highlight.
    pub fn cancel_search(&mut self) {
        if let Some(key) = self.search.cancel() {
            self.window.clear_highlight(key);
        }
    }

    fn apply_search_outcome(&mut self, outcome: SearchOutcome) {
        match outcome {
            SearchOutcome::Inactive => {}
            SearchOutcome::NotFound(direction) => {
                debug!(?direction, "Search exhausted");
                self.events.push(ViewEvent::SearchNotFound(direction));
            }
            SearchOutcome::Found(hit) => {
                if let Some(previous) = self.search.set_highlighted(None) {
                    self.window.clear_highlight(previous);
                }
                let index = hit.pos.index;
                let materialized = self.window.store().contains_index(index);
                if materialized && !self.window.is_relayouting() {
                    self.reveal_match(index, hit.span);
                    return;
                }
                if !materialized {
                    self.move_window_to(index);
                }
                if self.window.is_relayouting() {
                    self.continuations.push(PendingContinuation::RevealMatch {
                        pos: hit.pos,
                        span: hit.span,
                    });
                }
            }
        }
    }

    fn reveal_match(&mut self, index: LogIndex, span: MatchSpan) {
        if !self.window.highlight(index, span) {
            return;
        }
        self.window.scroll_to_index(index);
        let key = self.window.store().key_of(index);
        self.search.set_highlighted(key);
        self.note_first_visible();
    }
}

impl<M: LineMeasurer> ChatView<MemoryLog, M> {
    /// Append to the in-memory log and notify the window.
    pub fn append(&mut self, entry: LogEntry) -> LogIndex {
        let index = self.log.append(entry);
        self.on_log_appended(index);
        index
    }

    /// Replace an entry's payload and notify the window.
    pub fn update_content(&mut self, index: LogIndex, content: EntryContent) -> bool {
        self.log.update_content(index, content) && self.on_entry_updated(index)
    }
}

#[cfg(test)]
#[path = "chat_view_tests.rs"]
mod tests;
