//! Observability events emitted by the view.
//!
//! Events are queued during an operation and drained by the host with
//! `ChatView::drain_events`. Nothing inside the view consumes them.

use crate::model::{LogIndex, SearchDirection};
use crate::view_state::LineKey;

/// Something the presentation layer may want to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewEvent {
    /// The materialized index range changed.
    WindowChanged {
        /// Lowest materialized index.
        first: LogIndex,
        /// Highest materialized index.
        last: LogIndex,
    },
    /// A relayout completed and pending continuations ran.
    RenderSettled,
    /// The selection changed (including forced clears).
    SelectionChanged,
    /// A search step found nothing in the given direction.
    SearchNotFound(SearchDirection),
    /// The topmost visible line changed.
    FirstVisibleLineChanged {
        /// Previous topmost visible line.
        previous: Option<LineKey>,
        /// Current topmost visible line.
        first: Option<LineKey>,
    },
}

/// FIFO buffer of pending events.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<ViewEvent>,
}

impl EventQueue {
    /// Queue an event.
    pub fn push(&mut self, event: ViewEvent) {
        self.events.push(event);
    }

    /// Take every queued event, oldest first.
    pub fn drain(&mut self) -> Vec<ViewEvent> {
        std::mem::take(&mut self.events)
    }
}
