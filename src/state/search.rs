//! Search cursor over the whole log.
//!
//! The cursor only tracks *where* it is in the log. Whether the found entry is
//! materialized, and what to do if it is not, is decided by the caller
//! (`ChatView`), which owns the window.

use crate::model::{SearchDirection, SearchHit, SearchPeriod, SearchPos, SearchQuery};
use crate::source::{first_item_after_date, IndexedLog};
use crate::view_state::LineKey;
use tracing::debug;

// ===== SearchOutcome =====

/// Result of a search step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// An occurrence was found; the cursor now sits on it.
    Found(SearchHit),
    /// Nothing further in that direction; the cursor did not move.
    NotFound(SearchDirection),
    /// No search is active.
    Inactive,
}

impl SearchOutcome {
    /// The hit, if any.
    pub fn hit(&self) -> Option<SearchHit> {
        match self {
            SearchOutcome::Found(hit) => Some(*hit),
            _ => None,
        }
    }
}

// ===== SearchCursor =====

/// Active query plus resumable position.
#[derive(Debug, Default)]
pub struct SearchCursor {
    query: Option<SearchQuery>,
    pos: SearchPos,
    highlighted: Option<LineKey>,
}

impl SearchCursor {
    /// Direction the first step of a fresh search takes.
    pub fn initial_direction(period: SearchPeriod) -> SearchDirection {
        match period {
            SearchPeriod::FromBeginning | SearchPeriod::AfterDate(_) => SearchDirection::Down,
            SearchPeriod::FromEnd | SearchPeriod::BeforeDate(_) => SearchDirection::Up,
        }
    }

    /// Cursor position a fresh search starts from.
    pub fn anchor<L: IndexedLog + ?Sized>(log: &L, period: SearchPeriod) -> SearchPos {
        let index = match period {
            SearchPeriod::FromBeginning => log.first_index(),
            SearchPeriod::FromEnd => log.next_index(),
            SearchPeriod::AfterDate(date) | SearchPeriod::BeforeDate(date) => {
                first_item_after_date(log, date)
            }
        };
        SearchPos::before(index)
    }

    /// True while a query is active.
    pub fn is_active(&self) -> bool {
        self.query.is_some()
    }

    /// Active query.
    pub fn query(&self) -> Option<&SearchQuery> {
        self.query.as_ref()
    }

    /// Current position.
    pub fn pos(&self) -> SearchPos {
        self.pos
    }

    /// Line currently carrying the match highlight.
    pub fn highlighted(&self) -> Option<LineKey> {
        self.highlighted
    }

    /// Record the highlighted line, returning the previous one.
    pub fn set_highlighted(&mut self, key: Option<LineKey>) -> Option<LineKey> {
        std::mem::replace(&mut self.highlighted, key)
    }

    /// Replace the active query, move to its anchor and take the first step.
    pub fn start<L: IndexedLog + ?Sized>(&mut self, log: &L, query: SearchQuery) -> SearchOutcome {
        let period = query.params().period;
        self.pos = Self::anchor(log, period);
        debug!(phrase = query.phrase(), ?period, index = self.pos.index.get(), "Search started");
        self.query = Some(query);
        self.step(log, Self::initial_direction(period))
    }

    /// One step of the active query.
    pub fn step<L: IndexedLog + ?Sized>(&mut self, log: &L, direction: SearchDirection) -> SearchOutcome {
        let Some(query) = self.query.as_ref() else {
            return SearchOutcome::Inactive;
        };
        let hit = match direction {
            SearchDirection::Down => log.search_forward(self.pos, query),
            SearchDirection::Up => log.search_backward(self.pos, query),
        };
        match hit {
            Some(hit) => {
                self.pos = hit.pos;
                SearchOutcome::Found(hit)
            }
            None => SearchOutcome::NotFound(direction),
        }
    }

    /// Drop the query. Returns the highlighted line to un-highlight.
    pub fn cancel(&mut self) -> Option<LineKey> {
        self.query = None;
        self.pos = SearchPos::default();
        self.highlighted.take()
    }
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod tests;
