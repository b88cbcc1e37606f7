//! Work deferred until the next render-settled.
//!
//! Continuations are plain data. They hold log indices and search positions,
//! never line handles, so a continuation whose target was evicted before it
//! runs simply finds nothing and does nothing.

use crate::model::{LogIndex, MatchSpan, SearchPos};

/// A queued unit of work, executed once after the next completed render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingContinuation {
    /// Scroll so the line of this index sits at the viewport top.
    ScrollToIndex(LogIndex),
    /// Scroll to and highlight a search match, if the search cursor is still
    /// at `pos`.
    RevealMatch {
        /// Cursor position the match was found at.
        pos: SearchPos,
        /// Match location inside the entry text.
        span: MatchSpan,
    },
}

/// Continuations waiting for the next render-settled.
#[derive(Debug, Default)]
pub struct ContinuationQueue {
    pending: Vec<PendingContinuation>,
}

impl ContinuationQueue {
    /// Register a continuation.
    pub fn push(&mut self, continuation: PendingContinuation) {
        self.pending.push(continuation);
    }

    /// Snapshot and clear the queue, oldest first.
    ///
    /// The snapshot runs in push order, so the latest scroll request is the
    /// one left standing.
    /// Continuations pushed while the snapshot executes land in the (now
    /// empty) queue and wait for the following render-settled.
    pub fn take(&mut self) -> Vec<PendingContinuation> {
        std::mem::take(&mut self.pending)
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Number of waiting continuations.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// True when nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
