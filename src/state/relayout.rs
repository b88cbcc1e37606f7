//! Resumable relayout job.
//!
//! A relayout walks the store from a start position, laying out a bounded
//! number of lines per scheduler turn. New requests while a job is running
//! coalesce into it: the lowest start wins and the scroll anchor captured by
//! the first request is kept.

use crate::view_state::layout::{layout_lines, LineMeasurer};
use crate::view_state::{LayoutParams, RenderedLine, ScrollAnchor};

/// In-flight relayout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayoutJob {
    next: usize,
    anchor: ScrollAnchor,
}

impl RelayoutJob {
    /// New job starting at position `start`.
    pub fn new(start: usize, anchor: ScrollAnchor) -> Self {
        Self {
            next: start,
            anchor,
        }
    }

    /// Fold another request into this job.
    pub fn coalesce(&mut self, start: usize) {
        self.next = self.next.min(start);
    }

    /// Next position to lay out.
    pub fn next(&self) -> usize {
        self.next
    }

    /// Anchor to restore on completion.
    pub fn anchor(&self) -> ScrollAnchor {
        self.anchor
    }

    /// Lay out up to `step` lines. Returns `true` once every line is done.
    pub fn step<M: LineMeasurer + ?Sized>(
        &mut self,
        lines: &mut [RenderedLine],
        step: usize,
        params: &LayoutParams,
        measurer: &M,
    ) -> bool {
        self.next = layout_lines(lines, self.next, step.max(1), params, measurer);
        self.next >= lines.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LogIndex, MessageState};
    use crate::view_state::{ContentColumn, LineKey, LineKind, MessageKind, TextMeasurer};
    use chrono::NaiveDate;

    fn lines(n: u64) -> Vec<RenderedLine> {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..n)
            .map(|i| {
                RenderedLine::new(
                    LineKey::entry(date, LogIndex::new(i)),
                    LineKind::Message {
                        kind: MessageKind::Normal,
                        state: MessageState::Complete,
                    },
                    [
                        ContentColumn::text("a"),
                        ContentColumn::text("b"),
                        ContentColumn::text("c"),
                    ],
                )
            })
            .collect()
    }

    #[test]
    fn job_advances_in_bounded_steps() {
        let mut all = lines(120);
        let mut job = RelayoutJob::new(0, ScrollAnchor::Bottom);
        let params = LayoutParams::default();

        assert!(!job.step(&mut all, 50, &params, &TextMeasurer));
        assert_eq!(job.next(), 50);
        assert!(!all[49].dirty && all[50].dirty);
        assert!(!job.step(&mut all, 50, &params, &TextMeasurer));
        assert!(job.step(&mut all, 50, &params, &TextMeasurer));
        assert_eq!(job.next(), 120);
    }

    #[test]
    fn coalesce_keeps_lowest_start_and_first_anchor() {
        let mut job = RelayoutJob::new(40, ScrollAnchor::Bottom);
        job.coalesce(70);
        assert_eq!(job.next(), 40);
        job.coalesce(10);
        assert_eq!(job.next(), 10);
        assert_eq!(job.anchor(), ScrollAnchor::Bottom);
    }

    #[test]
    fn empty_store_finishes_immediately() {
        let mut job = RelayoutJob::new(0, ScrollAnchor::Bottom);
        assert!(job.step(&mut [], 50, &LayoutParams::default(), &TextMeasurer));
    }
}
