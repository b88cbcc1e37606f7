//! Text selection over materialized lines.
//!
//! Every reference is a [`LineKey`], looked up in the store on each access.
//! Because key order equals position order, the first and last endpoints of
//! a range are just the min and max of the two keys.

use crate::view_state::{ColumnRole, HitTestResult, LineKey, RenderedLineStore};

/// Placeholder for the timestamp of a message without delivery time.
pub const PENDING_TIMESTAMP: &str = "pending";

/// Current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionState {
    /// Nothing selected.
    #[default]
    None,
    /// Character range inside one column of one line.
    Precise {
        /// Selected line.
        line: LineKey,
        /// Selected column.
        column: ColumnRole,
        /// Character offset where the selection started.
        anchor_char: usize,
        /// Character offset the selection extends to.
        cursor_char: usize,
    },
    /// Whole lines from `first` to `last`, inclusive.
    Range {
        /// Line the selection started on.
        anchor: LineKey,
        /// Lower endpoint in position order.
        first: LineKey,
        /// Upper endpoint in position order.
        last: LineKey,
    },
}

/// Selection state machine.
#[derive(Debug, Default)]
pub struct SelectionModel {
    state: SelectionState,
}

impl SelectionModel {
    /// Current state.
    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    /// True when nothing is selected.
    pub fn is_empty(&self) -> bool {
        matches!(self.state, SelectionState::None)
    }

    /// Start a selection at a hit-test result.
    ///
    /// Selectable content starts an (empty) precise selection, any other part
    /// of a line starts a one-line range, a miss clears.
    pub fn begin(&mut self, hit: HitTestResult) {
        self.state = match hit {
            HitTestResult::Miss => SelectionState::None,
            HitTestResult::Line { key } => SelectionState::Range {
                anchor: key,
                first: key,
                last: key,
            },
            HitTestResult::Content {
                key,
                column,
                char_offset,
            } => SelectionState::Precise {
                line: key,
                column,
                anchor_char: char_offset,
                cursor_char: char_offset,
            },
        };
    }

    /// Extend the selection to `hit`. Returns `true` if the state changed.
    ///
    /// Staying in the same column of the same line moves the precise cursor.
    /// Anything else becomes a line range spanning anchor and candidate.
    pub fn extend_to(&mut self, hit: HitTestResult) -> bool {
        let Some(candidate) = hit.key() else {
            return false;
        };

        let next = match self.state {
            SelectionState::None => return false,
            SelectionState::Precise {
                line,
                column,
                anchor_char,
                ..
            } => match hit {
                HitTestResult::Content {
                    key,
                    column: hit_column,
                    char_offset,
                } if key == line && hit_column == column => SelectionState::Precise {
                    line,
                    column,
                    anchor_char,
                    cursor_char: char_offset,
                },
                _ => range(line, candidate),
            },
            SelectionState::Range { anchor, .. } => range(anchor, candidate),
        };

        let changed = next != self.state;
        self.state = next;
        changed
    }

    /// Select every materialized line. Stays empty on an empty store.
    pub fn select_all(&mut self, store: &RenderedLineStore) {
        self.state = match (store.front_key(), store.back_key()) {
            (Some(first), Some(last)) => SelectionState::Range {
                anchor: first,
                first,
                last,
            },
            _ => SelectionState::None,
        };
    }

    /// Select the run of same-class characters around `char_offset`.
    pub fn select_word(
        &mut self,
        store: &RenderedLineStore,
        line: LineKey,
        column: ColumnRole,
        char_offset: usize,
    ) -> bool {
        let Some(text) = selectable_text(store, line, column) else {
            return false;
        };
        let (start, end) = word_bounds(text, char_offset);
        self.state = SelectionState::Precise {
            line,
            column,
            anchor_char: start,
            cursor_char: end,
        };
        true
    }

    /// Select the whole text of one column.
    pub fn select_column(
        &mut self,
        store: &RenderedLineStore,
        line: LineKey,
        column: ColumnRole,
    ) -> bool {
        let Some(text) = selectable_text(store, line, column) else {
            return false;
        };
        self.state = SelectionState::Precise {
            line,
            column,
            anchor_char: 0,
            cursor_char: text.chars().count(),
        };
        true
    }

    /// Drop the selection. Returns `true` if something was selected.
    pub fn clear(&mut self) -> bool {
        let was_selected = !self.is_empty();
        self.state = SelectionState::None;
        was_selected
    }

    /// Force-clear when an endpoint is no longer materialized.
    ///
    /// Returns `true` when the selection was cleared.
    pub fn retain_materialized(&mut self, store: &RenderedLineStore) -> bool {
        let alive = match self.state {
            SelectionState::None => true,
            SelectionState::Precise { line, .. } => store.contains_key(line),
            SelectionState::Range {
                anchor,
                first,
                last,
            } => [anchor, first, last].iter().all(|key| store.contains_key(*key)),
        };
        if alive {
            return false;
        }
        self.clear()
    }

    /// Plain text of the selection.
    ///
    /// Precise selections yield the character slice. Ranges yield one
    /// `[timestamp] author: content` line per message row, skipping rows
    /// without selectable content.
    pub fn selected_text(&self, store: &RenderedLineStore) -> String {
        match self.state {
            SelectionState::None => String::new(),
            SelectionState::Precise {
                line,
                column,
                anchor_char,
                cursor_char,
            } => {
                let Some(line) = store.get_by_key(line) else {
                    return String::new();
                };
                let start = anchor_char.min(cursor_char);
                let end = anchor_char.max(cursor_char);
                line.column(column)
                    .text
                    .chars()
                    .skip(start)
                    .take(end - start)
                    .collect()
            }
            SelectionState::Range { first, last, .. } => store
                .lines_between(first, last)
                .iter()
                .filter_map(|line| line.copy_fields())
                .map(|(author, timestamp, content)| {
                    let timestamp = if timestamp.is_empty() {
                        PENDING_TIMESTAMP
                    } else {
                        timestamp
                    };
                    format!("[{timestamp}] {author}: {content}")
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

fn range(anchor: LineKey, candidate: LineKey) -> SelectionState {
    SelectionState::Range {
        anchor,
        first: anchor.min(candidate),
        last: anchor.max(candidate),
    }
}

fn selectable_text(store: &RenderedLineStore, line: LineKey, column: ColumnRole) -> Option<&str> {
    let column = store.get_by_key(line)?.column(column);
    (column.selectable && !column.hidden).then_some(column.text.as_str())
}

#[derive(PartialEq, Eq)]
enum CharClass {
    Word,
    Space,
    Other,
}

fn classify(c: char) -> CharClass {
    if c.is_alphanumeric() || c == '_' {
        CharClass::Word
    } else if c.is_whitespace() {
        CharClass::Space
    } else {
        CharClass::Other
    }
}

/// Character range `[start, end)` of the same-class run containing `offset`.
fn word_bounds(text: &str, offset: usize) -> (usize, usize) {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return (0, 0);
    }
    let at = offset.min(chars.len() - 1);
    let class = classify(chars[at]);

    let start = chars[..at]
        .iter()
        .rposition(|c| classify(*c) != class)
        .map_or(0, |p| p + 1);
    let end = chars[at..]
        .iter()
        .position(|c| classify(*c) != class)
        .map_or(chars.len(), |p| at + p);
    (start, end)
}

#[cfg(test)]
#[path = "selection_tests.rs"]
mod tests;
