//! Line measurement and the layout pass.
//!
//! Typesetting of a single entry is delegated to a [`LineMeasurer`]. The crate
//! ships [`TextMeasurer`], a terminal-cell wrapper based on `unicode-width`.
//! `layout_lines` positions a contiguous run of lines top-to-bottom and is the
//! unit of work of both the synchronous tail layout and the chunked relayout.

use super::layout_params::LayoutParams;
use super::rendered_line::{ColumnRole, RenderedLine};
use super::types::{LineHeight, LineOffset, LineSpan};
use unicode_width::UnicodeWidthChar;

/// Measures how a column's text wraps at a given width.
///
/// Implementations must be deterministic: same text and width, same rows.
pub trait LineMeasurer {
    /// Byte ranges of the wrapped rows of `text` at `width` cells.
    /// Never empty; an empty text is one empty row.
    fn wrap(&self, text: &str, width: u16) -> Vec<std::ops::Range<usize>>;

    /// Number of rows `text` occupies at `width` cells.
    fn measure(&self, text: &str, width: u16) -> usize {
        self.wrap(text, width).len()
    }

    /// Character offset (not byte offset) under cell `x` of wrapped row `row`.
    ///
    /// Positions past the end of a row map to the end of that row; rows past
    /// the end map to the end of the text.
    fn char_offset_at(&self, text: &str, width: u16, row: usize, x: u16) -> usize {
        let rows = self.wrap(text, width);
        let Some(range) = rows.get(row) else {
            return text.chars().count();
        };

        let mut offset = text[..range.start].chars().count();
        let mut cell = 0u16;
        for ch in text[range.clone()].chars() {
            let w = ch.width().unwrap_or(0) as u16;
            if cell.saturating_add(w) > x {
                break;
            }
            cell = cell.saturating_add(w);
            offset += 1;
        }
        offset
    }
}

/// Greedy character wrapper over terminal cell widths.
///
/// Breaks at hard newlines, and after the last whitespace that fits when
/// possible, otherwise mid-word.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextMeasurer;

impl LineMeasurer for TextMeasurer {
    fn wrap(&self, text: &str, width: u16) -> Vec<std::ops::Range<usize>> {
        let width = width.max(1) as usize;
        let mut rows = Vec::new();

        let mut para_start = 0;
        for paragraph in text.split('\n') {
            wrap_paragraph(paragraph, para_start, width, &mut rows);
            para_start += paragraph.len() + 1;
        }

        if rows.is_empty() {
            rows.push(0..0);
        }
        rows
    }
}

fn wrap_paragraph(
    paragraph: &str,
    base: usize,
    width: usize,
    rows: &mut Vec<std::ops::Range<usize>>,
) {
    let mut row_start = 0;
    let mut row_width = 0;
    let mut last_space: Option<usize> = None;

    for (i, ch) in paragraph.char_indices() {
        let w = ch.width().unwrap_or(0);
        if row_width + w > width && i > row_start {
            let break_at = match last_space {
                Some(space) if space > row_start => space,
                _ => i,
            };
            rows.push(base + row_start..base + break_at);
            row_start = break_at;
            row_width = paragraph[row_start..i]
                .chars()
                .map(|c| c.width().unwrap_or(0))
                .sum();
            last_space = None;
        }
        row_width += w;
        if ch.is_whitespace() {
            last_space = Some(i + ch.len_utf8());
        }
    }

    rows.push(base + row_start..base + paragraph.len());
}

/// Lay out `count` lines starting at `from`, stacking them below line
/// `from - 1`.
///
/// Recomputes column extents, wrapped row counts and spans. Returns the
/// position after the last line laid out.
pub fn layout_lines<M: LineMeasurer + ?Sized>(
    lines: &mut [RenderedLine],
    from: usize,
    count: usize,
    params: &LayoutParams,
    measurer: &M,
) -> usize {
    let end = from.saturating_add(count).min(lines.len());
    if from >= end {
        return end;
    }

    let mut top = if from == 0 {
        LineOffset::new(0)
    } else {
        lines[from - 1]
            .bottom()
            .saturating_add(params.line_spacing as usize)
    };

    for line in &mut lines[from..end] {
        let mut rows = 1;
        for role in ColumnRole::ALL {
            let (x, width) = params.column_extent(line, role);
            let column = line.column_mut(role);
            column.x = x;
            column.width = width;
            column.rows = if width == 0 {
                0
            } else {
                measurer.measure(&column.text, width)
            };
            if !column.hidden {
                rows = rows.max(column.rows);
            }
        }

        line.span = LineSpan::new(top, LineHeight::from_rows(rows));
        line.dirty = false;
        top = line.bottom().saturating_add(params.line_spacing as usize);
    }

    end
}
