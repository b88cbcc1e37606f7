//! Global layout parameters and the column geometry derived from them.

use super::rendered_line::{ColumnRole, RenderedLine};

/// Global parameters that affect line layout.
///
/// Used for invalidation: if current params != last layout params,
/// every line needs a relayout.
///
/// # Equality Semantics
/// Two LayoutParams are equal if they would produce identical layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutParams {
    /// Viewport width in columns.
    pub width: u16,
    /// Width reserved for the author column.
    pub name_width: u16,
    /// Width reserved for the timestamp column.
    pub timestamp_width: u16,
    /// Empty rows between consecutive lines.
    pub line_spacing: u16,
}

impl LayoutParams {
    /// Create new layout params.
    pub fn new(width: u16, name_width: u16, timestamp_width: u16, line_spacing: u16) -> Self {
        Self {
            width,
            name_width,
            timestamp_width,
            line_spacing,
        }
    }

    /// Same params at a different viewport width.
    pub fn with_width(self, width: u16) -> Self {
        Self { width, ..self }
    }

    /// Horizontal extent `(x, width)` of a column.
    ///
    /// Columns are separated by one blank cell. The content column takes what
    /// is left and never shrinks below one cell. Separators span the full
    /// width in their content column.
    pub fn column_extent(&self, line: &RenderedLine, role: ColumnRole) -> (u16, u16) {
        if line.is_separator() {
            return match role {
                ColumnRole::Content => (0, self.width.max(1)),
                ColumnRole::Author | ColumnRole::Timestamp => (0, 0),
            };
        }

        let content_x = self.name_width.saturating_add(1);
        let content_width = self
            .width
            .saturating_sub(self.name_width)
            .saturating_sub(self.timestamp_width)
            .saturating_sub(2)
            .max(1);

        match role {
            ColumnRole::Author => (0, self.name_width),
            ColumnRole::Content => (content_x, content_width),
            ColumnRole::Timestamp => (
                content_x.saturating_add(content_width).saturating_add(1),
                self.timestamp_width,
            ),
        }
    }
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self::new(80, 12, 8, 1)
    }
}
