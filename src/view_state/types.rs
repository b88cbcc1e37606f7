//! Row and cell newtypes shared by layout, scrolling and hit-testing.

/// Rows occupied by a laid-out line; never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LineHeight(u16);

/// A zero height was passed to [`LineHeight::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("line height must be at least one row (got {0})")]
pub struct InvalidLineHeight(pub u16);

impl LineHeight {
    /// A single row.
    pub const ONE: Self = Self(1);

    /// Checked constructor.
    pub fn new(rows: u16) -> Result<Self, InvalidLineHeight> {
        match rows {
            0 => Err(InvalidLineHeight(0)),
            n => Ok(Self(n)),
        }
    }

    /// Build from a row count, clamping into `1..=u16::MAX`.
    pub fn from_rows(rows: usize) -> Self {
        Self(rows.clamp(1, u16::MAX as usize) as u16)
    }

    /// Row count.
    pub fn get(&self) -> u16 {
        self.0
    }
}

impl Default for LineHeight {
    fn default() -> Self {
        Self::ONE
    }
}

/// Row index into the laid-out content, counted from its top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct LineOffset(usize);

impl LineOffset {
    /// Wrap a raw row index.
    pub fn new(row: usize) -> Self {
        Self(row)
    }

    /// Raw row index.
    pub fn get(&self) -> usize {
        self.0
    }

    /// `self + rows`, saturating.
    pub fn saturating_add(&self, rows: usize) -> Self {
        Self(self.0.saturating_add(rows))
    }
}

/// Vertical bounding interval `[top, top + height)` of a rendered line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineSpan {
    /// First row covered by the line.
    pub top: LineOffset,
    /// Number of rows covered.
    pub height: LineHeight,
}

impl LineSpan {
    /// Span of `height` rows starting at `top`.
    pub fn new(top: LineOffset, height: LineHeight) -> Self {
        Self { top, height }
    }

    /// One past the last covered row.
    pub fn bottom(&self) -> LineOffset {
        self.top.saturating_add(self.height.get() as usize)
    }

    /// Whether `y` lies inside the span.
    pub fn contains(&self, y: LineOffset) -> bool {
        y >= self.top && y < self.bottom()
    }
}

/// Visible area, in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportDimensions {
    /// Columns.
    pub width: u16,
    /// Rows.
    pub height: u16,
}

impl ViewportDimensions {
    /// `width` x `height` cells.
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

impl Default for ViewportDimensions {
    fn default() -> Self {
        Self::new(80, 24)
    }
}

/// Pointer position relative to the viewport's top-left corner.
///
/// `y` may be negative or beyond the viewport height while dragging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerPos {
    /// Column.
    pub x: u16,
    /// Row; negative above the viewport.
    pub y: i32,
}

impl PointerPos {
    /// Position at column `x`, row `y`.
    pub fn new(x: u16, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance, used for the drag threshold.
    pub fn manhattan_distance(&self, other: PointerPos) -> u32 {
        (self.x as i32 - other.x as i32).unsigned_abs() + (self.y - other.y).unsigned_abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_height_rejects_zero() {
        assert_eq!(LineHeight::new(0), Err(InvalidLineHeight(0)));
        assert_eq!(LineHeight::new(3).unwrap().get(), 3);
    }

    #[test]
    fn line_height_from_rows_clamps() {
        assert_eq!(LineHeight::from_rows(0), LineHeight::ONE);
        assert_eq!(LineHeight::from_rows(1_000_000).get(), u16::MAX);
    }

    #[test]
    fn span_bottom_and_contains() {
        let span = LineSpan::new(LineOffset::new(10), LineHeight::new(3).unwrap());
        assert_eq!(span.bottom(), LineOffset::new(13));
        assert!(span.contains(LineOffset::new(10)));
        assert!(span.contains(LineOffset::new(12)));
        assert!(!span.contains(LineOffset::new(13)));
        assert!(!span.contains(LineOffset::new(9)));
    }

    #[test]
    fn pointer_distance_is_manhattan() {
        let a = PointerPos::new(2, -1);
        let b = PointerPos::new(5, 3);
        assert_eq!(a.manhattan_distance(b), 7);
    }
}
