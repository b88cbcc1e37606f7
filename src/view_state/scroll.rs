//! Viewport state and the scroll anchor preserved across relayout.

use super::rendered_line::LineKey;
use super::store::RenderedLineStore;
use super::types::{LineOffset, ViewportDimensions};

/// Semantic scroll intent captured before a relayout.
///
/// - `Bottom`: stay pinned to the live tail
/// - `Line`: keep a specific line at a fixed viewport row
///
/// # Resolution
/// `resolve()` turns the anchor back into an absolute offset using the
/// current layout. A `Line` anchor whose line is gone resolves to `None`
/// and the caller keeps its clamped offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAnchor {
    /// View from the very bottom.
    Bottom,

    /// Keep `key` so that its top sits `viewport_row` rows below the viewport
    /// top. Negative when the line starts above the viewport.
    Line {
        /// Anchored line.
        key: LineKey,
        /// Row of the line's top relative to the viewport top.
        viewport_row: i64,
    },
}

impl ScrollAnchor {
    /// Resolve to an absolute offset, clamped to the scrollable range.
    pub fn resolve(&self, store: &RenderedLineStore, viewport: &Viewport) -> Option<LineOffset> {
        match self {
            ScrollAnchor::Bottom => Some(viewport.max_offset()),
            ScrollAnchor::Line { key, viewport_row } => {
                let line = store.get_by_key(*key)?;
                let target = (line.top().get() as i64).saturating_sub(*viewport_row).max(0);
                Some(viewport.clamp(LineOffset::new(target as usize)))
            }
        }
    }
}

/// Scroll state of the view: where the viewport sits over the laid-out lines.
///
/// # Clamping Behavior
/// The offset is always within `[0, max(0, content_height - height)]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    offset: LineOffset,
    dimensions: ViewportDimensions,
    content_height: usize,
}

impl Viewport {
    /// New viewport at the top.
    pub fn new(dimensions: ViewportDimensions) -> Self {
        Self {
            offset: LineOffset::new(0),
            dimensions,
            content_height: 0,
        }
    }

    /// Current scroll offset.
    pub fn offset(&self) -> LineOffset {
        self.offset
    }

    /// Current dimensions.
    pub fn dimensions(&self) -> ViewportDimensions {
        self.dimensions
    }

    /// Height of the laid-out content the viewport scrolls over.
    pub fn content_height(&self) -> usize {
        self.content_height
    }

    /// Largest valid offset.
    pub fn max_offset(&self) -> LineOffset {
        LineOffset::new(
            self.content_height
                .saturating_sub(self.dimensions.height as usize),
        )
    }

    /// Clamp an offset into the scrollable range.
    pub fn clamp(&self, offset: LineOffset) -> LineOffset {
        offset.min(self.max_offset())
    }

    /// Move to `offset`, clamped. Returns the offset actually applied.
    pub fn scroll_to(&mut self, offset: LineOffset) -> LineOffset {
        self.offset = self.clamp(offset);
        self.offset
    }

    /// Move by a signed number of rows, clamped.
    pub fn scroll_by(&mut self, delta: i64) -> LineOffset {
        let target = (self.offset.get() as i64).saturating_add(delta).max(0);
        self.scroll_to(LineOffset::new(target as usize))
    }

    /// Jump to the bottom.
    pub fn scroll_to_bottom(&mut self) {
        self.offset = self.max_offset();
    }

    /// Update content height; the offset is re-clamped.
    pub fn set_content_height(&mut self, height: usize) {
        self.content_height = height;
        self.offset = self.clamp(self.offset);
    }

    /// Update dimensions; the offset is re-clamped.
    pub fn resize(&mut self, dimensions: ViewportDimensions) {
        self.dimensions = dimensions;
        self.offset = self.clamp(self.offset);
    }

    /// True at the top of the content.
    pub fn is_at_top(&self) -> bool {
        self.offset.get() == 0
    }

    /// True when pinned to the bottom (or when everything fits).
    pub fn is_at_bottom(&self) -> bool {
        self.offset >= self.max_offset()
    }

    /// Whether any part of `[top, bottom)` is inside the viewport.
    pub fn intersects(&self, top: LineOffset, bottom: LineOffset) -> bool {
        let view_top = self.offset.get();
        let view_bottom = view_top + self.dimensions.height as usize;
        top.get() < view_bottom && bottom.get() > view_top
    }

    /// Capture the current scroll intent against `store`.
    ///
    /// Pinned to bottom wins; otherwise the first line intersecting the
    /// viewport is anchored. An empty view anchors to the bottom.
    pub fn capture_anchor(&self, store: &RenderedLineStore) -> ScrollAnchor {
        if self.is_at_bottom() {
            return ScrollAnchor::Bottom;
        }
        match store.first_at_or_below(self.offset) {
            Some(line) => ScrollAnchor::Line {
                key: line.key(),
                viewport_row: line.top().get() as i64 - self.offset.get() as i64,
            },
            None => ScrollAnchor::Bottom,
        }
    }
}
