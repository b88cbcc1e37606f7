//! View-state layer - materialized lines, layout, scrolling and hit-testing
//!
//! This module holds everything the window engine needs to know about lines
//! that are currently materialized. It never talks to the backing log.
//!
//! # Module Structure
//!
//! - `types`: Core newtypes (LineHeight, LineOffset, LineSpan, ViewportDimensions, PointerPos)
//! - `rendered_line`: RenderedLine, LineKey ordering, tagged LineKind
//! - `store`: RenderedLineStore - ordered container with index and position lookups
//! - `layout_params`: LayoutParams - global layout parameters and column geometry
//! - `layout`: LineMeasurer trait, TextMeasurer, the layout pass
//! - `scroll`: Viewport and ScrollAnchor
//! - `hit_test`: HitTestResult - result of pointer hit-testing
//! - `renderer`: LogEntry → RenderedLine and in-place updates

pub mod layout;
pub mod layout_params;
pub mod rendered_line;
pub mod renderer;
pub mod scroll;
pub mod store;
pub mod types;

pub use hit_test::HitTestResult;
pub use layout::{LineMeasurer, TextMeasurer};
pub use layout_params::LayoutParams;
pub use rendered_line::{ColumnRole, ContentColumn, LineKey, LineKind, MessageKind, RenderedLine, Slot};
pub use renderer::RenderOptions;
pub use scroll::{ScrollAnchor, Viewport};
pub use store::RenderedLineStore;
pub use types::{LineHeight, LineOffset, LineSpan, PointerPos, ViewportDimensions};
