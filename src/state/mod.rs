//! View state machines (pure).
//!
//! Everything here is driven through `&mut self` calls and [`ChatView::tick`];
//! there is no I/O and no threading, so every transition is testable headless.

pub mod chat_view;
pub mod continuation;
pub mod events;
pub mod relayout;
pub mod search;
pub mod selection;
pub mod window;

// Re-export for convenience
pub use chat_view::{ChatView, ChatViewOptions};
pub use continuation::{ContinuationQueue, PendingContinuation};
pub use events::{EventQueue, ViewEvent};
pub use relayout::RelayoutJob;
pub use search::{SearchCursor, SearchOutcome};
pub use selection::{SelectionModel, SelectionState};
pub use window::{clamped_add, TypingLine, WindowChange, WindowController, WindowSettings};
