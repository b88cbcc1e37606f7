//! chatlog-view
//!
//! A bounded rendered window over an append-only, unbounded chat log, with
//! scrolling, text selection and whole-log search.
//!
//! The engine is pure and single-threaded: the host feeds it log
//! notifications and pointer input, and drives long relayouts with
//! [`state::ChatView::tick`]. The backing store is anything implementing
//! [`source::IndexedLog`].

pub mod config;
pub mod logging;
pub mod model;
pub mod parser;
pub mod source;
pub mod state;
pub mod view_state;

#[cfg(test)]
mod test_harness;
