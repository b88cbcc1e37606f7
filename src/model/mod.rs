//! Domain model types (pure).
//!
//! All types in this module are plain data; the only behaviour is validation
//! in smart constructors and the search matcher.

pub mod error;
pub mod identifiers;
pub mod log_entry;
pub mod search;

// Re-export for convenience
pub use identifiers::{InvalidSenderId, LogIndex, SenderId};
pub use log_entry::{
    ChatMessage, EntryContent, FileDirection, FileStatus, FileTransfer, LogEntry, MessageState,
    Severity, SystemMessage, SystemMessageKind,
};
pub use search::{
    MatchSpan, SearchDirection, SearchError, SearchFilter, SearchHit, SearchParams, SearchPeriod,
    SearchPos, SearchQuery,
};
