//! Core identifier newtypes.
//!
//! `LogIndex` addresses one logical entry of the backing log. `SenderId`
//! identifies who produced it. Both are cheap to copy/clone and totally ordered
//! so they can key ordered maps.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of one entry in the backing log.
///
/// Indices are dense and monotonically increasing. An index is never reused
/// for a different entry during the lifetime of a log.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct LogIndex(u64);

impl LogIndex {
    /// Create a new LogIndex from a raw value.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw value.
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// The index directly after this one.
    pub fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// The index directly before this one, or `None` at zero.
    pub fn prev(&self) -> Option<Self> {
        self.0.checked_sub(1).map(Self)
    }

    /// Add a signed offset, saturating at zero and `u64::MAX`.
    pub fn saturating_offset(&self, delta: i64) -> Self {
        Self(self.0.saturating_add_signed(delta))
    }

    /// Number of indices in `[self, end)`, zero when `end <= self`.
    pub fn distance_to(&self, end: LogIndex) -> u64 {
        end.0.saturating_sub(self.0)
    }
}

impl From<u64> for LogIndex {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for LogIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of the participant that produced an entry.
/// Use the smart constructor; the raw constructor is not exported.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SenderId(String);

impl SenderId {
    /// Smart constructor: validates a non-empty identifier.
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidSenderId> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            Err(InvalidSenderId::Empty)
        } else {
            Ok(Self(raw))
        }
    }

    /// Borrow the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SenderId {
    type Error = InvalidSenderId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SenderId> for String {
    fn from(id: SenderId) -> Self {
        id.0
    }
}

impl fmt::Display for SenderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error returned by [`SenderId::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidSenderId {
    /// The identifier was empty or whitespace.
    #[error("Sender ID cannot be empty")]
    Empty,
}
