//! Log entry types.
//!
//! A `LogEntry` is one logical item of the backing log: a chat message, a
//! file-transfer event, or a system notice. The view never owns entries; it
//! reads them through [`crate::source::IndexedLog`] and materializes them as
//! rendered lines.

use crate::model::SenderId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ===== MessageState =====

/// Delivery state of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageState {
    /// Sent but not yet confirmed by the peer.
    #[default]
    Pending,
    /// Delivery failed.
    Broken,
    /// Delivery confirmed.
    Complete,
}

// ===== ChatMessage =====

/// Text message content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Message body.
    pub text: String,
    /// `/me`-style action message.
    pub is_action: bool,
    /// The message mentions the local user.
    pub self_mention: bool,
    /// Delivery state.
    pub state: MessageState,
}

impl ChatMessage {
    /// Plain, delivered message.
    pub fn delivered(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_action: false,
            self_mention: false,
            state: MessageState::Complete,
        }
    }

    /// Plain message still awaiting delivery confirmation.
    pub fn pending(text: impl Into<String>) -> Self {
        Self {
            state: MessageState::Pending,
            ..Self::delivered(text)
        }
    }
}

// ===== FileTransfer =====

/// Progress state of a file transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    /// Waiting for the peer to accept.
    Initializing,
    /// Paused by either side.
    Paused,
    /// Bytes are flowing.
    Transmitting,
    /// Failed.
    Broken,
    /// Canceled by either side.
    Canceled,
    /// Completed.
    Finished,
}

impl FileStatus {
    /// Transfers in these states are still in progress.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            FileStatus::Initializing | FileStatus::Paused | FileStatus::Transmitting
        )
    }

    /// Short label used in the rendered line.
    pub fn label(&self) -> &'static str {
        match self {
            FileStatus::Initializing => "waiting",
            FileStatus::Paused => "paused",
            FileStatus::Transmitting => "transferring",
            FileStatus::Broken => "failed",
            FileStatus::Canceled => "canceled",
            FileStatus::Finished => "done",
        }
    }
}

/// Direction of a file transfer relative to the local user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileDirection {
    /// Local user is sending.
    Sending,
    /// Local user is receiving.
    Receiving,
}

/// File transfer event content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTransfer {
    /// Name of the transferred file.
    pub file_name: String,
    /// Total size in bytes.
    pub file_size: u64,
    /// Bytes transferred so far.
    pub bytes_sent: u64,
    /// Transfer state.
    pub status: FileStatus,
    /// Transfer direction.
    pub direction: FileDirection,
}

impl FileTransfer {
    /// Completion percentage, 100 for empty files.
    pub fn percent(&self) -> u64 {
        if self.file_size == 0 {
            100
        } else {
            (self.bytes_sent.min(self.file_size) * 100) / self.file_size
        }
    }
}

// ===== SystemMessage =====

/// Kind of system notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemMessageKind {
    /// A file could not be sent.
    FileSendFailed,
    /// A message could not be sent.
    MessageSendFailed,
    /// A call ended unexpectedly.
    UnexpectedCallEnd,
    /// Someone joined a group.
    UserJoinedGroup,
    /// Someone left a group.
    UserLeftGroup,
    /// A peer changed their name.
    PeerNameChanged,
    /// A peer went online/offline.
    PeerStateChange,
    /// Group title changed.
    TitleChanged,
    /// History was cleared.
    Cleared,
    /// Outgoing call started.
    OutgoingCall,
    /// Incoming call.
    IncomingCall,
    /// Call ended normally.
    CallEnd,
}

/// Display severity of a system notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Informational notice.
    Info,
    /// Failure notice.
    Error,
}

impl SystemMessageKind {
    /// Map a notice kind to the severity it is displayed with.
    pub fn severity(&self) -> Severity {
        match self {
            SystemMessageKind::FileSendFailed
            | SystemMessageKind::MessageSendFailed
            | SystemMessageKind::UnexpectedCallEnd => Severity::Error,
            SystemMessageKind::UserJoinedGroup
            | SystemMessageKind::UserLeftGroup
            | SystemMessageKind::PeerNameChanged
            | SystemMessageKind::PeerStateChange
            | SystemMessageKind::TitleChanged
            | SystemMessageKind::Cleared
            | SystemMessageKind::OutgoingCall
            | SystemMessageKind::IncomingCall
            | SystemMessageKind::CallEnd => Severity::Info,
        }
    }
}

/// System notice content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemMessage {
    /// Notice kind.
    pub kind: SystemMessageKind,
    /// Human-readable text.
    pub text: String,
}

// ===== EntryContent =====

/// Payload of a log entry - exactly one variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryContent {
    /// Chat message.
    Message(ChatMessage),
    /// File transfer event.
    FileTransfer(FileTransfer),
    /// System notice.
    System(SystemMessage),
}

// ===== LogEntry =====

/// One logical entry of the backing log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    sender: SenderId,
    display_name: String,
    timestamp: DateTime<Utc>,
    content: EntryContent,
}

impl LogEntry {
    /// Create a new log entry.
    pub fn new(
        sender: SenderId,
        display_name: impl Into<String>,
        timestamp: DateTime<Utc>,
        content: EntryContent,
    ) -> Self {
        Self {
            sender,
            display_name: display_name.into(),
            timestamp,
            content,
        }
    }

    // ===== Accessors (read-only) =====

    /// Who produced the entry.
    pub fn sender(&self) -> &SenderId {
        &self.sender
    }

    /// Name shown in the author column.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// When the entry was produced.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Calendar date the entry belongs to (UTC).
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    /// Entry payload.
    pub fn content(&self) -> &EntryContent {
        &self.content
    }

    /// Mutable payload, used by log stores to apply delivery/progress updates.
    pub fn content_mut(&mut self) -> &mut EntryContent {
        &mut self.content
    }

    /// Message body if this is a chat message.
    pub fn message_text(&self) -> Option<&str> {
        match &self.content {
            EntryContent::Message(message) => Some(&message.text),
            EntryContent::FileTransfer(_) | EntryContent::System(_) => None,
        }
    }

    /// Whether this entry is an action message.
    pub fn is_action(&self) -> bool {
        matches!(&self.content, EntryContent::Message(m) if m.is_action)
    }
}
