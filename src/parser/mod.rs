//! JSONL parser for chat log entries.
//!
//! This module provides pure parsing functions for converting JSONL lines
//! into validated `LogEntry` values. One line is one entry:
//!
//! ```text
//! {"timestamp":"2024-05-01T12:00:00Z","sender":"alice","name":"Alice","type":"message","text":"hi"}
//! {"timestamp":"2024-05-01T12:01:00Z","sender":"bob","name":"Bob","type":"file","file_name":"a.pdf","size":10,"sent":5,"status":"transmitting","direction":"receiving"}
//! {"timestamp":"2024-05-01T12:02:00Z","sender":"bob","name":"Bob","type":"system","kind":"peer_name_changed","text":"Bob is now Robert"}
//! ```

use crate::model::error::ParseError;
use crate::model::{
    ChatMessage, EntryContent, FileDirection, FileStatus, FileTransfer, LogEntry, MessageState,
    SenderId, SystemMessage, SystemMessageKind,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Raw JSON structure for deserializing log entries.
#[derive(Debug, Deserialize)]
struct RawLogEntry {
    timestamp: String,
    sender: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(flatten)]
    content: RawContent,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RawContent {
    Message {
        text: String,
        #[serde(default)]
        action: bool,
        #[serde(default)]
        mention: bool,
        #[serde(default = "default_state")]
        state: MessageState,
    },
    File {
        file_name: String,
        #[serde(default)]
        size: u64,
        #[serde(default)]
        sent: u64,
        status: FileStatus,
        direction: FileDirection,
    },
    System {
        kind: SystemMessageKind,
        text: String,
    },
}

fn default_state() -> MessageState {
    MessageState::Complete
}

impl From<RawContent> for EntryContent {
    fn from(raw: RawContent) -> Self {
        match raw {
            RawContent::Message {
                text,
                action,
                mention,
                state,
            } => EntryContent::Message(ChatMessage {
                text,
                is_action: action,
                self_mention: mention,
                state,
            }),
            RawContent::File {
                file_name,
                size,
                sent,
                status,
                direction,
            } => EntryContent::FileTransfer(FileTransfer {
                file_name,
                file_size: size,
                bytes_sent: sent,
                status,
                direction,
            }),
            RawContent::System { kind, text } => EntryContent::System(SystemMessage { kind, text }),
        }
    }
}

/// Parse one JSONL line into a `LogEntry`.
///
/// `line_number` is 1-based and only used for error reporting. A missing
/// `name` falls back to the sender identifier.
///
/// # Errors
///
/// Returns `ParseError` for malformed JSON, schema mismatches, non-RFC 3339
/// timestamps and empty senders.
pub fn parse_entry(raw: &str, line_number: usize) -> Result<LogEntry, ParseError> {
    let entry: RawLogEntry = serde_json::from_str(raw).map_err(|e| ParseError::InvalidJson {
        line: line_number,
        message: e.to_string(),
    })?;

    let timestamp = DateTime::parse_from_rfc3339(&entry.timestamp)
        .map_err(|_| ParseError::InvalidTimestamp {
            line: line_number,
            raw: entry.timestamp.clone(),
        })?
        .with_timezone(&Utc);

    let sender =
        SenderId::new(entry.sender).map_err(|_| ParseError::EmptySender { line: line_number })?;
    let display_name = entry.name.unwrap_or_else(|| sender.as_str().to_string());

    Ok(LogEntry::new(
        sender,
        display_name,
        timestamp,
        entry.content.into(),
    ))
}
