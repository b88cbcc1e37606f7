//! Error types for chatlog-view.
//!
//! This module defines the error taxonomy for the fallible boundaries of the
//! crate using `thiserror`. Errors compose via `?` and `From` conversions.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level error returned by the binary
//!   - [`InputError`] - Log file reading failures (file not found, IO)
//!   - [`ParseError`] - JSONL parsing failures (malformed JSON, bad fields)
//!   - [`crate::config::ConfigError`] - Config loading and validation
//!   - [`crate::logging::LoggingError`] - Tracing subscriber setup
//!   - [`crate::model::search::SearchError`] - Invalid search phrases
//!
//! # Recovery Strategy
//!
//! The window engine itself never fails: out-of-range indices are clamped,
//! stale references become no-ops and an exhausted search is reported as an
//! event. Parse errors are **non-fatal**: malformed JSONL lines are logged and
//! skipped so the view stays usable with partial data.

use crate::config::ConfigError;
use crate::logging::LoggingError;
use crate::model::search::SearchError;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error.
///
/// All domain-specific error types convert into `AppError` via `From`, so the
/// binary can propagate everything with `?`.
///
/// # Examples
///
/// ```no_run
/// use chatlog_view::model::error::{AppError, InputError};
///
/// fn run_app() -> Result<(), AppError> {
///     // InputError automatically converts to AppError via From
///     let _input = read_log_file()?;
///     Ok(())
/// }
/// # fn read_log_file() -> Result<(), InputError> { Ok(()) }
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    /// Failed to read the log input. Fatal.
    #[error("Failed to read input: {0}")]
    InputRead(#[from] InputError),

    /// Configuration could not be loaded or is inconsistent. Fatal.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Tracing could not be initialised. Fatal.
    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    /// The requested search phrase is invalid.
    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    /// Writing output failed.
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

/// Errors encountered when reading a log file.
#[derive(Debug, Error)]
pub enum InputError {
    /// The specified log file does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use chatlog_view::model::error::InputError;
    ///
    /// let err = InputError::FileNotFound {
    ///     path: PathBuf::from("/tmp/missing.jsonl")
    /// };
    /// assert!(err.to_string().contains("/tmp/missing.jsonl"));
    /// ```
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was attempted.
        path: PathBuf,
    },

    /// Any other I/O failure (permissions, disk errors).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors encountered parsing one JSONL line into a `LogEntry`.
///
/// Every variant carries the 1-based line number so skipped lines can be
/// reported precisely.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The line is not valid JSON or does not match the entry schema.
    #[error("Line {line}: invalid JSON: {message}")]
    InvalidJson {
        /// 1-based line number.
        line: usize,
        /// serde_json's message.
        message: String,
    },

    /// The timestamp could not be parsed as RFC 3339.
    #[error("Line {line}: invalid timestamp {raw:?}")]
    InvalidTimestamp {
        /// 1-based line number.
        line: usize,
        /// Raw timestamp text.
        raw: String,
    },

    /// The sender identifier was empty.
    #[error("Line {line}: sender cannot be empty")]
    EmptySender {
        /// 1-based line number.
        line: usize,
    },
}

impl ParseError {
    /// Line number the error refers to.
    pub fn line(&self) -> usize {
        match self {
            ParseError::InvalidJson { line, .. }
            | ParseError::InvalidTimestamp { line, .. }
            | ParseError::EmptySender { line } => *line,
        }
    }
}
