//! Search value types shared by the log store and the search cursor.
//!
//! `SearchQuery` is a validated, compiled phrase. `SearchPos` is the resumable
//! position the cursor keeps in the full log; `SearchHit` is what a single
//! forward/backward step returns.

use crate::model::LogIndex;
use chrono::NaiveDate;
use regex::{Regex, RegexBuilder};
use thiserror::Error;

// ===== SearchDirection =====

/// Direction of a search step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchDirection {
    /// Towards older entries.
    Up,
    /// Towards newer entries.
    Down,
}

// ===== SearchPeriod =====

/// Where a fresh search starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchPeriod {
    /// Forward from the first entry.
    FromBeginning,
    /// Backward from the end of the log.
    #[default]
    FromEnd,
    /// Forward from the first entry on or after the date.
    AfterDate(NaiveDate),
    /// Backward from the first entry on or after the date.
    BeforeDate(NaiveDate),
}

// ===== SearchFilter =====

/// Matching options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchFilter {
    /// Match letter case exactly.
    pub case_sensitive: bool,
    /// Only match whole words.
    pub whole_words: bool,
    /// Interpret the phrase as a regular expression.
    pub regex: bool,
}

/// Full parameter set of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchParams {
    /// Starting anchor for `start_search`.
    pub period: SearchPeriod,
    /// Matching options.
    pub filter: SearchFilter,
}

// ===== SearchError =====

/// Errors from building a search query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// The phrase was empty or whitespace only.
    #[error("Search phrase cannot be empty")]
    EmptyPhrase,

    /// The phrase did not compile.
    #[error("Invalid search pattern {phrase:?}: {reason}")]
    InvalidPattern {
        /// Phrase as typed.
        phrase: String,
        /// Compiler message.
        reason: String,
    },
}

// ===== SearchQuery =====

/// Validated, compiled search phrase. Never empty.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    phrase: String,
    params: SearchParams,
    matcher: Regex,
}

impl SearchQuery {
    /// Smart constructor: rejects empty phrases and invalid patterns.
    ///
    /// # Examples
    ///
    /// ```
    /// use chatlog_view::model::search::{SearchParams, SearchQuery};
    ///
    /// let query = SearchQuery::new("Hello", SearchParams::default()).unwrap();
    /// let spans = query.find_all("hello HELLO");
    /// assert_eq!(spans.len(), 2);
    /// assert!(SearchQuery::new("  ", SearchParams::default()).is_err());
    /// ```
    pub fn new(phrase: impl Into<String>, params: SearchParams) -> Result<Self, SearchError> {
        let phrase = phrase.into();
        if phrase.trim().is_empty() {
            return Err(SearchError::EmptyPhrase);
        }

        let mut pattern = if params.filter.regex {
            phrase.clone()
        } else {
            regex::escape(&phrase)
        };
        if params.filter.whole_words {
            pattern = format!(r"\b(?:{pattern})\b");
        }

        let matcher = RegexBuilder::new(&pattern)
            .case_insensitive(!params.filter.case_sensitive)
            .build()
            .map_err(|e| SearchError::InvalidPattern {
                phrase: phrase.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            phrase,
            params,
            matcher,
        })
    }

    /// Phrase as typed.
    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    /// Parameters the query was built with.
    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    /// All non-empty, non-overlapping matches in `text`, in order.
    pub fn find_all(&self, text: &str) -> Vec<MatchSpan> {
        self.matcher
            .find_iter(text)
            .filter(|m| !m.is_empty())
            .map(|m| MatchSpan::new(m.start(), m.len()))
            .collect()
    }
}

// ===== MatchSpan =====

/// Byte range of a match inside an entry's message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatchSpan {
    /// Byte offset of the first matched byte.
    pub start: usize,
    /// Length in bytes.
    pub len: usize,
}

impl MatchSpan {
    /// Create a new span.
    pub fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    /// Exclusive end offset.
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

// ===== SearchPos =====

/// Resumable search position in the full log.
///
/// The cursor sits inside entry `index`, directly after its `matches`-th
/// occurrence (1-based). `matches == 0` means before the first occurrence of
/// that entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchPos {
    /// Entry the cursor is in.
    pub index: LogIndex,
    /// Occurrences of that entry at or before the cursor.
    pub matches: usize,
}

impl SearchPos {
    /// Position before every occurrence of `index`.
    pub fn before(index: LogIndex) -> Self {
        Self { index, matches: 0 }
    }
}

// ===== SearchHit =====

/// Result of a successful search step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchHit {
    /// New cursor position (on the found occurrence).
    pub pos: SearchPos,
    /// Location of the occurrence in the entry's message text.
    pub span: MatchSpan,
}
