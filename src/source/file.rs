//! JSONL file loading into a [`MemoryLog`].

use crate::model::error::{InputError, ParseError};
use crate::parser::parse_entry;
use crate::source::MemoryLog;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, warn};

/// Result of loading a log file: the parsed log plus the lines that were
/// skipped.
#[derive(Debug)]
pub struct LoadedLog {
    /// Successfully parsed entries, in file order.
    pub log: MemoryLog,
    /// Non-fatal parse failures.
    pub errors: Vec<ParseError>,
}

/// Load a JSONL log file.
///
/// Blank lines are ignored. Malformed lines are logged, collected in
/// `errors`, and skipped.
///
/// # Errors
///
/// Returns `InputError::FileNotFound` if the file does not exist.
/// Returns `InputError::Io` for other I/O errors.
pub fn load_log(path: impl AsRef<Path>) -> Result<LoadedLog, InputError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(InputError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let reader = BufReader::new(File::open(path)?);
    let mut log = MemoryLog::new();
    let mut errors = Vec::new();

    for (offset, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        match parse_entry(&line, offset + 1) {
            Ok(entry) => {
                log.append(entry);
            }
            Err(err) => {
                warn!(line = err.line(), error = %err, "Skipping malformed log line");
                errors.push(err);
            }
        }
    }

    debug!(
        path = %path.display(),
        entries = log.len(),
        skipped = errors.len(),
        "Loaded log file"
    );

    Ok(LoadedLog { log, errors })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::IndexedLog;
    use std::fs;

    #[test]
    fn missing_file_is_reported() {
        let result = load_log("/nonexistent/chatlog-view/log.jsonl");
        assert!(matches!(result, Err(InputError::FileNotFound { .. })));
    }

    #[test]
    fn malformed_lines_are_skipped_not_fatal() {
        let path = std::env::temp_dir().join("chatlog_view_file_source_test.jsonl");
        let content = concat!(
            r#"{"timestamp":"2024-05-01T12:00:00Z","sender":"a","type":"message","text":"one"}"#,
            "\n",
            "garbage\n",
            "\n",
            r#"{"timestamp":"2024-05-01T12:01:00Z","sender":"b","type":"message","text":"two"}"#,
            "\n",
        );
        fs::write(&path, content).expect("write fixture");

        let loaded = load_log(&path).expect("load");
        assert_eq!(loaded.log.len(), 2);
        assert_eq!(loaded.errors.len(), 1);
        assert_eq!(loaded.errors[0].line(), 2);
        assert_eq!(loaded.log.next_index().get(), 2);

        fs::remove_file(path).ok();
    }
}
