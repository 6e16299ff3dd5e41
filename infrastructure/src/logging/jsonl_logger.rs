//! JSONL file writer for generation events.
//!
//! Each [`AttemptEvent`] is serialized as a single JSON line carrying
//! `type`, `timestamp`, `tool` and `attempt`, appended through a buffered
//! writer. Runs against the same root accumulate in one file.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use toolguard_application::{AttemptEvent, AttemptLogger};
use tracing::warn;

/// Location of the attempt log relative to the generation root
pub const ATTEMPT_LOG_FILE: &str = "logs/generation.jsonl";

/// JSONL attempt logger that writes one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes on `Drop`.
pub struct JsonlAttemptLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlAttemptLogger {
    /// Open (or create) the log at the given path.
    ///
    /// Returns `None` if the file cannot be opened; generation then runs
    /// without an attempt log.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create attempt log directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open attempt log file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Open `<root>/logs/generation.jsonl`.
    pub fn in_root(root: &Path) -> Option<Self> {
        Self::new(root.join(ATTEMPT_LOG_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AttemptLogger for JsonlAttemptLogger {
    fn log(&self, event: AttemptEvent) {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        let mut record = match event.payload {
            serde_json::Value::Object(map) => map,
            other => {
                let mut map = serde_json::Map::new();
                map.insert("data".to_string(), other);
                map
            }
        };
        record.insert("type".to_string(), event.event_type.into());
        record.insert("timestamp".to_string(), timestamp.into());
        record.insert("tool".to_string(), event.tool_name.into());
        record.insert("attempt".to_string(), event.attempt.into());

        let Ok(line) = serde_json::to_string(&record) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlAttemptLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_writes_one_record_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let logger = JsonlAttemptLogger::in_root(dir.path()).unwrap();
        assert!(logger.path().ends_with("logs/generation.jsonl"));

        logger.log(AttemptEvent::new(
            "completion_request",
            "transfer",
            1,
            json!({"kind": "guard", "prompt": "Implement the guard"}),
        ));
        logger.log(AttemptEvent::new(
            "attempt_verdict",
            "transfer",
            1,
            json!({"phase": "success", "diagnostics": []}),
        ));
        let path = logger.path().to_path_buf();
        drop(logger);

        let records = read_lines(&path);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["type"], "completion_request");
        assert_eq!(records[0]["tool"], "transfer");
        assert_eq!(records[0]["attempt"], 1);
        assert_eq!(records[0]["kind"], "guard");
        assert!(records[0]["timestamp"].is_string());
        assert_eq!(records[1]["phase"], "success");
    }

    #[test]
    fn test_non_object_payload_is_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let logger = JsonlAttemptLogger::new(&path).unwrap();
        logger.log(AttemptEvent::new("completion_response", "refund", 2, json!("raw text")));
        drop(logger);

        let records = read_lines(&path);
        assert_eq!(records[0]["data"], "raw text");
        assert_eq!(records[0]["attempt"], 2);
    }

    #[test]
    fn test_runs_append_to_the_same_file() {
        let dir = tempfile::tempdir().unwrap();
        for attempt in 1..=2 {
            let logger = JsonlAttemptLogger::in_root(dir.path()).unwrap();
            logger.log(AttemptEvent::new("attempt_verdict", "transfer", attempt, json!({})));
        }

        let records = read_lines(&dir.path().join(ATTEMPT_LOG_FILE));
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["attempt"], 2);
    }

    #[test]
    fn test_unwritable_location_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("logs");
        std::fs::write(&blocker, "not a directory").unwrap();
        assert!(JsonlAttemptLogger::in_root(dir.path()).is_none());
    }
}
