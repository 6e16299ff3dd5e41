//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw logging configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Directory for daily-rolling operation logs (unset = stderr only)
    pub dir: Option<PathBuf>,
    /// Write the JSONL attempt log under `<root>/logs/`
    pub attempt_log: bool,
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        Self {
            dir: None,
            attempt_log: true,
        }
    }
}
