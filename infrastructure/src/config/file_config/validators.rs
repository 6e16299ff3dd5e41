//! Validator configuration from TOML (`[checker]` and `[runner]` sections)

use serde::{Deserialize, Serialize};

/// Raw static checker configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCheckerConfig {
    /// Checker executable; defaults to `pyright` inside the virtual environment
    pub command: Option<String>,
    /// Timeout of one checker run in seconds
    pub timeout_secs: Option<u64>,
}

/// Raw test runner configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRunnerConfig {
    /// Timeout of one test run in seconds
    pub timeout_secs: u64,
}

impl Default for FileRunnerConfig {
    fn default() -> Self {
        Self { timeout_secs: 300 }
    }
}
