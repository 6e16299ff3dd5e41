//! Test runner port
//!
//! Runs a generated test suite and returns the normalized report.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use toolguard_domain::TestReport;

/// Errors from running an external validator (test runner or static checker)
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Failed to spawn {command}: {message}")]
    Spawn { command: String, message: String },

    #[error("{command} timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    #[error("Report not written: {}", .0.display())]
    MissingReport(PathBuf),

    #[error("Invalid report: {0}")]
    InvalidReport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Port for running a test suite
#[async_trait]
pub trait TestRunnerPort: Send + Sync {
    /// Run `test_file` inside `folder`, writing the JSON report to `report_file`.
    ///
    /// Both paths are relative to `folder`. Test failures are not errors;
    /// they are reported in the returned [`TestReport`].
    async fn run(
        &self,
        folder: &Path,
        test_file: &str,
        report_file: &str,
    ) -> Result<TestReport, RunnerError>;
}
