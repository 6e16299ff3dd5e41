//! Static checker adapter backed by pyright

use super::environment::venv_executable;
use super::process::ProcessSpec;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use toolguard_application::{RunnerError, StaticCheckerPort};
use toolguard_domain::TypeCheckReport;
use tracing::debug;

/// Runs `pyright --outputjson` over generated files
pub struct PyrightChecker {
    /// Explicit executable; `None` uses `pyright` from the virtual environment
    command: Option<String>,
    venv_dir: String,
    timeout: Duration,
}

impl PyrightChecker {
    pub fn new(command: Option<String>, venv_dir: impl Into<String>, timeout: Duration) -> Self {
        Self {
            command,
            venv_dir: venv_dir.into(),
            timeout,
        }
    }

    fn executable(&self, folder: &Path) -> PathBuf {
        match &self.command {
            Some(command) => PathBuf::from(command),
            None => venv_executable(&folder.join(&self.venv_dir), "pyright"),
        }
    }
}

/// Parse pyright's JSON output, which is written to stdout on any exit code.
pub fn parse_output(stdout: &str, fallback: &str) -> Result<TypeCheckReport, RunnerError> {
    // The first run may print a download notice before the JSON document
    let json = stdout.find('{').map(|start| &stdout[start..]).unwrap_or(stdout);
    TypeCheckReport::from_json(json).map_err(|e| {
        RunnerError::InvalidReport(if fallback.is_empty() {
            e.to_string()
        } else {
            format!("{e}\n{fallback}")
        })
    })
}

#[async_trait]
impl StaticCheckerPort for PyrightChecker {
    async fn check(&self, folder: &Path, files: &[String]) -> Result<TypeCheckReport, RunnerError> {
        let executable = self.executable(folder);
        let mut spec = ProcessSpec::new(&executable, folder, self.timeout).arg("--outputjson");
        for file in files {
            spec = spec.arg(file);
        }
        let output = spec.run().await?;

        let report = parse_output(&output.stdout, output.stderr.trim())?;
        debug!(
            "pyright: {} error(s), {} warning(s) in {} file(s)",
            report.summary.error_count, report.summary.warning_count, report.summary.files_analyzed
        );
        Ok(report)
    }
}
