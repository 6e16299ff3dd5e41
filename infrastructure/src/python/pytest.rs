//! Test runner adapter backed by pytest and pytest-json-report

use super::environment::venv_executable;
use super::process::ProcessSpec;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use toolguard_application::{RunnerError, TestRunnerPort};
use toolguard_domain::{FileTwin, TestReport};
use tracing::{debug, warn};

/// Runs `python -m pytest` from the provisioned virtual environment
pub struct PytestRunner {
    venv_dir: String,
    timeout: Duration,
}

impl PytestRunner {
    pub fn new(venv_dir: impl Into<String>, timeout: Duration) -> Self {
        Self {
            venv_dir: venv_dir.into(),
            timeout,
        }
    }

    fn python(&self, folder: &Path) -> PathBuf {
        venv_executable(&folder.join(&self.venv_dir), "python")
    }
}

/// Parse the report pytest wrote and rewrite it pretty-printed in place.
pub fn normalize_report(folder: &Path, report_file: &str) -> Result<TestReport, RunnerError> {
    let twin = FileTwin::new(report_file, "");
    let path = twin.path_in(folder);
    if !path.exists() {
        return Err(RunnerError::MissingReport(path));
    }

    let raw = FileTwin::load(folder, report_file)?;
    let report = TestReport::from_json(&raw.content)
        .map_err(|e| RunnerError::InvalidReport(format!("{}: {e}", path.display())))?;

    let pretty = report
        .to_pretty_json()
        .map_err(|e| RunnerError::InvalidReport(e.to_string()))?;
    FileTwin::new(report_file, pretty).save(folder)?;
    Ok(report)
}

#[async_trait]
impl TestRunnerPort for PytestRunner {
    async fn run(
        &self,
        folder: &Path,
        test_file: &str,
        report_file: &str,
    ) -> Result<TestReport, RunnerError> {
        let report_path = FileTwin::new(report_file, "").path_in(folder);
        if let Some(parent) = report_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        // A stale report from an earlier run must not be mistaken for this one
        if report_path.exists() {
            std::fs::remove_file(&report_path)?;
        }

        let python = self.python(folder);
        let report_arg = format!("--json-report-file={report_file}");
        let output = ProcessSpec::new(&python, folder, self.timeout)
            .arg("-m")
            .arg("pytest")
            .arg(test_file)
            .arg("--json-report")
            .arg(&report_arg)
            .arg("-q")
            .arg("-p")
            .arg("no:cacheprovider")
            .env("PYTHONPATH", folder)
            .env("PYTHONDONTWRITEBYTECODE", "1")
            .run()
            .await?;
        debug!("pytest {} exited with {:?}", test_file, output.exit_code);

        normalize_report(folder, report_file).inspect_err(|e| {
            warn!("No usable report for {}: {}\n{}", test_file, e, output.combined());
        })
    }
}
