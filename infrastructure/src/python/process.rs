//! Subprocess execution for the external validators

use std::ffi::OsStr;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use toolguard_application::RunnerError;
use tracing::debug;

/// Maximum output kept for diagnostics (64 KB)
const MAX_OUTPUT_SIZE: usize = 64 * 1024;

/// Captured result of a finished process
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Stdout and stderr combined and truncated, for error messages
    pub fn combined(&self) -> String {
        let mut combined = self.stdout.trim_end().to_string();
        let stderr = self.stderr.trim_end();
        if !stderr.is_empty() {
            if !combined.is_empty() {
                combined.push_str("\n--- stderr ---\n");
            }
            combined.push_str(stderr);
        }

        if combined.len() > MAX_OUTPUT_SIZE {
            let mut end = MAX_OUTPUT_SIZE;
            while !combined.is_char_boundary(end) {
                end -= 1;
            }
            combined.truncate(end);
            combined.push_str("\n... (output truncated)");
        }
        combined
    }
}

/// A command to run to completion with a timeout
pub struct ProcessSpec<'a> {
    pub program: &'a OsStr,
    pub args: Vec<&'a OsStr>,
    pub cwd: &'a Path,
    pub envs: Vec<(&'a str, &'a OsStr)>,
    pub timeout: Duration,
}

impl<'a> ProcessSpec<'a> {
    pub fn new(program: &'a (impl AsRef<OsStr> + ?Sized), cwd: &'a Path, timeout: Duration) -> Self {
        Self {
            program: program.as_ref(),
            args: Vec::new(),
            cwd,
            envs: Vec::new(),
            timeout,
        }
    }

    pub fn arg(mut self, arg: &'a (impl AsRef<OsStr> + ?Sized)) -> Self {
        self.args.push(arg.as_ref());
        self
    }

    pub fn env(mut self, key: &'a str, value: &'a (impl AsRef<OsStr> + ?Sized)) -> Self {
        self.envs.push((key, value.as_ref()));
        self
    }

    fn display(&self) -> String {
        let mut parts = vec![self.program.to_string_lossy().into_owned()];
        parts.extend(self.args.iter().map(|a| a.to_string_lossy().into_owned()));
        parts.join(" ")
    }

    /// Run the command, killing it if it outlives the timeout.
    ///
    /// A non-zero exit code is not an error; callers read the verdict from
    /// the output.
    pub async fn run(self) -> Result<CommandOutput, RunnerError> {
        let command_line = self.display();
        debug!("Running {} in {}", command_line, self.cwd.display());

        let mut cmd = Command::new(self.program);
        cmd.args(&self.args)
            .current_dir(self.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        for (key, value) in &self.envs {
            cmd.env(key, value);
        }

        // Linux: request kernel to send SIGTERM to child when parent dies.
        // This catches cases where Drop doesn't run (SIGKILL, OOM kill).
        #[cfg(target_os = "linux")]
        unsafe {
            cmd.pre_exec(|| {
                libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM);
                Ok(())
            });
        }

        let start = Instant::now();
        let child = cmd.spawn().map_err(|e| RunnerError::Spawn {
            command: command_line.clone(),
            message: e.to_string(),
        })?;

        // Dropping the wait future on timeout kills the child (kill_on_drop)
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(RunnerError::Timeout {
                    command: command_line,
                    timeout: self.timeout,
                });
            }
        };

        let output = CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            duration_ms: start.elapsed().as_millis() as u64,
        };
        debug!(
            "{} exited with {:?} after {}ms",
            command_line, output.exit_code, output.duration_ms
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_output() {
        let output = CommandOutput {
            exit_code: Some(1),
            stdout: "collected 0 items\n".to_string(),
            stderr: "ImportError\n".to_string(),
            duration_ms: 5,
        };
        assert!(!output.success());
        assert_eq!(output.combined(), "collected 0 items\n--- stderr ---\nImportError");
    }

    #[test]
    fn test_combined_output_truncates() {
        let output = CommandOutput {
            exit_code: Some(0),
            stdout: "x".repeat(MAX_OUTPUT_SIZE + 10),
            stderr: String::new(),
            duration_ms: 5,
        };
        assert!(output.combined().ends_with("... (output truncated)"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_captures_output_and_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let output = ProcessSpec::new("sh", dir.path(), Duration::from_secs(10))
            .arg("-c")
            .arg("echo $GREETING; exit 3")
            .env("GREETING", "hello")
            .run()
            .await
            .unwrap();

        assert_eq!(output.exit_code, Some(3));
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let err = ProcessSpec::new("sleep", dir.path(), Duration::from_millis(50))
            .arg("5")
            .run()
            .await
            .unwrap_err();

        assert!(matches!(err, RunnerError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_spawn_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = ProcessSpec::new("definitely-not-a-real-binary-xyz", dir.path(), Duration::from_secs(1))
            .run()
            .await
            .unwrap_err();

        assert!(matches!(err, RunnerError::Spawn { .. }));
    }
}
