//! Static checker port

use super::test_runner::RunnerError;
use async_trait::async_trait;
use std::path::Path;
use toolguard_domain::TypeCheckReport;

/// Port for type-checking generated files before they are executed
#[async_trait]
pub trait StaticCheckerPort: Send + Sync {
    /// Check `files` (relative to `folder`). Type errors are reported in the
    /// returned [`TypeCheckReport`], not as `Err`.
    async fn check(&self, folder: &Path, files: &[String]) -> Result<TypeCheckReport, RunnerError>;
}
