//! Environment provisioner port
//!
//! Prepares the isolated Python environment that validators run in.

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("Python interpreter not found: {0}")]
    InterpreterNotFound(String),

    #[error("Failed to create virtual environment: {0}")]
    VenvCreation(String),

    #[error("Failed to install packages: {0}")]
    Install(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Port for provisioning the generation root
#[async_trait]
pub trait EnvironmentProvisionerPort: Send + Sync {
    /// Make `root` ready for validation of code in Python package `package`.
    ///
    /// Must be idempotent: provisioning an already provisioned root is cheap
    /// and leaves it unchanged.
    async fn provision(&self, root: &Path, package: &str) -> Result<(), ProvisionError>;
}
