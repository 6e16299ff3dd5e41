//! Domain source port
//!
//! Builds the [`RuntimeDomain`] from a description of the guarded API.

use async_trait::async_trait;
use thiserror::Error;
use toolguard_domain::{DomainError, RuntimeDomain};

#[derive(Error, Debug)]
pub enum DomainSourceError {
    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Function list is empty")]
    EmptyFunctionList,

    #[error("Function {function} is not in a declared module (declared: {declared})")]
    UndeclaredModule { function: String, declared: String },

    #[error("API document declares no operations")]
    NoOperations,

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Port for building the runtime domain
#[async_trait]
pub trait DomainSourcePort: Send + Sync {
    /// Short description of the source, for logs
    fn describe(&self) -> String;

    /// Build the domain of application `app_name`
    async fn load(&self, app_name: &str) -> Result<RuntimeDomain, DomainSourceError>;
}
