//! Infrastructure layer for toolguard
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod completion;
pub mod config;
pub mod domain_sources;
pub mod logging;
pub mod python;

// Re-export commonly used types
pub use completion::OpenAiCompletionGateway;
pub use config::{
    ConfigLoader, ConfigValidationError, FileCheckerConfig, FileCompletionConfig, FileConfig,
    FileEnvironmentConfig, FileGenerationConfig, FileLoggingConfig, FileRunnerConfig,
};
pub use domain_sources::{FunctionListSource, OpenApiSource};
pub use logging::JsonlAttemptLogger;
pub use python::{PyrightChecker, PytestRunner, VenvProvisioner};
