//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted to application types where needed.

mod completion;
mod environment;
mod generation;
mod logging;
mod validators;

pub use completion::FileCompletionConfig;
pub use environment::FileEnvironmentConfig;
pub use generation::FileGenerationConfig;
pub use logging::FileLoggingConfig;
pub use validators::{FileCheckerConfig, FileRunnerConfig};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("generation.max_attempts cannot be 0")]
    ZeroAttempts,

    #[error("{0} cannot be 0")]
    InvalidTimeout(&'static str),

    #[error("completion.model cannot be empty")]
    EmptyModelName,

    #[error("environment.packages must not be empty")]
    NoPackages,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Repair loop and fan-out settings
    pub generation: FileGenerationConfig,
    /// Python virtual environment settings
    pub environment: FileEnvironmentConfig,
    /// Completion backend settings
    pub completion: FileCompletionConfig,
    /// Static checker settings
    pub checker: FileCheckerConfig,
    /// Test runner settings
    pub runner: FileRunnerConfig,
    /// Logging settings
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.generation.max_attempts == 0 {
            return Err(ConfigValidationError::ZeroAttempts);
        }

        // Timeouts of 0 seconds would fail every attempt
        if self.generation.attempt_timeout_secs == 0 {
            return Err(ConfigValidationError::InvalidTimeout("generation.attempt_timeout_secs"));
        }
        if self.completion.timeout_secs == 0 {
            return Err(ConfigValidationError::InvalidTimeout("completion.timeout_secs"));
        }
        if self.runner.timeout_secs == 0 {
            return Err(ConfigValidationError::InvalidTimeout("runner.timeout_secs"));
        }
        if let Some(0) = self.checker.timeout_secs {
            return Err(ConfigValidationError::InvalidTimeout("checker.timeout_secs"));
        }

        if self.completion.model.trim().is_empty() {
            return Err(ConfigValidationError::EmptyModelName);
        }

        if self.environment.packages.is_empty() {
            return Err(ConfigValidationError::NoPackages);
        }

        Ok(())
    }
}
