//! Configuration file loading for toolguard
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `TOOLGUARD_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./toolguard.toml` or `./.toolguard.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/toolguard/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileCheckerConfig, FileCompletionConfig, FileConfig,
    FileEnvironmentConfig, FileGenerationConfig, FileLoggingConfig, FileRunnerConfig,
};
pub use loader::{ConfigLoader, ENV_PREFIX};
