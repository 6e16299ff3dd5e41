//! Python environment configuration from TOML (`[environment]` section)

use serde::{Deserialize, Serialize};

/// Raw environment configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEnvironmentConfig {
    /// Interpreter used to create the virtual environment (name or path)
    pub python: String,
    /// Virtual environment directory, relative to the generation root
    pub venv_dir: String,
    /// Packages installed into the virtual environment
    pub packages: Vec<String>,
}

impl Default for FileEnvironmentConfig {
    fn default() -> Self {
        Self {
            python: "python3".to_string(),
            venv_dir: ".venv".to_string(),
            packages: vec![
                "pytest".to_string(),
                "pytest-json-report".to_string(),
                "pyright".to_string(),
            ],
        }
    }
}
