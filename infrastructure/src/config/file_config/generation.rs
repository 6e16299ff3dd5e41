//! Generation configuration from TOML (`[generation]` section)

use serde::{Deserialize, Serialize};
use std::time::Duration;
use toolguard_application::GenerationParams;

/// Raw generation configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGenerationConfig {
    /// Attempts per tool before giving up
    pub max_attempts: u32,
    /// Upper bound on one attempt, in seconds
    pub attempt_timeout_secs: u64,
    /// Generators running at once (unset = all tools at once)
    pub max_concurrency: Option<usize>,
}

impl Default for FileGenerationConfig {
    fn default() -> Self {
        let params = GenerationParams::default();
        Self {
            max_attempts: params.max_attempts,
            attempt_timeout_secs: params.attempt_timeout.as_secs(),
            max_concurrency: params.max_concurrency,
        }
    }
}

impl FileGenerationConfig {
    pub fn to_params(&self) -> GenerationParams {
        GenerationParams::default()
            .with_max_attempts(self.max_attempts)
            .with_attempt_timeout(Duration::from_secs(self.attempt_timeout_secs))
            .with_max_concurrency(self.max_concurrency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_params() {
        let toml_str = r#"
[generation]
max_attempts = 5
attempt_timeout_secs = 120
max_concurrency = 2
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        let params = config.generation.to_params();
        assert_eq!(params.max_attempts, 5);
        assert_eq!(params.attempt_timeout, Duration::from_secs(120));
        assert_eq!(params.max_concurrency, Some(2));
    }

    #[test]
    fn test_defaults_match_params() {
        assert_eq!(FileGenerationConfig::default().to_params(), GenerationParams::default());
    }
}
