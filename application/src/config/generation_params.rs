//! Generation parameters: use case loop control.
//!
//! [`GenerationParams`] groups the static parameters that control the
//! repair loop of
//! [`GenerateToolGuardUseCase`](crate::use_cases::generate_tool_guard::GenerateToolGuardUseCase)
//! and the fan-out of
//! [`GenerateToolGuardsUseCase`](crate::use_cases::generate_tool_guards::GenerateToolGuardsUseCase).

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Attempts per tool before giving up (at least 1).
    pub max_attempts: u32,
    /// Upper bound on one attempt, completions and validators included.
    pub attempt_timeout: Duration,
    /// Generators running at once; `None` runs every tool concurrently.
    pub max_concurrency: Option<usize>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            attempt_timeout: Duration::from_secs(600),
            max_concurrency: None,
        }
    }
}

impl GenerationParams {
    // ==================== Builder Methods ====================

    pub fn with_max_attempts(mut self, max: u32) -> Self {
        self.max_attempts = max.max(1);
        self
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub fn with_max_concurrency(mut self, max: Option<usize>) -> Self {
        self.max_concurrency = max.filter(|m| *m > 0);
        self
    }
}
