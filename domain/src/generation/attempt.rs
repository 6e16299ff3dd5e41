//! Feedback carried from one attempt into the next

use super::phase::GenerationPhase;
use crate::files::FileTwin;
use serde::{Deserialize, Serialize};

/// What a failed attempt produced and why it was rejected
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviousAttempt {
    pub attempt: u32,
    /// Phase the attempt failed in
    pub phase: GenerationPhase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guard: Option<FileTwin>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tests: Option<FileTwin>,
    pub diagnostics: Vec<String>,
}

impl PreviousAttempt {
    pub fn new(attempt: u32, phase: GenerationPhase, diagnostics: Vec<String>) -> Self {
        Self {
            attempt,
            phase,
            guard: None,
            tests: None,
            diagnostics,
        }
    }

    pub fn with_guard(mut self, guard: FileTwin) -> Self {
        self.guard = Some(guard);
        self
    }

    pub fn with_tests(mut self, tests: FileTwin) -> Self {
        self.tests = Some(tests);
        self
    }

    /// Numbered diagnostics block for prompts.
    pub fn render_diagnostics(&self) -> String {
        if self.diagnostics.is_empty() {
            return format!("Attempt {} failed during {} without diagnostics.", self.attempt, self.phase);
        }
        self.diagnostics
            .iter()
            .enumerate()
            .map(|(i, d)| format!("{}. {}", i + 1, d))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_diagnostics() {
        let previous = PreviousAttempt::new(
            1,
            GenerationPhase::TypeChecking,
            vec!["a.py:1:1 - error: x".to_string(), "b.py:2:1 - error: y".to_string()],
        );
        assert_eq!(
            previous.render_diagnostics(),
            "1. a.py:1:1 - error: x\n2. b.py:2:1 - error: y"
        );
    }

    #[test]
    fn test_render_empty_diagnostics() {
        let previous = PreviousAttempt::new(2, GenerationPhase::Testing, vec![]);
        assert_eq!(
            previous.render_diagnostics(),
            "Attempt 2 failed during Testing without diagnostics."
        );
    }
}
