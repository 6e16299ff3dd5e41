//! Generation phase of a single tool guard

use serde::{Deserialize, Serialize};

/// Where a per-tool generator currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationPhase {
    /// Requesting the guard implementation
    GeneratingGuard,
    /// Requesting the test suite for the guard
    GeneratingTests,
    /// Running the static checker over guard and tests
    TypeChecking,
    /// Running the test suite
    Testing,
    /// Validation passed
    Success,
    /// Attempt failed, another one follows
    Retry,
    /// Attempt budget used up
    Exhausted,
}

impl GenerationPhase {
    pub fn as_str(&self) -> &str {
        match self {
            GenerationPhase::GeneratingGuard => "generating_guard",
            GenerationPhase::GeneratingTests => "generating_tests",
            GenerationPhase::TypeChecking => "type_checking",
            GenerationPhase::Testing => "testing",
            GenerationPhase::Success => "success",
            GenerationPhase::Retry => "retry",
            GenerationPhase::Exhausted => "exhausted",
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            GenerationPhase::GeneratingGuard => "Generating guard",
            GenerationPhase::GeneratingTests => "Generating tests",
            GenerationPhase::TypeChecking => "Type checking",
            GenerationPhase::Testing => "Testing",
            GenerationPhase::Success => "Success",
            GenerationPhase::Retry => "Retry",
            GenerationPhase::Exhausted => "Exhausted",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, GenerationPhase::Success | GenerationPhase::Exhausted)
    }
}

impl std::fmt::Display for GenerationPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_phases() {
        assert!(GenerationPhase::Success.is_terminal());
        assert!(GenerationPhase::Exhausted.is_terminal());
        assert!(!GenerationPhase::Retry.is_terminal());
        assert!(!GenerationPhase::TypeChecking.is_terminal());
    }

    #[test]
    fn test_serde_name_matches_as_str() {
        let json = serde_json::to_string(&GenerationPhase::TypeChecking).unwrap();
        assert_eq!(json, format!("\"{}\"", GenerationPhase::TypeChecking.as_str()));
    }
}
