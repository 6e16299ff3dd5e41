//! Generation outcomes
//!
//! Exhausting the attempt budget is an expected result, not an error: every
//! scheduled tool ends up in [`ToolGuardsCodeGenerationResult::tools`] as
//! either a validated guard or a failure record with the last diagnostics.

use super::phase::GenerationPhase;
use crate::api::entities::RuntimeDomain;
use crate::files::FileTwin;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

/// File name of the persisted result under the generation root
pub const RESULT_FILE: &str = "result.json";

/// A guard whose tests passed, with the tests that validated it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolGuardCode {
    pub tool_name: String,
    pub guard_fn_name: String,
    pub guard_file: FileTwin,
    pub test_file: FileTwin,
    /// Relative path of the passing test report
    pub report_file: String,
    /// Attempt that succeeded (1-based)
    pub attempts: u32,
}

/// A tool whose attempt budget ran out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolGuardFailure {
    pub tool_name: String,
    pub attempts: u32,
    /// Phase the last attempt failed in
    pub phase: GenerationPhase,
    pub diagnostics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolGuardOutcome {
    Succeeded(ToolGuardCode),
    Failed(ToolGuardFailure),
}

impl ToolGuardOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ToolGuardOutcome::Succeeded(_))
    }

    pub fn tool_name(&self) -> &str {
        match self {
            ToolGuardOutcome::Succeeded(code) => &code.tool_name,
            ToolGuardOutcome::Failed(failure) => &failure.tool_name,
        }
    }

    pub fn attempts(&self) -> u32 {
        match self {
            ToolGuardOutcome::Succeeded(code) => code.attempts,
            ToolGuardOutcome::Failed(failure) => failure.attempts,
        }
    }
}

/// Code generated for one domain and a set of tool policies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolGuardsCodeGenerationResult {
    pub app_name: String,
    pub domain: RuntimeDomain,
    pub tools: BTreeMap<String, ToolGuardOutcome>,
}

impl ToolGuardsCodeGenerationResult {
    pub fn new(domain: RuntimeDomain) -> Self {
        Self {
            app_name: domain.app_name.clone(),
            domain,
            tools: BTreeMap::new(),
        }
    }

    pub fn with_outcome(mut self, outcome: ToolGuardOutcome) -> Self {
        self.tools.insert(outcome.tool_name().to_string(), outcome);
        self
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &ToolGuardCode> {
        self.tools.values().filter_map(|o| match o {
            ToolGuardOutcome::Succeeded(code) => Some(code),
            ToolGuardOutcome::Failed(_) => None,
        })
    }

    pub fn failed(&self) -> impl Iterator<Item = &ToolGuardFailure> {
        self.tools.values().filter_map(|o| match o {
            ToolGuardOutcome::Succeeded(_) => None,
            ToolGuardOutcome::Failed(failure) => Some(failure),
        })
    }

    pub fn all_succeeded(&self) -> bool {
        self.tools.values().all(ToolGuardOutcome::is_success)
    }

    /// Write `result.json` under `root`.
    pub fn save(&self, root: &Path) -> io::Result<PathBuf> {
        let json = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        FileTwin::new(RESULT_FILE, json).save(root)
    }

    pub fn load(root: &Path) -> io::Result<Self> {
        let twin = FileTwin::load(root, RESULT_FILE)?;
        serde_json::from_str(&twin.content)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::entities::Operation;
    use crate::api::type_ref::TypeRef;

    fn domain() -> RuntimeDomain {
        RuntimeDomain::assemble(
            "bank",
            vec![
                Operation::new("transfer", TypeRef::NoneType),
                Operation::new("refund", TypeRef::NoneType),
            ],
            vec![],
        )
        .unwrap()
    }

    fn succeeded(tool: &str) -> ToolGuardOutcome {
        ToolGuardOutcome::Succeeded(ToolGuardCode {
            tool_name: tool.to_string(),
            guard_fn_name: format!("guard_{tool}"),
            guard_file: FileTwin::new(format!("bank/{tool}/guard_{tool}.py"), "pass\n"),
            test_file: FileTwin::new(format!("tests/test_guard_{tool}.py"), "pass\n"),
            report_file: format!("reports/{tool}/attempt_1.json"),
            attempts: 1,
        })
    }

    fn failed(tool: &str) -> ToolGuardOutcome {
        ToolGuardOutcome::Failed(ToolGuardFailure {
            tool_name: tool.to_string(),
            attempts: 3,
            phase: GenerationPhase::Testing,
            diagnostics: vec!["AssertionError".to_string()],
        })
    }

    #[test]
    fn test_partition() {
        let result = ToolGuardsCodeGenerationResult::new(domain())
            .with_outcome(succeeded("transfer"))
            .with_outcome(failed("refund"));

        assert_eq!(result.succeeded().count(), 1);
        assert_eq!(result.failed().next().unwrap().tool_name, "refund");
        assert!(!result.all_succeeded());
    }

    #[test]
    fn test_outcome_is_tagged_by_status() {
        let json = serde_json::to_value(failed("refund")).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["phase"], "testing");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let result = ToolGuardsCodeGenerationResult::new(domain()).with_outcome(succeeded("transfer"));

        let path = result.save(dir.path()).unwrap();
        assert_eq!(path, dir.path().join(RESULT_FILE));

        let loaded = ToolGuardsCodeGenerationResult::load(dir.path()).unwrap();
        assert_eq!(loaded.tools, result.tools);
        assert!(loaded.all_succeeded());
    }
}
