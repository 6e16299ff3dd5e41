//! On-disk layout of one tool's generated artifacts
//!
//! ```text
//! <root>/<package>/<tool>/__init__.py
//! <root>/<package>/<tool>/guard_<tool>.py
//! <root>/tests/test_guard_<tool>.py
//! <root>/reports/<tool>/attempt_<n>.json
//! ```

use crate::api::entities::RuntimeDomain;
use crate::api::stubs::{API_MODULE, COMMON_MODULE, TYPES_MODULE};
use crate::core::error::DomainError;
use crate::core::string::python_identifier;
use std::collections::HashMap;

pub const TESTS_DIR: &str = "tests";
pub const REPORTS_DIR: &str = "reports";

/// Relative paths of everything generated for one tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardLayout {
    pub tool_name: String,
    /// Python identifier derived from the tool name
    pub tool_ident: String,
    pub package: String,
}

impl GuardLayout {
    pub fn new(domain: &RuntimeDomain, tool_name: impl Into<String>) -> Self {
        let tool_name = tool_name.into();
        Self {
            tool_ident: python_identifier(&tool_name),
            tool_name,
            package: domain.package_name(),
        }
    }

    /// Name of the guard entry function (`guard_<tool>`).
    pub fn guard_fn_name(&self) -> String {
        format!("guard_{}", self.tool_ident)
    }

    pub fn guard_dir(&self) -> String {
        format!("{}/{}", self.package, self.tool_ident)
    }

    pub fn guard_file(&self) -> String {
        format!("{}/guard_{}.py", self.guard_dir(), self.tool_ident)
    }

    pub fn init_file(&self) -> String {
        format!("{}/__init__.py", self.guard_dir())
    }

    /// Dotted import path of the guard module.
    pub fn guard_module(&self) -> String {
        format!("{}.{}.guard_{}", self.package, self.tool_ident, self.tool_ident)
    }

    pub fn test_file(&self) -> String {
        format!("{TESTS_DIR}/test_guard_{}.py", self.tool_ident)
    }

    /// Report file of attempt `attempt` (1-based).
    pub fn report_file(&self, attempt: u32) -> String {
        format!("{REPORTS_DIR}/{}/attempt_{attempt}.json", self.tool_ident)
    }

    /// Check that `tools` can be generated side by side.
    ///
    /// Every tool needs its own guard package, test file and report
    /// directory, none of which may shadow a stub module of the package.
    pub fn check_disjoint<'a>(
        tools: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), DomainError> {
        let mut owners: HashMap<String, &str> = HashMap::new();
        for tool in tools {
            let identifier = python_identifier(tool);
            if [API_MODULE, TYPES_MODULE, COMMON_MODULE].contains(&identifier.as_str()) {
                return Err(DomainError::ReservedToolName {
                    tool: tool.to_string(),
                    identifier,
                });
            }
            if let Some(first) = owners.get(&identifier) {
                if *first == tool {
                    return Err(DomainError::DuplicatePolicy(tool.to_string()));
                }
                return Err(DomainError::ToolNameCollision {
                    first: first.to_string(),
                    second: tool.to_string(),
                    identifier,
                });
            }
            owners.insert(identifier, tool);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::entities::Operation;
    use crate::api::type_ref::TypeRef;

    #[test]
    fn test_layout_paths() {
        let domain = RuntimeDomain::assemble(
            "Retail Bank",
            vec![Operation::new("transfer-funds", TypeRef::NoneType)],
            vec![],
        )
        .unwrap();
        let layout = GuardLayout::new(&domain, "transfer-funds");

        assert_eq!(layout.guard_fn_name(), "guard_transfer_funds");
        assert_eq!(
            layout.guard_file(),
            "retail_bank/transfer_funds/guard_transfer_funds.py"
        );
        assert_eq!(layout.init_file(), "retail_bank/transfer_funds/__init__.py");
        assert_eq!(
            layout.guard_module(),
            "retail_bank.transfer_funds.guard_transfer_funds"
        );
        assert_eq!(layout.test_file(), "tests/test_guard_transfer_funds.py");
        assert_eq!(layout.report_file(2), "reports/transfer_funds/attempt_2.json");
    }

    #[test]
    fn test_distinct_tools_are_disjoint() {
        assert!(GuardLayout::check_disjoint(["transfer", "refund", "list-accounts"]).is_ok());
    }

    #[test]
    fn test_colliding_identifiers_are_rejected() {
        let err = GuardLayout::check_disjoint(["getOrder", "get_order"]).unwrap_err();
        assert!(matches!(
            err,
            DomainError::ToolNameCollision { ref first, ref second, ref identifier }
                if first == "getOrder" && second == "get_order" && identifier == "get_order"
        ));
    }

    #[test]
    fn test_stub_module_names_are_reserved() {
        for tool in ["domain_api", "DomainTypes", "toolguard-common"] {
            let err = GuardLayout::check_disjoint(["transfer", tool]).unwrap_err();
            assert!(matches!(err, DomainError::ReservedToolName { .. }), "{tool}");
        }
    }

    #[test]
    fn test_repeated_tool_is_a_duplicate_policy() {
        let err = GuardLayout::check_disjoint(["transfer", "refund", "transfer"]).unwrap_err();
        assert!(matches!(err, DomainError::DuplicatePolicy(ref tool) if tool == "transfer"));
    }
}
