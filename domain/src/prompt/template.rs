//! Prompt templates for guard and test generation

use crate::api::entities::RuntimeDomain;
use crate::api::stubs::{self, VIOLATION_EXCEPTION};
use crate::files::FileTwin;
use crate::generation::attempt::PreviousAttempt;
use crate::generation::layout::GuardLayout;
use crate::policy::entities::ToolPolicy;

/// Templates for the two completion requests of an attempt
pub struct GuardPromptTemplate;

impl GuardPromptTemplate {
    /// System prompt for guard generation
    pub fn guard_system() -> &'static str {
        r#"You are a senior Python engineer writing policy guards for tool calls.
A guard receives the arguments of a tool call before it executes and raises
PolicyViolationException when the call violates the tool's policy.
Use only the provided API stubs to look up state. Do not perform the tool call itself.
Keep the given function signatures unchanged and keep one check function per policy item.
The code must pass a strict static type check.
Reply with the complete module in a single ```python fenced block."#
    }

    /// System prompt for test generation
    pub fn tests_system() -> &'static str {
        r#"You are a senior Python engineer writing pytest suites for policy guards.
Write tests that call the guard with a stubbed API object and assert that
compliant calls pass and violating calls raise PolicyViolationException.
Cover every policy item with at least one compliant and one violating case.
Give every test function a one-line docstring describing the scenario.
Do not use network access, real services, or files.
The code must pass a strict static type check.
Reply with the complete module in a single ```python fenced block."#
    }

    /// Deterministic starting point for the guard module.
    pub fn guard_skeleton(domain: &RuntimeDomain, policy: &ToolPolicy, layout: &GuardLayout) -> String {
        let api_param = format!("api: {}", domain.api_class_name);
        let (params, args) = match domain.operation(&layout.tool_name) {
            Some(op) => {
                let args: Vec<String> = std::iter::once("api".to_string())
                    .chain(op.ordered_parameters().iter().map(|p| p.name.clone()))
                    .collect();
                (stubs::signature(op, &api_param), args.join(", "))
            }
            None => (api_param, "api".to_string()),
        };

        let mut out = format!(
            "from typing import Any, Dict, List, Optional\n\n\
             from {common} import {VIOLATION_EXCEPTION}\n\
             from {api_module} import {class}\n",
            common = domain.module_path(stubs::COMMON_MODULE),
            api_module = domain.module_path(stubs::API_MODULE),
            class = domain.api_class_name,
        );
        if !domain.types.is_empty() {
            out.push_str(&format!(
                "from {} import *  # noqa: F403\n",
                domain.module_path(stubs::TYPES_MODULE)
            ));
        }

        out.push_str(&format!(
            "\n\ndef {}({params}) -> None:\n    {}\n",
            layout.guard_fn_name(),
            stubs::docstring(&format!(
                "Check a `{}` call against its policy. Raises {VIOLATION_EXCEPTION} on violation.",
                layout.tool_name
            )),
        ));
        for item in &policy.policy_items {
            out.push_str(&format!("    {}({args})\n", item.check_fn_name()));
        }

        for item in &policy.policy_items {
            out.push_str(&format!(
                "\n\ndef {}({params}) -> None:\n    {}\n    pass\n",
                item.check_fn_name(),
                stubs::docstring(&item.description),
            ));
        }
        out
    }

    /// User prompt for the guard completion
    pub fn guard_prompt(
        domain: &RuntimeDomain,
        policy: &ToolPolicy,
        layout: &GuardLayout,
        previous: Option<&PreviousAttempt>,
    ) -> String {
        let mut prompt = format!(
            "Implement the guard for tool `{}` of application `{}`.\n\n{}\n",
            layout.tool_name,
            domain.app_name,
            policy.render_text()
        );
        push_stubs(&mut prompt, domain);

        prompt.push_str(&format!(
            "\nComplete this module, saved as `{}`:\n\n```python\n{}```\n",
            layout.guard_file(),
            Self::guard_skeleton(domain, policy, layout)
        ));

        if let Some(previous) = previous {
            prompt.push_str(&format!(
                "\nAttempt {} was rejected during {}:\n{}\n",
                previous.attempt,
                previous.phase,
                previous.render_diagnostics()
            ));
            if let Some(guard) = &previous.guard {
                push_file(&mut prompt, "Previous guard", guard);
            }
            if let Some(tests) = &previous.tests {
                push_file(&mut prompt, "Previous tests", tests);
            }
            prompt.push_str("\nFix the problems above. If a test was wrong rather than the guard, keep the guard logic.\n");
        }

        prompt
    }

    /// User prompt for the test completion
    pub fn tests_prompt(
        domain: &RuntimeDomain,
        policy: &ToolPolicy,
        layout: &GuardLayout,
        guard: &FileTwin,
        previous: Option<&PreviousAttempt>,
    ) -> String {
        let mut prompt = format!(
            "Write the pytest suite for the guard of tool `{}` of application `{}`.\n\n{}\n",
            layout.tool_name,
            domain.app_name,
            policy.render_text()
        );
        push_stubs(&mut prompt, domain);
        push_file(&mut prompt, "Guard under test", guard);

        prompt.push_str(&format!(
            "\nImport the guard with `from {} import {}` and build the API with a \
             stub class implementing `{}`. The suite is saved as `{}`.\n",
            layout.guard_module(),
            layout.guard_fn_name(),
            domain.api_class_name,
            layout.test_file()
        ));

        if let Some(previous) = previous {
            prompt.push_str(&format!(
                "\nThe previous suite was rejected during {}:\n{}\n",
                previous.phase,
                previous.render_diagnostics()
            ));
            if let Some(tests) = &previous.tests {
                push_file(&mut prompt, "Previous tests", tests);
            }
        }

        prompt
    }
}

fn push_stubs(prompt: &mut String, domain: &RuntimeDomain) {
    prompt.push_str("\nAvailable modules:\n");
    for file in domain.stub_files() {
        push_file(prompt, "Module", file);
    }
}

fn push_file(prompt: &mut String, label: &str, file: &FileTwin) {
    prompt.push_str(&format!(
        "\n{label} `{}`:\n```python\n{}\n```\n",
        file.file_name,
        file.content.trim_end()
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::entities::{Operation, Parameter};
    use crate::api::type_ref::TypeRef;
    use crate::generation::phase::GenerationPhase;
    use crate::policy::entities::ToolPolicyItem;

    fn fixture() -> (RuntimeDomain, ToolPolicy, GuardLayout) {
        let domain = RuntimeDomain::assemble(
            "bank",
            vec![
                Operation::new("transfer", TypeRef::NoneType)
                    .with_parameter(Parameter::optional("memo", TypeRef::Str))
                    .with_parameter(Parameter::required("amount", TypeRef::Float)),
            ],
            vec![],
        )
        .unwrap();
        let policy = ToolPolicy::new("transfer")
            .with_item(ToolPolicyItem::new("limit", "At most 1000 per call"))
            .with_item(ToolPolicyItem::new("memo required", "Large transfers need a memo"));
        let layout = GuardLayout::new(&domain, "transfer");
        (domain, policy, layout)
    }

    #[test]
    fn test_guard_skeleton_has_entry_and_check_functions() {
        let (domain, policy, layout) = fixture();
        let skeleton = GuardPromptTemplate::guard_skeleton(&domain, &policy, &layout);

        assert!(skeleton.contains("from bank.toolguard_common import PolicyViolationException"));
        assert!(skeleton.contains("from bank.domain_api import BankApi"));
        assert!(skeleton.contains(
            "def guard_transfer(api: BankApi, amount: float, memo: Optional[str] = None) -> None:"
        ));
        assert!(skeleton.contains("    check_limit(api, amount, memo)\n"));
        assert!(skeleton.contains("    check_memo_required(api, amount, memo)\n"));
        assert!(skeleton.contains("def check_memo_required(api: BankApi,"));
        assert!(!skeleton.contains("domain_types"));
    }

    #[test]
    fn test_guard_prompt_includes_feedback_on_retry() {
        let (domain, policy, layout) = fixture();
        let first = GuardPromptTemplate::guard_prompt(&domain, &policy, &layout, None);
        assert!(!first.contains("was rejected"));
        assert!(first.contains("bank/transfer/guard_transfer.py"));

        let previous = PreviousAttempt::new(
            1,
            GenerationPhase::TypeChecking,
            vec!["guard_transfer.py:3:1 - error: bad".to_string()],
        )
        .with_guard(FileTwin::new(layout.guard_file(), "def guard_transfer(): ..."));
        let retry = GuardPromptTemplate::guard_prompt(&domain, &policy, &layout, Some(&previous));
        assert!(retry.contains("Attempt 1 was rejected during Type checking"));
        assert!(retry.contains("1. guard_transfer.py:3:1 - error: bad"));
        assert!(retry.contains("def guard_transfer(): ..."));
    }

    #[test]
    fn test_tests_prompt_references_guard_module() {
        let (domain, policy, layout) = fixture();
        let guard = FileTwin::new(layout.guard_file(), "def guard_transfer(api, amount, memo=None): pass");
        let prompt = GuardPromptTemplate::tests_prompt(&domain, &policy, &layout, &guard, None);

        assert!(prompt.contains("from bank.transfer.guard_transfer import guard_transfer"));
        assert!(prompt.contains("def guard_transfer(api, amount, memo=None): pass"));
        assert!(prompt.contains("tests/test_guard_transfer.py"));
    }
}
