//! Console output formatter for generation results

use colored::Colorize;
use toolguard_domain::ToolGuardsCodeGenerationResult;

/// Diagnostics shown per failed tool before eliding the rest
const MAX_DIAGNOSTICS: usize = 5;

/// Formats generation results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the per-tool summary
    pub fn format(result: &ToolGuardsCodeGenerationResult) -> String {
        let mut output = String::new();

        output.push_str(&Self::header(&format!("Guards for {}", result.app_name)));
        output.push('\n');

        output.push_str(&format!(
            "{} {}\n",
            "Package:".cyan().bold(),
            result.domain.package_name()
        ));
        output.push_str(&format!(
            "{} {} operation(s), {} tool(s) with policies\n",
            "Domain:".cyan().bold(),
            result.domain.operations.len(),
            result.tools.len()
        ));

        let succeeded: Vec<_> = result.succeeded().collect();
        if !succeeded.is_empty() {
            output.push_str(&Self::section_header("Validated guards"));
            for code in succeeded {
                output.push_str(&format!(
                    "\n{} {}  {}\n    tests: {}  (attempt {})\n",
                    "v".green(),
                    code.tool_name.bold(),
                    code.guard_file.file_name,
                    code.test_file.file_name,
                    code.attempts
                ));
            }
        }

        let failed: Vec<_> = result.failed().collect();
        if !failed.is_empty() {
            output.push_str(&Self::section_header("Failed tools"));
            for failure in failed {
                output.push_str(&format!(
                    "\n{} {}  failed during {} after {} attempt(s)\n",
                    "x".red(),
                    failure.tool_name.bold(),
                    failure.phase,
                    failure.attempts
                ));
                for diagnostic in failure.diagnostics.iter().take(MAX_DIAGNOSTICS) {
                    output.push_str(&Self::indent(diagnostic, "    "));
                    output.push('\n');
                }
                if failure.diagnostics.len() > MAX_DIAGNOSTICS {
                    output.push_str(&format!(
                        "    {}\n",
                        format!("... {} more", failure.diagnostics.len() - MAX_DIAGNOSTICS).dimmed()
                    ));
                }
            }
        }

        output.push_str(&Self::summary_line(result));
        output.push_str(&Self::footer());
        output
    }

    /// Format as JSON
    pub fn format_json(result: &ToolGuardsCodeGenerationResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
    }

    fn summary_line(result: &ToolGuardsCodeGenerationResult) -> String {
        let total = result.tools.len();
        let passed = result.succeeded().count();
        let line = format!("{passed}/{total} guard(s) validated");
        if passed == total {
            format!("\n{}\n", line.green().bold())
        } else {
            format!("\n{}\n", line.yellow().bold())
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolguard_domain::{
        FileTwin, GenerationPhase, Operation, RuntimeDomain, ToolGuardCode, ToolGuardFailure,
        ToolGuardOutcome, TypeRef,
    };

    fn result() -> ToolGuardsCodeGenerationResult {
        let domain = RuntimeDomain::assemble(
            "bank",
            vec![
                Operation::new("transfer", TypeRef::NoneType),
                Operation::new("refund", TypeRef::NoneType),
            ],
            vec![],
        )
        .unwrap();
        ToolGuardsCodeGenerationResult::new(domain)
            .with_outcome(ToolGuardOutcome::Succeeded(ToolGuardCode {
                tool_name: "transfer".to_string(),
                guard_fn_name: "guard_transfer".to_string(),
                guard_file: FileTwin::new("bank/transfer/guard_transfer.py", "pass\n"),
                test_file: FileTwin::new("tests/test_guard_transfer.py", "pass\n"),
                report_file: "reports/transfer/attempt_2.json".to_string(),
                attempts: 2,
            }))
            .with_outcome(ToolGuardOutcome::Failed(ToolGuardFailure {
                tool_name: "refund".to_string(),
                attempts: 3,
                phase: GenerationPhase::TypeChecking,
                diagnostics: (1..=7).map(|i| format!("error {i}")).collect(),
            }))
    }

    #[test]
    fn test_format_lists_both_outcomes() {
        let text = ConsoleFormatter::format(&result());
        assert!(text.contains("bank/transfer/guard_transfer.py"));
        assert!(text.contains("refund"));
        assert!(text.contains("error 5"));
        assert!(!text.contains("error 6"));
        assert!(text.contains("2 more"));
        assert!(text.contains("1/2 guard(s) validated"));
    }

    #[test]
    fn test_format_json_round_trips() {
        let json = ConsoleFormatter::format_json(&result());
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["tools"]["refund"]["status"], "failed");
        assert_eq!(value["tools"]["transfer"]["attempts"], 2);
    }

    #[test]
    fn test_indent() {
        assert_eq!(ConsoleFormatter::indent("a\nb", "  "), "  a\n  b");
    }
}
