//! Tool policy entities
//!
//! A [`ToolPolicy`] names one guarded tool and carries the ordered
//! natural-language constraints its guard must enforce. Policies, not tools,
//! drive the unit of work: a policy without items is never generated.

use crate::core::string::python_identifier;
use serde::{Deserialize, Serialize};

/// One natural-language constraint on a tool call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolPolicyItem {
    pub name: String,
    pub description: String,
    /// Source passages the constraint was taken from
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,
    /// Example calls that satisfy the constraint
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub compliance_examples: Vec<String>,
    /// Example calls that violate the constraint
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violation_examples: Vec<String>,
}

impl ToolPolicyItem {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            references: Vec::new(),
            compliance_examples: Vec::new(),
            violation_examples: Vec::new(),
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.references.push(reference.into());
        self
    }

    pub fn with_compliance_example(mut self, example: impl Into<String>) -> Self {
        self.compliance_examples.push(example.into());
        self
    }

    pub fn with_violation_example(mut self, example: impl Into<String>) -> Self {
        self.violation_examples.push(example.into());
        self
    }

    /// Name of the Python function checking this item.
    pub fn check_fn_name(&self) -> String {
        format!("check_{}", python_identifier(&self.name))
    }
}

/// A guarded tool and its constraints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolPolicy {
    pub tool_name: String,
    #[serde(default)]
    pub policy_items: Vec<ToolPolicyItem>,
}

impl ToolPolicy {
    pub fn new(tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            policy_items: Vec::new(),
        }
    }

    pub fn with_item(mut self, item: ToolPolicyItem) -> Self {
        self.policy_items.push(item);
        self
    }

    /// Whether this policy constrains anything at all.
    pub fn has_policy(&self) -> bool {
        !self.policy_items.is_empty()
    }

    /// Render the constraints as numbered text for completion prompts.
    pub fn render_text(&self) -> String {
        let mut out = format!("Policy for tool `{}`:\n", self.tool_name);
        for (i, item) in self.policy_items.iter().enumerate() {
            out.push_str(&format!("\n{}. {}\n   {}\n", i + 1, item.name, item.description));
            for reference in &item.references {
                out.push_str(&format!("   Reference: {reference}\n"));
            }
            for example in &item.compliance_examples {
                out.push_str(&format!("   Compliant: {example}\n"));
            }
            for example in &item.violation_examples {
                out.push_str(&format!("   Violation: {example}\n"));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_policy() {
        assert!(!ToolPolicy::new("transfer").has_policy());
        assert!(
            ToolPolicy::new("transfer")
                .with_item(ToolPolicyItem::new("limit", "At most 1000 per call"))
                .has_policy()
        );
    }

    #[test]
    fn test_render_text_numbers_items() {
        let policy = ToolPolicy::new("transfer")
            .with_item(
                ToolPolicyItem::new("limit", "At most 1000 per call")
                    .with_violation_example("transfer(amount=5000)"),
            )
            .with_item(ToolPolicyItem::new("owner", "Source account must belong to the user"));

        let text = policy.render_text();
        assert!(text.contains("1. limit\n   At most 1000 per call"));
        assert!(text.contains("   Violation: transfer(amount=5000)"));
        assert!(text.contains("2. owner"));
    }

    #[test]
    fn test_check_fn_name() {
        let item = ToolPolicyItem::new("Daily Limit", "...");
        assert_eq!(item.check_fn_name(), "check_daily_limit");
    }

    #[test]
    fn test_deserialize_without_items() {
        let policy: ToolPolicy = serde_json::from_str(r#"{"tool_name": "refund"}"#).unwrap();
        assert!(!policy.has_policy());
    }
}
