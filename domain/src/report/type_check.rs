//! Static type-check report model
//!
//! Parsed from `pyright --outputjson`. Only errors gate a generation
//! attempt; warnings and information are kept for display.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Information,
}

/// Zero-based position, as pyright reports it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    #[serde(default)]
    pub file: String,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
}

impl Diagnostic {
    /// `file:line:col - error: message (rule)` with 1-based positions.
    pub fn render(&self) -> String {
        let location = match &self.range {
            Some(range) => format!(
                "{}:{}:{}",
                self.file,
                range.start.line + 1,
                range.start.character + 1
            ),
            None => self.file.clone(),
        };
        let severity = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Information => "information",
        };
        match &self.rule {
            Some(rule) => format!("{location} - {severity}: {} ({rule})", self.message),
            None => format!("{location} - {severity}: {}", self.message),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeCheckSummary {
    #[serde(default)]
    pub files_analyzed: u32,
    #[serde(default)]
    pub error_count: u32,
    #[serde(default)]
    pub warning_count: u32,
    #[serde(default)]
    pub information_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_in_sec: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeCheckReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub general_diagnostics: Vec<Diagnostic>,
    #[serde(default)]
    pub summary: TypeCheckSummary,
}

impl TypeCheckReport {
    pub fn from_json(json: &str) -> Result<Self, DomainError> {
        serde_json::from_str(json).map_err(|e| DomainError::InvalidReport(e.to_string()))
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.general_diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }

    pub fn passed(&self) -> bool {
        self.summary.error_count == 0 && self.errors().next().is_none()
    }

    /// Rendered error diagnostics, deduplicated, in reported order.
    pub fn list_errors(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut errors: Vec<String> = self
            .errors()
            .map(Diagnostic::render)
            .filter(|e| seen.insert(e.clone()))
            .collect();

        if errors.is_empty() && self.summary.error_count > 0 {
            errors.push(format!(
                "type checker reported {} error(s) without diagnostics",
                self.summary.error_count
            ));
        }
        errors
    }
}
