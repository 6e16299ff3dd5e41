//! Python stub rendering for the runtime domain.
//!
//! Generated guards and tests import these modules instead of the real
//! API client, so the static checker can verify calls against the declared
//! surface without any network access.

use super::entities::{DomainType, DomainTypeKind, Operation, Parameter};
use std::collections::BTreeSet;

pub const COMMON_MODULE: &str = "toolguard_common";
pub const TYPES_MODULE: &str = "domain_types";
pub const API_MODULE: &str = "domain_api";

/// Name of the exception every guard raises on a violation
pub const VIOLATION_EXCEPTION: &str = "PolicyViolationException";

const TYPING_IMPORTS: &str = "from typing import Any, Dict, List, Optional";

pub fn render_common() -> String {
    format!(
        r#""""Shared runtime support for generated guards. Generated by toolguard; do not edit."""


class {VIOLATION_EXCEPTION}(Exception):
    """Raised by a guard when a tool call violates its policy."""

    def __init__(self, message: str) -> None:
        super().__init__(message)
        self.message = message
"#
    )
}

pub fn render_types(app_name: &str, types: &[DomainType]) -> String {
    let mut out = format!(
        "\"\"\"Domain types of {app_name}. Generated by toolguard; do not edit.\"\"\"\n\
         from __future__ import annotations\n\n\
         from dataclasses import dataclass\n\
         {TYPING_IMPORTS}\n"
    );

    // Aliases are plain assignments, evaluated eagerly, so they go after the records
    for ty in types {
        if let DomainTypeKind::Record { fields } = &ty.kind {
            out.push_str(&render_record(ty, fields));
        }
    }

    let aliases: Vec<_> = types
        .iter()
        .filter_map(|ty| match &ty.kind {
            DomainTypeKind::Alias { target } => Some((ty, target)),
            DomainTypeKind::Record { .. } => None,
        })
        .collect();
    if !aliases.is_empty() {
        out.push('\n');
        for (ty, target) in aliases {
            if !ty.description.is_empty() {
                out.push_str(&format!("# {}\n", single_line(&ty.description)));
            }
            out.push_str(&format!("{} = {}\n", ty.name, target.to_python()));
        }
    }

    out
}

fn render_record(ty: &DomainType, fields: &[Parameter]) -> String {
    let mut out = format!("\n\n@dataclass\nclass {}:\n", ty.name);
    if !ty.description.is_empty() {
        out.push_str(&format!("    {}\n", docstring(&ty.description)));
    }

    let (required, optional): (Vec<_>, Vec<_>) = fields.iter().partition(|f| f.required);
    for field in &required {
        out.push_str(&format!("    {}: {}\n", field.name, field.annotation()));
    }
    for field in &optional {
        out.push_str(&format!("    {}: {} = None\n", field.name, field.annotation()));
    }

    if fields.is_empty() && ty.description.is_empty() {
        out.push_str("    pass\n");
    }
    out
}

pub fn render_api(
    app_name: &str,
    package: &str,
    class_name: &str,
    operations: &[Operation],
    types: &[DomainType],
) -> String {
    let mut out = format!(
        "\"\"\"API surface of {app_name}. Generated by toolguard; do not edit.\"\"\"\n\
         from __future__ import annotations\n\n\
         {TYPING_IMPORTS}, Protocol\n"
    );

    let type_names: BTreeSet<&str> = types.iter().map(|t| t.name.as_str()).collect();
    if !type_names.is_empty() {
        let names: Vec<&str> = type_names.into_iter().collect();
        out.push_str(&format!(
            "\nfrom {package}.{TYPES_MODULE} import {}\n",
            names.join(", ")
        ));
    }

    out.push_str(&format!("\n\nclass {class_name}(Protocol):\n"));
    for (i, op) in operations.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format!(
            "    def {}({}) -> {}:\n",
            op.name,
            signature(op, "self"),
            op.result.to_python()
        ));
        if !op.description.is_empty() {
            out.push_str(&format!("        {}\n", docstring(&op.description)));
        }
        out.push_str("        ...\n");
    }
    out
}

/// Parameter list of an operation, led by `first` (`self`, `api: BankApi`, ...).
pub fn signature(op: &Operation, first: &str) -> String {
    let mut params = vec![first.to_string()];
    for p in op.ordered_parameters() {
        if p.required {
            params.push(format!("{}: {}", p.name, p.annotation()));
        } else {
            params.push(format!("{}: {} = None", p.name, p.annotation()));
        }
    }
    params.join(", ")
}

/// Triple-quoted docstring literal, safe for arbitrary text.
pub fn docstring(text: &str) -> String {
    let escaped = text.trim().replace('\\', "\\\\").replace("\"\"\"", "\\\"\\\"\\\"");
    format!("\"\"\"{escaped}\"\"\"")
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
