//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Domain has no operations")]
    EmptyDomain,

    #[error("Duplicate operation in domain: {0}")]
    DuplicateOperation(String),

    #[error("Duplicate parameter `{parameter}` in operation {operation}")]
    DuplicateParameter { operation: String, parameter: String },

    #[error("Tools {first} and {second} both map to the Python name `{identifier}`")]
    ToolNameCollision {
        first: String,
        second: String,
        identifier: String,
    },

    #[error("Tool {tool} maps to `{identifier}`, which is reserved for a stub module")]
    ReservedToolName { tool: String, identifier: String },

    #[error("Duplicate policy for tool: {0}")]
    DuplicatePolicy(String),

    #[error("Invalid type expression: {0}")]
    InvalidType(String),

    #[error("Tool is not an operation of the domain: {0}")]
    UnknownTool(String),

    #[error("Invalid report: {0}")]
    InvalidReport(String),
}

impl DomainError {
    /// Check if this error was caused by caller input rather than a malformed artifact
    pub fn is_input_error(&self) -> bool {
        !matches!(self, DomainError::InvalidReport(_))
    }
}
