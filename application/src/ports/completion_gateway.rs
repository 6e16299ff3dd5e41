//! Completion gateway port
//!
//! Defines the interface for requesting code from a completion backend.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur during completion requests
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// What a completion request asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionKind {
    Guard,
    Tests,
}

impl CompletionKind {
    pub fn as_str(&self) -> &str {
        match self {
            CompletionKind::Guard => "guard",
            CompletionKind::Tests => "tests",
        }
    }
}

/// One completion request of a generation attempt
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub kind: CompletionKind,
    pub tool_name: String,
    /// 1-based attempt number
    pub attempt: u32,
    pub system_prompt: String,
    pub prompt: String,
    /// Diagnostics of the previous attempt, already rendered into `prompt`
    pub diagnostics: Vec<String>,
}

/// Gateway for completion requests
///
/// Implementations (adapters) live in the infrastructure layer. A request is
/// independent of every other one: no conversation state is kept.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    /// Return the raw completion text for a request
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GatewayError>;
}
