//! Application layer for toolguard
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::GenerationParams;
pub use ports::{
    attempt_logger::{AttemptEvent, AttemptLogger, NoAttemptLogger},
    completion_gateway::{CompletionGateway, CompletionKind, CompletionRequest, GatewayError},
    domain_source::{DomainSourceError, DomainSourcePort},
    environment::{EnvironmentProvisionerPort, ProvisionError},
    progress::{NoProgress, ProgressNotifier},
    static_checker::StaticCheckerPort,
    test_runner::{RunnerError, TestRunnerPort},
};
pub use use_cases::generate_tool_guard::{GenerateToolGuardInput, GenerateToolGuardUseCase};
pub use use_cases::generate_tool_guards::{
    GenerateToolGuardsError, GenerateToolGuardsInput, GenerateToolGuardsUseCase,
};
