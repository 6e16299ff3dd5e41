//! Domain layer for toolguard
//!
//! This crate contains the value objects of guard generation. It has no
//! dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Runtime domain
//!
//! The operations and types of the application whose tools are guarded,
//! rendered as Python stub modules that generated code imports.
//!
//! ## Tool policy
//!
//! Natural-language constraints on one tool. Each policy with at least one
//! item becomes one guard function plus a test suite validating it.
//!
//! ## Reports
//!
//! Type-check and test reports are the feedback that drives repair: an
//! attempt whose reports are not clean is retried with their errors.

pub mod api;
pub mod core;
pub mod files;
pub mod generation;
pub mod policy;
pub mod prompt;
pub mod report;

// Re-export commonly used types
pub use api::{
    entities::{DomainType, DomainTypeKind, Operation, Parameter, RuntimeDomain},
    type_ref::TypeRef,
};
pub use core::error::DomainError;
pub use files::FileTwin;
pub use generation::{
    GenerationPhase, GuardLayout, PreviousAttempt, ToolGuardCode, ToolGuardFailure,
    ToolGuardOutcome, ToolGuardsCodeGenerationResult, extract_python_code,
};
pub use policy::{ToolPolicy, ToolPolicyItem};
pub use prompt::GuardPromptTemplate;
pub use report::{Diagnostic, Outcome, TestReport, TestResult, TypeCheckReport};
