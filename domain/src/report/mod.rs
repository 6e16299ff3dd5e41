//! Verdicts produced by the external validators.
//!
//! - [`test_report`]: pytest JSON report, the repair feedback signal
//! - [`type_check`]: pyright diagnostics, the gate before tests run

pub mod test_report;
pub mod type_check;

pub use test_report::{Outcome, TestReport, TestResult};
pub use type_check::{Diagnostic, TypeCheckReport};
