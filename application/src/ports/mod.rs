//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod attempt_logger;
pub mod completion_gateway;
pub mod domain_source;
pub mod environment;
pub mod progress;
pub mod static_checker;
pub mod test_runner;
