//! Use cases (application services)
//!
//! Use cases orchestrate domain logic and port interactions.

pub mod generate_tool_guard;
pub mod generate_tool_guards;
