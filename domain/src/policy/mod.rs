//! Tool usage policies.

pub mod entities;

pub use entities::{ToolPolicy, ToolPolicyItem};
