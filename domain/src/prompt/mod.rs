//! Prompt domain
//!
//! Templates for the guard and test completion requests of each attempt.

mod template;

pub use template::GuardPromptTemplate;
