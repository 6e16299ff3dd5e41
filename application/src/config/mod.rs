//! Application-level configuration.
//!
//! - [`GenerationParams`]: repair loop and fan-out control (attempts, timeouts, concurrency)

pub mod generation_params;

pub use generation_params::GenerationParams;
