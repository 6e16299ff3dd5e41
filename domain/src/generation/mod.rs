//! Guard generation state and results

pub mod attempt;
pub mod code_block;
pub mod layout;
pub mod outcome;
pub mod phase;

pub use attempt::PreviousAttempt;
pub use code_block::extract_python_code;
pub use layout::GuardLayout;
pub use outcome::{ToolGuardCode, ToolGuardFailure, ToolGuardOutcome, ToolGuardsCodeGenerationResult};
pub use phase::GenerationPhase;
