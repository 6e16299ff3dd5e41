//! Progress notification port
//!
//! Defines the interface for reporting progress during guard generation.

use toolguard_domain::{GenerationPhase, ToolGuardOutcome};

/// Callback for progress updates during guard generation
///
/// Implementations live in the presentation layer. Generators run
/// concurrently, so callbacks for different tools interleave.
pub trait ProgressNotifier: Send + Sync {
    /// Called once tools are scheduled
    fn on_generation_start(&self, total_tools: usize);

    /// Called on every phase change of a tool's generator
    fn on_phase(&self, tool: &str, attempt: u32, phase: GenerationPhase);

    /// Called when a tool reaches its outcome
    fn on_tool_complete(&self, outcome: &ToolGuardOutcome);

    /// Called after all tools completed
    fn on_generation_complete(&self) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_generation_start(&self, _total_tools: usize) {}
    fn on_phase(&self, _tool: &str, _attempt: u32, _phase: GenerationPhase) {}
    fn on_tool_complete(&self, _outcome: &ToolGuardOutcome) {}
}
