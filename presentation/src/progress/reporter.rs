//! Progress reporting for guard generation

use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use toolguard_application::ProgressNotifier;
use toolguard_domain::{GenerationPhase, ToolGuardOutcome};

/// Reports progress with an overall bar and one spinner per running tool
pub struct ProgressReporter {
    multi: MultiProgress,
    overall: Mutex<Option<ProgressBar>>,
    tools: Mutex<HashMap<String, ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            overall: Mutex::new(None),
            tools: Mutex::new(HashMap::new()),
        }
    }

    fn overall_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn tool_bar(&self, tool: &str) -> Option<ProgressBar> {
        let mut tools = self.tools.lock().ok()?;
        let bar = tools.entry(tool.to_string()).or_insert_with(|| {
            let bar = self.multi.add(ProgressBar::new_spinner());
            bar.set_style(Self::spinner_style());
            bar.set_prefix(tool.to_string());
            bar.enable_steady_tick(Duration::from_millis(120));
            bar
        });
        Some(bar.clone())
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// One-line status for a finished tool
fn outcome_line(outcome: &ToolGuardOutcome) -> String {
    match outcome {
        ToolGuardOutcome::Succeeded(code) => format!(
            "{} {} (attempt {})",
            "v".green(),
            code.tool_name,
            code.attempts
        ),
        ToolGuardOutcome::Failed(failure) => format!(
            "{} {} ({} after {} attempt(s))",
            "x".red(),
            failure.tool_name,
            failure.phase,
            failure.attempts
        ),
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_generation_start(&self, total_tools: usize) {
        let bar = self.multi.add(ProgressBar::new(total_tools as u64));
        bar.set_style(Self::overall_style());
        bar.set_prefix("Generating guards");
        if let Ok(mut overall) = self.overall.lock() {
            *overall = Some(bar);
        }
    }

    fn on_phase(&self, tool: &str, attempt: u32, phase: GenerationPhase) {
        if let Some(bar) = self.tool_bar(tool) {
            bar.set_message(format!("attempt {}: {}", attempt, phase.display_name()));
        }
    }

    fn on_tool_complete(&self, outcome: &ToolGuardOutcome) {
        let bar = self
            .tools
            .lock()
            .ok()
            .and_then(|mut tools| tools.remove(outcome.tool_name()));
        if let Some(bar) = bar {
            bar.finish_and_clear();
            self.multi.remove(&bar);
        }

        if let Ok(overall) = self.overall.lock()
            && let Some(bar) = overall.as_ref()
        {
            bar.println(outcome_line(outcome));
            bar.inc(1);
        }
    }

    fn on_generation_complete(&self) {
        if let Some(bar) = self.overall.lock().ok().and_then(|mut overall| overall.take()) {
            bar.finish_with_message("done".green().to_string());
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_generation_start(&self, total_tools: usize) {
        println!(
            "{} {} ({} tools)",
            "->".cyan(),
            "Generating guards".bold(),
            total_tools
        );
    }

    fn on_phase(&self, tool: &str, attempt: u32, phase: GenerationPhase) {
        if phase == GenerationPhase::Retry {
            println!("  {} {} attempt {} rejected, retrying", "~".yellow(), tool, attempt);
        }
    }

    fn on_tool_complete(&self, outcome: &ToolGuardOutcome) {
        println!("  {}", outcome_line(outcome));
    }

    fn on_generation_complete(&self) {
        println!();
    }
}
