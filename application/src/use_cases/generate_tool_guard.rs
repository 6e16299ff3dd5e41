//! Generate Tool Guard use case
//!
//! The per-tool repair loop. Each attempt runs four phases:
//!
//! 1. **Generating guard** - completion request for the guard module
//! 2. **Generating tests** - completion request for its test suite
//! 3. **Type checking** - static check of both files, gate before execution
//! 4. **Testing** - run the suite; valid reports end the loop
//!
//! A failing attempt feeds its diagnostics and sources into the next one.
//! Running out of attempts yields a failed outcome, never an error.

use crate::config::GenerationParams;
use crate::ports::attempt_logger::{AttemptEvent, AttemptLogger, NoAttemptLogger};
use crate::ports::completion_gateway::{CompletionGateway, CompletionKind, CompletionRequest};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::static_checker::StaticCheckerPort;
use crate::ports::test_runner::TestRunnerPort;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use toolguard_domain::{
    FileTwin, GenerationPhase, GuardLayout, GuardPromptTemplate, PreviousAttempt, RuntimeDomain,
    ToolGuardCode, ToolGuardFailure, ToolGuardOutcome, ToolPolicy, extract_python_code,
};
use tracing::{debug, info, warn};

/// Input for the GenerateToolGuard use case
#[derive(Debug, Clone)]
pub struct GenerateToolGuardInput {
    pub policy: ToolPolicy,
    pub domain: Arc<RuntimeDomain>,
    /// Generation root, already provisioned
    pub root: PathBuf,
}

/// Mutable state of the attempt in flight, kept outside the attempt future
/// so a timed-out attempt still reports where it stopped.
#[derive(Default)]
struct AttemptState {
    phase: Option<GenerationPhase>,
    guard: Option<FileTwin>,
    tests: Option<FileTwin>,
}

impl AttemptState {
    fn into_previous(self, attempt: u32, diagnostics: Vec<String>) -> PreviousAttempt {
        let mut previous = PreviousAttempt::new(
            attempt,
            self.phase.unwrap_or(GenerationPhase::GeneratingGuard),
            diagnostics,
        );
        if let Some(guard) = self.guard {
            previous = previous.with_guard(guard);
        }
        if let Some(tests) = self.tests {
            previous = previous.with_tests(tests);
        }
        previous
    }
}

/// Use case for generating and validating one tool's guard
pub struct GenerateToolGuardUseCase<G, R, S>
where
    G: CompletionGateway + 'static,
    R: TestRunnerPort + 'static,
    S: StaticCheckerPort + 'static,
{
    gateway: Arc<G>,
    runner: Arc<R>,
    checker: Arc<S>,
    logger: Arc<dyn AttemptLogger>,
    progress: Arc<dyn ProgressNotifier>,
    params: GenerationParams,
}

impl<G, R, S> Clone for GenerateToolGuardUseCase<G, R, S>
where
    G: CompletionGateway + 'static,
    R: TestRunnerPort + 'static,
    S: StaticCheckerPort + 'static,
{
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            runner: self.runner.clone(),
            checker: self.checker.clone(),
            logger: self.logger.clone(),
            progress: self.progress.clone(),
            params: self.params.clone(),
        }
    }
}

impl<G, R, S> GenerateToolGuardUseCase<G, R, S>
where
    G: CompletionGateway + 'static,
    R: TestRunnerPort + 'static,
    S: StaticCheckerPort + 'static,
{
    pub fn new(gateway: Arc<G>, runner: Arc<R>, checker: Arc<S>) -> Self {
        Self {
            gateway,
            runner,
            checker,
            logger: Arc::new(NoAttemptLogger),
            progress: Arc::new(NoProgress),
            params: GenerationParams::default(),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn AttemptLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressNotifier>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    /// Run the repair loop until the guard validates or attempts run out
    pub async fn execute(&self, input: &GenerateToolGuardInput) -> ToolGuardOutcome {
        let tool = input.policy.tool_name.as_str();
        let layout = GuardLayout::new(&input.domain, tool);
        let max_attempts = self.params.max_attempts.max(1);
        let mut previous: Option<PreviousAttempt> = None;

        info!("Generating guard for {} ({} policy items)", tool, input.policy.policy_items.len());

        for attempt in 1..=max_attempts {
            let mut state = AttemptState::default();

            let result = tokio::time::timeout(
                self.params.attempt_timeout,
                self.run_attempt(input, &layout, attempt, previous.as_ref(), &mut state),
            )
            .await
            .unwrap_or_else(|_| {
                Err(vec![format!(
                    "Attempt timed out after {}s",
                    self.params.attempt_timeout.as_secs()
                )])
            });

            match result {
                Ok(code) => {
                    info!("Guard for {} validated on attempt {}", tool, attempt);
                    self.log_verdict(tool, attempt, GenerationPhase::Success, &[]);
                    self.progress.on_phase(tool, attempt, GenerationPhase::Success);
                    return ToolGuardOutcome::Succeeded(code);
                }
                Err(diagnostics) => {
                    let failed = state.into_previous(attempt, diagnostics);
                    warn!(
                        "Attempt {}/{} for {} failed during {} with {} diagnostic(s)",
                        attempt,
                        max_attempts,
                        tool,
                        failed.phase,
                        failed.diagnostics.len()
                    );
                    self.log_verdict(tool, attempt, failed.phase, &failed.diagnostics);
                    if attempt < max_attempts {
                        self.progress.on_phase(tool, attempt, GenerationPhase::Retry);
                    }
                    previous = Some(failed);
                }
            }
        }

        self.progress.on_phase(tool, max_attempts, GenerationPhase::Exhausted);
        let (phase, diagnostics) = match previous {
            Some(last) => (last.phase, last.diagnostics),
            None => (GenerationPhase::GeneratingGuard, Vec::new()),
        };
        warn!("Giving up on {} after {} attempts", tool, max_attempts);

        ToolGuardOutcome::Failed(ToolGuardFailure {
            tool_name: tool.to_string(),
            attempts: max_attempts,
            phase,
            diagnostics,
        })
    }

    /// One attempt; `Err` carries the diagnostics for the next one.
    async fn run_attempt(
        &self,
        input: &GenerateToolGuardInput,
        layout: &GuardLayout,
        attempt: u32,
        previous: Option<&PreviousAttempt>,
        state: &mut AttemptState,
    ) -> Result<ToolGuardCode, Vec<String>> {
        let tool = layout.tool_name.as_str();
        let domain = input.domain.as_ref();
        let root = input.root.as_path();
        let diagnostics: Vec<String> = previous.map(|p| p.diagnostics.clone()).unwrap_or_default();

        // Phase 1: guard
        self.enter(state, tool, attempt, GenerationPhase::GeneratingGuard);
        let request = CompletionRequest {
            kind: CompletionKind::Guard,
            tool_name: tool.to_string(),
            attempt,
            system_prompt: GuardPromptTemplate::guard_system().to_string(),
            prompt: GuardPromptTemplate::guard_prompt(domain, &input.policy, layout, previous),
            diagnostics: diagnostics.clone(),
        };
        let guard = FileTwin::new(layout.guard_file(), self.complete(&request).await?);
        save(&guard, root).await?;
        save(&FileTwin::new(layout.init_file(), ""), root).await?;
        state.guard = Some(guard.clone());

        // Phase 2: tests
        self.enter(state, tool, attempt, GenerationPhase::GeneratingTests);
        let request = CompletionRequest {
            kind: CompletionKind::Tests,
            tool_name: tool.to_string(),
            attempt,
            system_prompt: GuardPromptTemplate::tests_system().to_string(),
            prompt: GuardPromptTemplate::tests_prompt(domain, &input.policy, layout, &guard, previous),
            diagnostics,
        };
        let tests = FileTwin::new(layout.test_file(), self.complete(&request).await?);
        save(&tests, root).await?;
        state.tests = Some(tests.clone());

        // Phase 3: type check
        self.enter(state, tool, attempt, GenerationPhase::TypeChecking);
        let files = [guard.file_name.clone(), tests.file_name.clone()];
        let type_check = self
            .checker
            .check(root, &files)
            .await
            .map_err(|e| vec![format!("Type checker failed to run: {e}")])?;
        if !type_check.passed() {
            return Err(type_check.list_errors());
        }

        // Phase 4: tests
        self.enter(state, tool, attempt, GenerationPhase::Testing);
        let report_file = layout.report_file(attempt);
        let report = self
            .runner
            .run(root, &tests.file_name, &report_file)
            .await
            .map_err(|e| vec![format!("Test runner failed: {e}")])?;

        if !report.is_valid() {
            let mut errors = report.list_errors();
            if errors.is_empty() {
                errors.push(if report.non_empty_tests() {
                    "Test run did not pass".to_string()
                } else {
                    format!("No tests were collected from {}", tests.file_name)
                });
            }
            return Err(errors);
        }

        Ok(ToolGuardCode {
            tool_name: tool.to_string(),
            guard_fn_name: layout.guard_fn_name(),
            guard_file: guard,
            test_file: tests,
            report_file,
            attempts: attempt,
        })
    }

    fn enter(&self, state: &mut AttemptState, tool: &str, attempt: u32, phase: GenerationPhase) {
        debug!("{} attempt {}: {}", tool, attempt, phase);
        state.phase = Some(phase);
        self.progress.on_phase(tool, attempt, phase);
    }

    /// Request a completion and extract its code.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, Vec<String>> {
        self.logger.log(AttemptEvent::new(
            "completion_request",
            request.tool_name.as_str(),
            request.attempt,
            json!({
                "kind": request.kind,
                "system_prompt": request.system_prompt,
                "prompt": request.prompt,
            }),
        ));

        let text = match self.gateway.complete(request).await {
            Ok(text) => text,
            Err(e) => {
                warn!("{} completion for {} failed: {}", request.kind.as_str(), request.tool_name, e);
                return Err(vec![format!("{} completion failed: {e}", request.kind.as_str())]);
            }
        };

        self.logger.log(AttemptEvent::new(
            "completion_response",
            request.tool_name.as_str(),
            request.attempt,
            json!({ "kind": request.kind, "text": text }),
        ));

        Ok(extract_python_code(&text))
    }

    fn log_verdict(&self, tool: &str, attempt: u32, phase: GenerationPhase, diagnostics: &[String]) {
        self.logger.log(AttemptEvent::new(
            "attempt_verdict",
            tool,
            attempt,
            json!({
                "passed": phase == GenerationPhase::Success,
                "phase": phase,
                "diagnostics": diagnostics,
            }),
        ));
    }
}

async fn save(file: &FileTwin, root: &std::path::Path) -> Result<(), Vec<String>> {
    write_file(file, root)
        .await
        .map_err(|e| vec![format!("Failed to write {}: {e}", file.file_name)])
}

/// Write `file` under `root` without blocking the runtime.
pub(crate) async fn write_file(file: &FileTwin, root: &std::path::Path) -> std::io::Result<()> {
    let path = file.path_in(root);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&path, &file.content).await
}
