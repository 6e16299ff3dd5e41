//! Generate Tool Guards use case
//!
//! Orchestrates guard generation for a whole domain:
//! 1. Schedule only policies with at least one item
//! 2. Check every scheduled tool is an operation of the domain, scheduled
//!    once, with artifact paths of its own
//! 3. Save the domain stub modules and provision the environment once
//! 4. Fan out one [`GenerateToolGuardUseCase`] per tool and join them
//! 5. Persist the aggregate result

use crate::config::GenerationParams;
use crate::ports::attempt_logger::AttemptLogger;
use crate::ports::completion_gateway::CompletionGateway;
use crate::ports::domain_source::{DomainSourceError, DomainSourcePort};
use crate::ports::environment::{EnvironmentProvisionerPort, ProvisionError};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::static_checker::StaticCheckerPort;
use crate::ports::test_runner::TestRunnerPort;
use crate::use_cases::generate_tool_guard::{
    GenerateToolGuardInput, GenerateToolGuardUseCase, write_file,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use toolguard_domain::{
    DomainError, GenerationPhase, GuardLayout, RuntimeDomain, ToolGuardFailure, ToolGuardOutcome,
    ToolGuardsCodeGenerationResult, ToolPolicy,
};
use tracing::{debug, info, warn};

/// Errors that abort a whole generation run
#[derive(Error, Debug)]
pub enum GenerateToolGuardsError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Domain source error: {0}")]
    Source(#[from] DomainSourceError),

    #[error("Environment provisioning failed: {0}")]
    Provision(#[from] ProvisionError),

    #[error("Failed to write {path}: {source}")]
    Persist {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Input for the GenerateToolGuards use case
#[derive(Debug, Clone)]
pub struct GenerateToolGuardsInput {
    pub app_name: String,
    pub tool_policies: Vec<ToolPolicy>,
    /// Generation root; created if missing
    pub root: PathBuf,
    pub domain: RuntimeDomain,
}

impl GenerateToolGuardsInput {
    pub fn new(domain: RuntimeDomain, tool_policies: Vec<ToolPolicy>, root: impl Into<PathBuf>) -> Self {
        Self {
            app_name: domain.app_name.clone(),
            tool_policies,
            root: root.into(),
            domain,
        }
    }
}

/// Use case for generating guards for every policy-bearing tool
pub struct GenerateToolGuardsUseCase<G, R, S, E>
where
    G: CompletionGateway + 'static,
    R: TestRunnerPort + 'static,
    S: StaticCheckerPort + 'static,
    E: EnvironmentProvisionerPort + 'static,
{
    generator: GenerateToolGuardUseCase<G, R, S>,
    provisioner: Arc<E>,
    progress: Arc<dyn ProgressNotifier>,
    cancellation_token: Option<CancellationToken>,
}

impl<G, R, S, E> GenerateToolGuardsUseCase<G, R, S, E>
where
    G: CompletionGateway + 'static,
    R: TestRunnerPort + 'static,
    S: StaticCheckerPort + 'static,
    E: EnvironmentProvisionerPort + 'static,
{
    pub fn new(gateway: Arc<G>, runner: Arc<R>, checker: Arc<S>, provisioner: Arc<E>) -> Self {
        Self {
            generator: GenerateToolGuardUseCase::new(gateway, runner, checker),
            provisioner,
            progress: Arc::new(NoProgress),
            cancellation_token: None,
        }
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.generator = self.generator.with_params(params);
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn AttemptLogger>) -> Self {
        self.generator = self.generator.with_logger(logger);
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressNotifier>) -> Self {
        self.generator = self.generator.with_progress(progress.clone());
        self.progress = progress;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Build the domain from `source`, then generate
    pub async fn execute_from_source(
        &self,
        source: &dyn DomainSourcePort,
        app_name: &str,
        tool_policies: Vec<ToolPolicy>,
        root: impl Into<PathBuf>,
    ) -> Result<ToolGuardsCodeGenerationResult, GenerateToolGuardsError> {
        info!("Building domain of {} from {}", app_name, source.describe());
        let domain = source.load(app_name).await?;
        info!(
            "Domain {} has {} operations and {} types",
            domain.app_name,
            domain.operations.len(),
            domain.types.len()
        );
        self.execute(GenerateToolGuardsInput::new(domain, tool_policies, root))
            .await
    }

    /// Generate guards for every policy-bearing tool of `input`
    pub async fn execute(
        &self,
        input: GenerateToolGuardsInput,
    ) -> Result<ToolGuardsCodeGenerationResult, GenerateToolGuardsError> {
        let GenerateToolGuardsInput {
            app_name,
            tool_policies,
            root,
            domain,
        } = input;

        let (scheduled, skipped): (Vec<_>, Vec<_>) =
            tool_policies.into_iter().partition(ToolPolicy::has_policy);
        for policy in &skipped {
            debug!("Skipping {}: no policy items", policy.tool_name);
        }
        for policy in &scheduled {
            if domain.operation(&policy.tool_name).is_none() {
                return Err(DomainError::UnknownTool(policy.tool_name.clone()).into());
            }
        }
        GuardLayout::check_disjoint(scheduled.iter().map(|p| p.tool_name.as_str()))?;

        for file in domain.stub_files() {
            write_file(file, &root)
                .await
                .map_err(|source| GenerateToolGuardsError::Persist {
                    path: file.file_name.clone(),
                    source,
                })?;
        }

        if scheduled.is_empty() {
            info!("No tool of {} has policy items; nothing to generate", app_name);
        } else {
            info!("Provisioning environment at {}", root.display());
            self.provisioner
                .provision(&root, &domain.package_name())
                .await?;
        }

        let domain = Arc::new(domain);
        let outcomes = self.fan_out(scheduled, &domain, &root).await;

        let mut result = ToolGuardsCodeGenerationResult::new((*domain).clone());
        for outcome in outcomes {
            result = result.with_outcome(outcome);
        }

        let path = result
            .save(&root)
            .map_err(|source| GenerateToolGuardsError::Persist {
                path: root.join(toolguard_domain::generation::outcome::RESULT_FILE).display().to_string(),
                source,
            })?;
        info!(
            "{} of {} guards generated for {}; result saved to {}",
            result.succeeded().count(),
            result.tools.len(),
            app_name,
            path.display()
        );

        Ok(result)
    }

    /// Run one generator per policy concurrently and collect every outcome
    async fn fan_out(
        &self,
        policies: Vec<ToolPolicy>,
        domain: &Arc<RuntimeDomain>,
        root: &Path,
    ) -> Vec<ToolGuardOutcome> {
        let total = policies.len();
        self.progress.on_generation_start(total);

        let semaphore = self
            .generator
            .params()
            .max_concurrency
            .map(|n| Arc::new(Semaphore::new(n)));
        let mut join_set = JoinSet::new();

        for policy in policies {
            let generator = self.generator.clone();
            let semaphore = semaphore.clone();
            let token = self.cancellation_token.clone();
            let tool = policy.tool_name.clone();
            let input = GenerateToolGuardInput {
                policy,
                domain: Arc::clone(domain),
                root: root.to_path_buf(),
            };

            // Inner task isolates panics so the tool still gets an outcome
            join_set.spawn(async move {
                let worker = tokio::spawn(async move {
                    let _permit = match semaphore {
                        Some(semaphore) => semaphore.acquire_owned().await.ok(),
                        None => None,
                    };
                    match token {
                        Some(token) => tokio::select! {
                            biased;
                            _ = token.cancelled() => failed(&input.policy.tool_name, "Generation cancelled"),
                            outcome = generator.execute(&input) => outcome,
                        },
                        None => generator.execute(&input).await,
                    }
                });
                match worker.await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        warn!("Generator for {} panicked: {}", tool, e);
                        failed(&tool, &format!("Generator task failed: {e}"))
                    }
                }
            });
        }

        let mut outcomes = Vec::with_capacity(total);
        while let Some(result) = join_set.join_next().await {
            match result {
                Ok(outcome) => {
                    if outcome.is_success() {
                        info!("Guard for {} succeeded", outcome.tool_name());
                    } else {
                        warn!("Guard for {} failed", outcome.tool_name());
                    }
                    self.progress.on_tool_complete(&outcome);
                    outcomes.push(outcome);
                }
                Err(e) => {
                    warn!("Task join error: {}", e);
                }
            }
        }

        self.progress.on_generation_complete();
        outcomes
    }
}

fn failed(tool: &str, reason: &str) -> ToolGuardOutcome {
    ToolGuardOutcome::Failed(ToolGuardFailure {
        tool_name: tool.to_string(),
        attempts: 0,
        phase: GenerationPhase::GeneratingGuard,
        diagnostics: vec![reason.to_string()],
    })
}
