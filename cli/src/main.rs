//! CLI entrypoint for toolguard
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use toolguard_application::{
    AttemptLogger, DomainSourcePort, GenerateToolGuardsUseCase, NoAttemptLogger, NoProgress,
    ProgressNotifier,
};
use toolguard_domain::{ToolGuardsCodeGenerationResult, ToolPolicy};
use toolguard_infrastructure::{
    ConfigLoader, FileConfig, FunctionListSource, JsonlAttemptLogger, OpenAiCompletionGateway,
    OpenApiSource, PyrightChecker, PytestRunner, VenvProvisioner,
};
use toolguard_presentation::{
    Cli, Command, ConsoleFormatter, GenerateArgs, OutputFormat, ProgressReporter, SimpleProgress,
};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {e}"))?
    };
    config.validate()?;

    let log_dir = cli.log_dir.as_deref().or(config.logging.dir.as_deref());
    let _log_guard = init_logging(cli.verbose, log_dir)?;
    info!("Starting toolguard");

    match &cli.command {
        Command::Config => {
            ConfigLoader::print_config_sources(cli.config.as_ref());
            Ok(ExitCode::SUCCESS)
        }
        Command::Show { root } => {
            let result = ToolGuardsCodeGenerationResult::load(root)
                .with_context(|| format!("No generation result under {}", root.display()))?;
            print_result(&result, cli.output);
            Ok(exit_code(&result))
        }
        Command::Generate(args) => {
            let result = generate(&cli, args, config).await?;
            print_result(&result, cli.output);
            Ok(exit_code(&result))
        }
    }
}

/// Initialize logging based on verbosity level; `RUST_LOG` takes precedence.
fn init_logging(verbose: u8, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    });

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Cannot create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, "toolguard.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();
    Ok(guard)
}

async fn generate(
    cli: &Cli,
    args: &GenerateArgs,
    config: FileConfig,
) -> Result<ToolGuardsCodeGenerationResult> {
    let app_name = args
        .resolved_app_name()
        .ok_or_else(|| anyhow!("Cannot derive an application name; pass --app-name"))?;
    let policies = load_policies(&args.policies, &args.only)?;

    let source: Box<dyn DomainSourcePort> = match (&args.functions, &args.openapi) {
        (Some(path), _) => Box::new(FunctionListSource::new(path)),
        (None, Some(path)) => Box::new(OpenApiSource::new(path)),
        (None, None) => bail!("Either --functions or --openapi is required"),
    };

    let mut params = config.generation.to_params();
    if let Some(max_attempts) = args.max_attempts {
        params = params.with_max_attempts(max_attempts);
    }
    if let Some(max_concurrency) = args.max_concurrency {
        params = params.with_max_concurrency(Some(max_concurrency));
    }

    // === Dependency Injection ===
    let runner_timeout = std::time::Duration::from_secs(config.runner.timeout_secs);
    let checker_timeout = config
        .checker
        .timeout_secs
        .map(std::time::Duration::from_secs)
        .unwrap_or(runner_timeout);
    let venv_dir = config.environment.venv_dir.clone();

    let gateway = Arc::new(OpenAiCompletionGateway::from_config(&config.completion)?);
    let runner = Arc::new(PytestRunner::new(&venv_dir, runner_timeout));
    let checker = Arc::new(PyrightChecker::new(
        config.checker.command.clone(),
        &venv_dir,
        checker_timeout,
    ));
    let provisioner = Arc::new(VenvProvisioner::new(&config.environment));

    let attempt_log = if config.logging.attempt_log {
        JsonlAttemptLogger::in_root(&args.root)
    } else {
        None
    };
    let logger: Arc<dyn AttemptLogger> = match attempt_log {
        Some(logger) => {
            info!("Attempt log: {}", logger.path().display());
            Arc::new(logger)
        }
        None => Arc::new(NoAttemptLogger),
    };

    let progress: Arc<dyn ProgressNotifier> = if cli.quiet || cli.output == OutputFormat::Json {
        Arc::new(NoProgress)
    } else if std::io::IsTerminal::is_terminal(&std::io::stderr()) {
        Arc::new(ProgressReporter::new())
    } else {
        Arc::new(SimpleProgress)
    };

    let cancellation = CancellationToken::new();
    let on_interrupt = cancellation.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted; cancelling generation");
            on_interrupt.cancel();
        }
    });

    let use_case = GenerateToolGuardsUseCase::new(gateway, runner, checker, provisioner)
        .with_params(params)
        .with_logger(logger)
        .with_progress(progress)
        .with_cancellation(cancellation);

    let result = use_case
        .execute_from_source(source.as_ref(), &app_name, policies, args.root.clone())
        .await?;
    Ok(result)
}

/// Read the policy file, keeping only `only` tools when given.
fn load_policies(path: &Path, only: &[String]) -> Result<Vec<ToolPolicy>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read policies from {}", path.display()))?;
    let policies: Vec<ToolPolicy> = serde_json::from_str(&content)
        .with_context(|| format!("Invalid policy file {}", path.display()))?;

    if only.is_empty() {
        return Ok(policies);
    }
    for name in only {
        if !policies.iter().any(|p| &p.tool_name == name) {
            bail!("--only {name}: no policy for this tool in {}", path.display());
        }
    }
    Ok(policies
        .into_iter()
        .filter(|p| only.contains(&p.tool_name))
        .collect())
}

fn print_result(result: &ToolGuardsCodeGenerationResult, format: OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", ConsoleFormatter::format(result)),
        OutputFormat::Json => println!("{}", ConsoleFormatter::format_json(result)),
    }
}

fn exit_code(result: &ToolGuardsCodeGenerationResult) -> ExitCode {
    if result.all_succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
