//! CLI command definitions

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for generation results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored per-tool summary
    Text,
    /// The persisted result document
    Json,
}

/// CLI arguments for toolguard
#[derive(Parser, Debug)]
#[command(name = "toolguard")]
#[command(author, version, about = "Generate and validate policy guards for tool-calling agents")]
#[command(long_about = r#"
toolguard turns natural-language tool policies into Python guard functions.

For every tool with a policy it:
1. Asks the completion backend for a guard and a pytest suite
2. Type checks both with pyright
3. Runs the suite, feeding failures back into the next attempt

Configuration files are loaded from (in priority order):
1. TOOLGUARD_* environment variables (TOOLGUARD_GENERATION__MAX_ATTEMPTS=5)
2. --config <path>          Explicit config file
3. ./toolguard.toml         Project-level config
4. ~/.config/toolguard/config.toml   Global config

Example:
  toolguard generate --policies policies.json --functions functions.json --root out/
  toolguard generate --policies policies.json --openapi petstore.yaml --root out/ --only get_pet
  toolguard show --root out/ -o json
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Also write daily-rolling operation logs to this directory
    #[arg(long, value_name = "DIR", global = true)]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate guards for every tool with a policy
    Generate(GenerateArgs),

    /// Print a persisted generation result
    Show {
        /// Generation root holding result.json
        #[arg(long, value_name = "DIR")]
        root: PathBuf,
    },

    /// Show configuration file locations
    Config,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["functions", "openapi"])))]
pub struct GenerateArgs {
    /// JSON array of tool policies
    #[arg(long, value_name = "FILE")]
    pub policies: PathBuf,

    /// Function list descriptor (JSON)
    #[arg(long, value_name = "FILE")]
    pub functions: Option<PathBuf>,

    /// OpenAPI 3 document (JSON or YAML)
    #[arg(long, value_name = "FILE")]
    pub openapi: Option<PathBuf>,

    /// Generation root; created if missing
    #[arg(long, value_name = "DIR")]
    pub root: PathBuf,

    /// Application name; defaults to the name of the source file
    #[arg(long, value_name = "NAME")]
    pub app_name: Option<String>,

    /// Attempts per tool before giving up
    #[arg(long, value_name = "N")]
    pub max_attempts: Option<u32>,

    /// Tools generated concurrently (default: all)
    #[arg(long, value_name = "N")]
    pub max_concurrency: Option<usize>,

    /// Only generate guards for these tools (can be specified multiple times)
    #[arg(long, value_name = "TOOL")]
    pub only: Vec<String>,
}

impl GenerateArgs {
    /// Source file the domain is read from
    pub fn source_path(&self) -> Option<&PathBuf> {
        self.functions.as_ref().or(self.openapi.as_ref())
    }

    /// Explicit application name, else the source file stem
    pub fn resolved_app_name(&self) -> Option<String> {
        self.app_name.clone().or_else(|| {
            self.source_path()
                .and_then(|path| path.file_stem())
                .map(|stem| stem.to_string_lossy().into_owned())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_with_function_list() {
        let cli = Cli::try_parse_from([
            "toolguard",
            "-vv",
            "generate",
            "--policies",
            "policies.json",
            "--functions",
            "bank.json",
            "--root",
            "out",
            "--only",
            "transfer",
            "--only",
            "refund",
            "-o",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.output, OutputFormat::Json);
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.only, vec!["transfer", "refund"]);
        assert_eq!(args.resolved_app_name().as_deref(), Some("bank"));
        assert!(args.openapi.is_none());
    }

    #[test]
    fn test_generate_requires_exactly_one_source() {
        let missing = Cli::try_parse_from(["toolguard", "generate", "--policies", "p.json", "--root", "out"]);
        assert!(missing.is_err());

        let both = Cli::try_parse_from([
            "toolguard",
            "generate",
            "--policies",
            "p.json",
            "--root",
            "out",
            "--functions",
            "f.json",
            "--openapi",
            "api.yaml",
        ]);
        assert!(both.is_err());
    }

    #[test]
    fn test_explicit_app_name_wins() {
        let cli = Cli::try_parse_from([
            "toolguard",
            "generate",
            "--policies",
            "p.json",
            "--openapi",
            "specs/petstore.yaml",
            "--root",
            "out",
            "--app-name",
            "Pet Store",
        ])
        .unwrap();
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.resolved_app_name().as_deref(), Some("Pet Store"));
    }

    #[test]
    fn test_show_and_config() {
        let cli = Cli::try_parse_from(["toolguard", "show", "--root", "out", "-q"]).unwrap();
        assert!(cli.quiet);
        assert!(matches!(cli.command, Command::Show { .. }));

        let cli = Cli::try_parse_from(["toolguard", "--no-config", "config", "--log-dir", "logs"]).unwrap();
        assert!(cli.no_config);
        assert_eq!(cli.log_dir, Some(PathBuf::from("logs")));
        assert!(matches!(cli.command, Command::Config));
    }
}
