//! CLI argument definitions using clap derive macros.

use std::path::{Path, PathBuf};

use clap::{ArgAction, ColorChoice, Parser, Subcommand, ValueHint};
use cxs_common_config::{vars, ConfigLoader, CxsConfig, Environment, WorkspacePaths};
use cxs_common_log::{spans::command_span, LogConfig, LogFormat, LogLevel};
use tracing::debug;

use crate::commands::{LogRunCommand, NewCycleCommand, ValidateCommand};
use crate::error::CliError;
use crate::output::color::ColorMode;

/// CXS - Context Exchange System
///
/// Record agent runs in the run ledger and audit it.
#[derive(Debug, Parser)]
#[command(
    name = "cxs",
    author,
    version,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true,
    after_help = "\
Examples:
  cxs new-cycle --name feature-auth --log-changelog
  cxs log-run -s run-001 -c process.contract -a claude --status completed -n \"Task done\"
  cxs validate"
)]
pub struct Cli {
    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Workspace root holding the ledger and cycle files
    #[arg(
        long,
        global = true,
        env = vars::CXS_ROOT,
        value_hint = ValueHint::DirPath
    )]
    pub root: Option<PathBuf>,

    /// Path to configuration file
    #[arg(
        long,
        global = true,
        env = vars::CXS_CONFIG,
        value_hint = ValueHint::FilePath
    )]
    pub config: Option<PathBuf>,

    /// When to use terminal colors
    #[arg(long, global = true, default_value = "auto", value_enum)]
    pub color: ColorChoice,

    /// Output format
    #[arg(long, global = true, default_value = "text", value_enum)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Available subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Append a run to the ledger
    LogRun(LogRunCommand),

    /// Check every row of the ledger
    Validate(ValidateCommand),

    /// Start a new cycle
    NewCycle(NewCycleCommand),

    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsCommand),
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::LogRun(_) => "log-run",
            Self::Validate(_) => "validate",
            Self::NewCycle(_) => "new-cycle",
            Self::Completions(_) => "completions",
        }
    }
}

/// Shell completions generation
#[derive(Debug, Parser)]
pub struct CompletionsCommand {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

impl CompletionsCommand {
    /// Write the completion script to stdout
    pub fn execute(&self) -> Result<(), CliError> {
        use clap::CommandFactory;
        use clap_complete::generate;

        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(self.shell, &mut cmd, name, &mut std::io::stdout());
        Ok(())
    }
}

impl Cli {
    /// Workspace root from `--root`/`CXS_ROOT`, else the current directory
    pub fn workspace_root(&self) -> Result<PathBuf, CliError> {
        match &self.root {
            Some(root) => Ok(root.clone()),
            None => std::env::current_dir().map_err(|e| {
                CliError::io_with_path("Cannot determine the current directory", e, ".")
            }),
        }
    }

    /// Load configuration from `--config` or the workspace default location
    pub fn load_config(&self, root: &Path) -> Result<CxsConfig, CliError> {
        let loader = ConfigLoader::new(root);
        let config = match &self.config {
            Some(path) => loader.load_from(path)?,
            None => loader.load()?,
        };
        Ok(config)
    }

    /// Logging settings: config file, then `CXS_LOG_*`, then `-v`/`-q`
    pub fn log_config(&self, config: &CxsConfig) -> LogConfig {
        let mut log = LogConfig::default();
        if let Some(level) = LogLevel::parse(&config.logging.level) {
            log.level = level;
        }
        if let Some(format) = LogFormat::parse(&config.logging.format) {
            log.format = format;
        }

        log.merge_env(|var| std::env::var(var).ok())
            .with_verbosity(self.verbose, self.quiet)
            .with_ansi(self.color_mode().for_stderr().enabled())
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color.into()
    }

    /// Execute the selected command
    pub fn execute(self) -> Result<(), CliError> {
        if let Command::Completions(cmd) = &self.command {
            return cmd.execute();
        }

        let root = self.workspace_root()?;
        Environment::init(&root)?;
        let config = self.load_config(&root)?;
        cxs_common_log::init(self.log_config(&config))?;

        let span = command_span(self.command.name());
        let _guard = span.enter();
        debug!(root = %root.display(), "loaded workspace configuration");

        let ctx = CommandContext {
            paths: config.resolve(&root),
            config,
            format: self.format,
            color: self.color_mode().for_stdout(),
            verbose: self.verbose,
        };

        match self.command {
            Command::LogRun(cmd) => cmd.execute(&ctx),
            Command::Validate(cmd) => cmd.execute(&ctx),
            Command::NewCycle(cmd) => cmd.execute(&ctx),
            Command::Completions(cmd) => cmd.execute(),
        }
    }
}

/// Context passed to all commands
#[derive(Debug)]
pub struct CommandContext {
    pub config: CxsConfig,
    pub paths: WorkspacePaths,
    pub format: OutputFormat,
    /// Color mode already resolved for stdout.
    pub color: ColorMode,
    pub verbose: u8,
}

impl CommandContext {
    /// Context for a workspace with default settings and plain text output.
    pub fn for_root(root: impl AsRef<Path>) -> Self {
        let config = CxsConfig::default();
        Self {
            paths: config.resolve(root),
            config,
            format: OutputFormat::Text,
            color: ColorMode::Never,
            verbose: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_log_run_short_flags() {
        let cli = Cli::try_parse_from([
            "cxs", "log-run", "-s", "s1", "-c", "process.contract", "-a", "agent-x",
            "--status", "completed", "-r", "1500", "-n", "done", "-t", "2025-01-15T10:30:00Z",
        ])
        .unwrap();

        match cli.command {
            Command::LogRun(cmd) => {
                assert_eq!(cmd.session, "s1");
                assert_eq!(cmd.contract, "process.contract");
                assert_eq!(cmd.notes.as_deref(), Some("done"));
                assert_eq!(cmd.timestamp.as_deref(), Some("2025-01-15T10:30:00Z"));
            }
            other => panic!("Expected log-run, got {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["cxs", "validate", "-vv", "--format", "json"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["cxs", "-q", "-v", "validate"]).is_err());
    }

    #[test]
    fn test_log_config_layers_flags_over_file() {
        let cli = Cli::try_parse_from(["cxs", "--color", "never", "-v", "validate"]).unwrap();
        let mut config = CxsConfig::default();
        config.logging.level = "error".to_string();
        config.logging.format = "json".to_string();

        let log = cli.log_config(&config);
        assert_eq!(log.level, LogLevel::Info);
        assert!(!log.ansi);
    }
}
