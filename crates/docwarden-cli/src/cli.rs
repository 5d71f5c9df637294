//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};
use docwarden_common_config::{vars, ConfigLoader, Environment, WardenConfig};

use crate::commands::{CheckCommand, RulesCommand};
use crate::error::CliError;

/// docwarden - document access rules for the todo/profile app
///
/// Evaluate access decisions and inspect the active rule set.
#[derive(Debug, Parser)]
#[command(
    name = "docwarden",
    version,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(
        short,
        long,
        global = true,
        env = vars::DOCWARDEN_CONFIG_PATH,
        value_hint = ValueHint::FilePath
    )]
    pub config: Option<PathBuf>,

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
    /// Decide a single operation
    Check(CheckCommand),

    /// Print the default rule table
    Rules(RulesCommand),
}

/// How a command finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Allowed,
    Denied,
    Done,
}

impl Cli {
    /// Load configuration from the given file, or from `.docwarden/` in the
    /// current directory, then apply environment overrides.
    pub fn load_config(&self) -> Result<WardenConfig, CliError> {
        Environment::init()?;

        let mut config = match &self.config {
            Some(path) => ConfigLoader::default().load_file(path)?,
            None => ConfigLoader::default().load()?,
        };
        Environment::apply_overrides(&mut config)?;
        Ok(config)
    }

    /// Execute the selected command
    pub fn execute(self, config: WardenConfig) -> Result<Outcome, CliError> {
        let ctx = CommandContext {
            config,
            format: self.format,
            quiet: self.quiet,
        };

        match self.command {
            Command::Check(cmd) => cmd.execute(&ctx),
            Command::Rules(cmd) => cmd.execute(&ctx),
        }
    }
}

/// Context passed to all commands
#[derive(Debug)]
pub struct CommandContext {
    pub config: WardenConfig,
    pub format: OutputFormat,
    pub quiet: bool,
}
