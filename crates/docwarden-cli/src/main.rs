//! docwarden CLI
//!
//! Main entry point for the `docwarden` binary.

use std::process::ExitCode;

use clap::Parser;
use docwarden_cli::cli::{Cli, Outcome};
use docwarden_cli::CliError;
use docwarden_common_log::{LogConfig, LogLevel};
use tracing::error;

/// Application exit codes
#[repr(u8)]
pub enum Exit {
    Allowed = 0,
    Denied = 1,
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        ExitCode::from(exit as u8)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(&cli);

    match run(cli) {
        Ok(Outcome::Allowed | Outcome::Done) => Exit::Allowed.into(),
        Ok(Outcome::Denied) => Exit::Denied.into(),
        Err(e) => {
            error!(code = e.code(), "{e}");
            eprintln!("error[{}]: {e}", e.code());
            if let Some(hint) = e.hint() {
                eprintln!("hint: {hint}");
            }
            e.exit_code()
        }
    }
}

fn run(cli: Cli) -> Result<Outcome, CliError> {
    let config = cli.load_config()?;
    cli.execute(config)
}

fn init_tracing(cli: &Cli) {
    let level = if cli.quiet {
        LogLevel::Error
    } else {
        LogLevel::from_verbosity(cli.verbose)
    };

    if let Err(e) = docwarden_common_log::init(LogConfig::from_env().with_level(level)) {
        eprintln!("warning: {e}");
    }
}
