// docreg CLI - document register vs. storage reconciliation

mod exit_codes;
mod parse;
mod recon;
mod register;

use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use exit_codes::{recon_exit_code, EXIT_RECON_RUNTIME, EXIT_SUCCESS, EXIT_USAGE};

/// Environment variable holding the log filter (e.g. `debug`, `docreg_recon=debug`).
const LOG_ENV: &str = "DOCREG_LOG";

#[derive(Parser)]
#[command(name = "docreg")]
#[command(about = "Reconcile a document register against project file storage")]
#[command(version)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug); DOCREG_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile a register against storage (exit 0 = consistent, exit 1 = divergences)
    Recon {
        #[command(subcommand)]
        command: recon::ReconCommands,
    },

    /// Inspect the document register
    Register {
        #[command(subcommand)]
        command: register::RegisterCommands,
    },

    /// Parse document filenames against the naming convention
    #[command(after_help = "\
Examples:
  docreg parse 25.2016.00.PC.ARQ.004.PLA.R02.pdf
  docreg parse 25.2016.00.PC.ARQ.004.PLA.R02.pdf --year 2025 --project 2016
  docreg parse *.pdf --json")]
    Parse {
        /// Filenames to parse
        #[arg(required = true)]
        filenames: Vec<String>,

        /// Expected year (2 or 4 digits)
        #[arg(long)]
        year: Option<String>,

        /// Expected project code
        #[arg(long)]
        project: Option<String>,

        /// Output JSON to stdout instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    // Also bridges `log` records from the library crates.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Recon { command } => recon::cmd_recon(command),
        Commands::Register { command } => register::cmd_register(command),
        Commands::Parse {
            filenames,
            year,
            project,
            json,
        } => parse::cmd_parse(filenames, year, project, json),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::new(EXIT_RECON_RUNTIME, msg)
    }

    /// Create error from an engine error with the matching exit code.
    pub fn recon(err: docreg_recon::ReconError) -> Self {
        let code = recon_exit_code(&err);
        let hint = match &err {
            docreg_recon::ReconError::EmptyRegister { .. } => Some(
                "check register.header_row, the register sheet and [filters] in the config".to_string(),
            ),
            docreg_recon::ReconError::MissingColumn { .. } => {
                Some("set register.header_row to the row holding the column titles".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
