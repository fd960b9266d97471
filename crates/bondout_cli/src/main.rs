//! bondout: the command-line front end of the package pin allocator.
//!
//! `bondout lock` allocates package pins for a design and writes `pins.lock`,
//! `bondout show` prints the pin table of a lock file, and `bondout check`
//! verifies that a lock file parses and is internally consistent.

#![warn(missing_docs)]

mod check;
mod lock;
mod project;
mod show;

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

/// bondout: reproducible pin allocation for chip packages.
#[derive(Parser, Debug)]
#[command(name = "bondout", version, about = "Package pin allocator")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Path to a `bondout.toml` file, or the directory containing it.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Allocate pins for the design and write the lock file.
    Lock(LockArgs),
    /// Print the pin table of a lock file.
    Show(ShowArgs),
    /// Check that a lock file parses and is internally consistent.
    Check(CheckArgs),
}

/// Arguments for the `bondout lock` subcommand.
#[derive(Parser, Debug)]
pub struct LockArgs {
    /// Interface metadata JSON (default: `design.json` in the project root).
    #[arg(short, long)]
    pub design: Option<PathBuf>,

    /// Lock file to reuse and overwrite (default: `pins.lock` in the project root).
    #[arg(short, long)]
    pub lockfile: Option<PathBuf>,
}

/// Arguments for the `bondout show` subcommand.
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Lock file to read (default: `pins.lock` in the project root).
    pub lockfile: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for the `bondout check` subcommand.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Lock file to check (default: `pins.lock` in the project root).
    pub lockfile: Option<PathBuf>,
}

/// Output format for `bondout show`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Aligned table for terminals.
    Text,
    /// The port map as JSON.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Optional path to a `bondout.toml` or its directory.
    pub config: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let global = GlobalArgs {
        quiet: cli.quiet,
        config: cli.config,
    };

    let result = match cli.command {
        Command::Lock(ref args) => lock::run(args, &global),
        Command::Show(ref args) => show::run(args, &global),
        Command::Check(ref args) => check::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Installs the log subscriber. `RUST_LOG` overrides the `-v`/`-q` level.
fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
