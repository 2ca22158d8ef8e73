//! Kiln CLI: incremental builds for small C and C++ projects.
//!
//! `kiln build` compiles every stale source under the project's source root
//! and relinks the executable; `kiln clean` removes the generated trees.

#![warn(missing_docs)]

mod build;
mod clean;
mod logging;
mod project;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use kiln_config::StalenessMode;

use crate::logging::LoggingOptions;

/// Kiln: an incremental native-code build tool.
#[derive(Parser, Debug)]
#[command(name = "kiln", version, about = "Incremental C/C++ build orchestrator")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a `kiln.toml` file or the directory containing one.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile stale sources and link the executable.
    Build(BuildArgs),
    /// Remove object files, dependency manifests and the executable.
    Clean,
}

/// Arguments for the `kiln build` subcommand.
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Override the staleness strategy from `kiln.toml`.
    #[arg(long, value_enum)]
    pub staleness: Option<StalenessArg>,
}

/// Staleness strategy selectable on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StalenessArg {
    /// Compare modification times.
    Mtime,
    /// Compare content hashes recorded at the last compile.
    ContentHash,
}

impl From<StalenessArg> for StalenessMode {
    fn from(arg: StalenessArg) -> Self {
        match arg {
            StalenessArg::Mtime => StalenessMode::Mtime,
            StalenessArg::ContentHash => StalenessMode::ContentHash,
        }
    }
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };

    if let Err(e) = logging::init_logging(&LoggingOptions::from_env(&global)) {
        eprintln!("warning: logging unavailable: {e}");
    }

    let result = match cli.command {
        Command::Build(ref args) => build::run(args, &global),
        Command::Clean => clean::run(&global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
