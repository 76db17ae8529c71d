//! tensorex CLI - Command Line Interface for Array Files
//!
//! The main entry point for the `tensorex` command-line tool.
//!
//! # Commands
//! - `tensorex inspect` - Show format, dtype, shape and size of an array file
//! - `tensorex stats` - Min, max, mean, standard deviation and sum
//! - `tensorex print` - Print array contents
//! - `tensorex convert` - Convert between .npy and .csv
//! - `tensorex config` - Print the effective configuration
//!
//! @version 0.1.0
//! @author `tensorex` Development Team

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// CLI-specific allowances
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unnecessary_wraps)]

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod config;
mod error;

use cli::{Cli, Commands};
use error::CliResult;

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "tensorex=debug" } else { "tensorex=info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = config::load(cli.config.as_deref())?;
    if !config.output.color {
        colored::control::set_override(false);
    }

    match cli.command {
        Commands::Inspect(args) => commands::inspect::execute(args),
        Commands::Stats(args) => commands::stats::execute(args),
        Commands::Print(args) => commands::print::execute(args, config.engine.print),
        Commands::Convert(args) => commands::convert::execute(args, config.delimiter()),
        Commands::Config(args) => commands::config::execute(args, &config),
    }
}
