//! CLI - Command Line Interface Definitions
//!
//! Defines the CLI structure using clap derive macros.
//!
//! @version 0.1.0
//! @author `tensorex` Development Team

use std::path::PathBuf;

use clap::{Parser, Subcommand};

// =============================================================================
// Main CLI Structure
// =============================================================================

/// tensorex - inspect, summarize and convert array files
#[derive(Parser, Debug)]
#[command(
    name = "tensorex",
    author = "tensorex Development Team",
    version,
    about = "Inspect, summarize, print and convert .npy and .csv array files"
)]
pub struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (defaults to ./tensorex.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

// =============================================================================
// Subcommands
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show format, dtype, shape and size of an array file
    Inspect(InspectArgs),

    /// Compute summary statistics
    Stats(StatsArgs),

    /// Print the array contents
    Print(PrintArgs),

    /// Convert between .npy and .csv
    Convert(ConvertArgs),

    /// Print the effective configuration as TOML
    Config(ConfigArgs),
}

// =============================================================================
// Inspect Command
// =============================================================================

/// Arguments for the `inspect` command
#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Path to the array file
    pub file: PathBuf,
}

// =============================================================================
// Stats Command
// =============================================================================

/// Arguments for the `stats` command
#[derive(Parser, Debug)]
pub struct StatsArgs {
    /// Path to the array file
    pub file: PathBuf,

    /// Reduce along this axis instead of over all elements
    #[arg(short, long, allow_negative_numbers = true)]
    pub axis: Option<i64>,
}

// =============================================================================
// Print Command
// =============================================================================

/// Arguments for the `print` command
#[derive(Parser, Debug)]
pub struct PrintArgs {
    /// Path to the array file
    pub file: PathBuf,

    /// Digits after the decimal point for floating point values
    #[arg(short, long)]
    pub precision: Option<usize>,

    /// Element count above which output is summarized
    #[arg(short, long)]
    pub threshold: Option<usize>,

    /// Leading and trailing entries shown per axis when summarizing
    #[arg(short, long)]
    pub edge_items: Option<usize>,

    /// Maximum line width
    #[arg(long)]
    pub line_width: Option<usize>,
}

// =============================================================================
// Convert Command
// =============================================================================

/// Arguments for the `convert` command
#[derive(Parser, Debug)]
pub struct ConvertArgs {
    /// Input file (.npy or .csv)
    pub input: PathBuf,

    /// Output file (.npy or .csv)
    pub output: PathBuf,

    /// Element type used when reading CSV (e.g. f64, i32, u8, bool)
    #[arg(short, long, default_value = "f64")]
    pub dtype: String,

    /// Header lines to skip when reading CSV
    #[arg(long, default_value_t = 0)]
    pub skip_rows: usize,

    /// Overwrite the output file if it exists
    #[arg(short, long)]
    pub force: bool,
}

// =============================================================================
// Config Command
// =============================================================================

/// Arguments for the `config` command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Print the built-in defaults instead of the effective configuration
    #[arg(long)]
    pub defaults: bool,
}
