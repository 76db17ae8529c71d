//! Print - Array Contents Command
//!
//! Prints using the configured print options, overridden by command-line
//! flags.
//!
//! @version 0.1.0
//! @author `tensorex` Development Team

use tensorex_core::{DType, PrintOptions};

use super::utils::load_any;
use crate::cli::PrintArgs;
use crate::error::{CliError, CliResult};

fn resolve_options(base: PrintOptions, args: &PrintArgs) -> CliResult<PrintOptions> {
    let mut opts = base;
    if let Some(precision) = args.precision {
        opts = opts.with_precision(precision);
    }
    if let Some(threshold) = args.threshold {
        opts = opts.with_threshold(threshold);
    }
    if let Some(edge_items) = args.edge_items {
        opts = opts.with_edge_items(edge_items);
    }
    if let Some(line_width) = args.line_width {
        if line_width == 0 {
            return Err(CliError::InvalidArgument("--line-width must be at least 1".into()));
        }
        opts = opts.with_line_width(line_width);
    }
    Ok(opts)
}

/// Execute the `print` command
pub fn execute(args: PrintArgs, base: PrintOptions) -> CliResult<()> {
    let opts = resolve_options(base, &args)?;
    let tensor = load_any(&args.file, DType::F64, 0)?;
    println!("{}", tensor.display_with(opts));
    Ok(())
}
