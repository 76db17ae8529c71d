//! Convert - Format Conversion Command
//!
//! Converts between `.npy` and `.csv`, chosen by the file extensions. CSV
//! output needs a 1-D or 2-D array.
//!
//! @version 0.1.0
//! @author `tensorex` Development Team

use std::fs::File;
use std::io::BufWriter;

use tensorex_io::Format;

use super::utils::{load_any, output_format, parse_dtype, print_success};
use crate::cli::ConvertArgs;
use crate::error::{CliError, CliResult};

// =============================================================================
// Execute Command
// =============================================================================

/// Execute the `convert` command
pub fn execute(args: ConvertArgs, delimiter: u8) -> CliResult<()> {
    let target = output_format(&args.output)?;
    if args.output.exists() && !args.force {
        return Err(CliError::InvalidArgument(format!(
            "{} already exists (use --force to overwrite)",
            args.output.display()
        )));
    }
    let dtype = parse_dtype(&args.dtype)?;
    let tensor = load_any(&args.input, dtype, args.skip_rows)?;

    tracing::info!(
        input = %args.input.display(),
        output = %args.output.display(),
        target = %target,
        "converting"
    );
    match target {
        Format::Npy => tensor.dump_npy(&args.output)?,
        Format::Csv => {
            let writer = BufWriter::new(File::create(&args.output)?);
            tensor.dump_csv(writer, delimiter)?;
        }
    }

    print_success(&format!(
        "Wrote {} ({}, {} elements)",
        args.output.display(),
        target,
        tensor.numel()
    ));
    Ok(())
}
