//! Utils - Common Utilities for CLI Commands
//!
//! @version 0.1.0
//! @author `tensorex` Development Team

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use colored::Colorize;
use tensorex_core::DType;
use tensorex_io::format::default_delimiter;
use tensorex_io::{detect_format, detect_format_from_bytes, AnyTensor, CsvOptions, Format};

use crate::error::{CliError, CliResult};

// =============================================================================
// Output Formatting
// =============================================================================

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print a header
pub fn print_header(title: &str) {
    println!();
    println!("{}", title.bold().underline());
    println!();
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Human-readable byte count
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

/// Shape as `(2, 3)`
pub fn format_shape(shape: &[usize]) -> String {
    let dims: Vec<String> = shape.iter().map(usize::to_string).collect();
    format!("({})", dims.join(", "))
}

// =============================================================================
// File Handling
// =============================================================================

/// Fails unless `path` is an existing file.
pub fn ensure_file(path: &Path) -> CliResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(CliError::FileNotFound(path.display().to_string()))
    }
}

/// Format of an existing file, by extension and then by content.
pub fn resolve_format(path: &Path) -> CliResult<Format> {
    if let Some(format) = detect_format(path) {
        return Ok(format);
    }
    let mut head = Vec::with_capacity(512);
    File::open(path)?.take(512).read_to_end(&mut head)?;
    detect_format_from_bytes(&head)
        .ok_or_else(|| CliError::UnsupportedFormat(path.display().to_string()))
}

/// Format for a file about to be written; only the extension is consulted.
pub fn output_format(path: &Path) -> CliResult<Format> {
    detect_format(path).ok_or_else(|| {
        CliError::UnsupportedFormat(format!(
            "{} (expected a .npy or .csv extension)",
            path.display()
        ))
    })
}

/// Parses a dtype name such as `f64` or `bool`.
pub fn parse_dtype(name: &str) -> CliResult<DType> {
    DType::from_name(&name.to_ascii_lowercase())
        .ok_or_else(|| CliError::InvalidArgument(format!("unknown dtype '{name}'")))
}

/// CSV reading options for `path`.
pub fn csv_options(path: &Path, skip_rows: usize) -> CsvOptions {
    CsvOptions::default()
        .with_delimiter(default_delimiter(path))
        .with_skip_rows(skip_rows)
}

/// Loads any supported array file; CSV is read as `dtype`.
pub fn load_any(path: &Path, dtype: DType, skip_rows: usize) -> CliResult<AnyTensor> {
    ensure_file(path)?;
    let tensor = match resolve_format(path)? {
        Format::Npy => AnyTensor::load_npy(path)?,
        Format::Csv => {
            let reader = BufReader::new(File::open(path)?);
            AnyTensor::load_csv(reader, &csv_options(path, skip_rows), dtype)?
        }
    };
    tracing::debug!(
        path = %path.display(),
        dtype = %tensor.dtype(),
        shape = ?tensor.shape(),
        "loaded array"
    );
    Ok(tensor)
}

// =============================================================================
// Tests
// =============================================================================
