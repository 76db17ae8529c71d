//! Inspect - Array File Inspection Command
//!
//! Reports format, dtype, shape, layout and sizes. For `.npy` files only the
//! header is read.
//!
//! @version 0.1.0
//! @author `tensorex` Development Team

use tensorex_core::DType;
use tensorex_io::{read_header, Format};

use super::utils::{
    ensure_file, format_bytes, format_shape, load_any, print_header, print_kv, resolve_format,
};
use crate::cli::InspectArgs;
use crate::error::CliResult;

// =============================================================================
// Execute Command
// =============================================================================

/// Execute the `inspect` command
pub fn execute(args: InspectArgs) -> CliResult<()> {
    let path = args.file.as_path();
    ensure_file(path)?;
    let format = resolve_format(path)?;
    let file_size = std::fs::metadata(path)?.len();

    print_header(&format!("Inspecting {}", path.display()));
    print_kv("Format", &format.to_string());

    match format {
        Format::Npy => {
            let header = read_header(path)?;
            print_kv("Version", &format!("{}.{}", header.version.0, header.version.1));
            print_kv("DType", &format!("{} ({})", header.dtype, header.descr()));
            print_kv("Shape", &format_shape(&header.shape));
            print_kv("Layout", &header.layout().to_string());
            print_kv("Elements", &header.numel().to_string());
            print_kv("Data size", &format_bytes(header.data_len() as u64));
        }
        Format::Csv => {
            let tensor = load_any(path, DType::F64, 0)?;
            print_kv("DType", "f64 (parsed)");
            print_kv("Shape", &format_shape(tensor.shape()));
            print_kv("Elements", &tensor.numel().to_string());
        }
    }
    print_kv("File size", &format_bytes(file_size));
    Ok(())
}
