//! Format Detection - Array File Format Identification
//!
//! Maps file paths and leading bytes to the array file formats this crate
//! reads and writes.
//!
//! @version 0.1.0
//! @author `tensorex` Development Team

use std::path::Path;

use crate::npy::MAGIC;

// =============================================================================
// Format Enum
// =============================================================================

/// Supported array file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// NumPy binary arrays (.npy)
    Npy,
    /// Delimited text (.csv, .tsv, .txt)
    Csv,
}

impl Format {
    /// File extension written for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Npy => "npy",
            Format::Csv => "csv",
        }
    }

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Format::Npy => "NumPy NPY",
            Format::Csv => "CSV",
        }
    }

    /// Whether the format stores raw bytes.
    pub fn is_binary(&self) -> bool {
        matches!(self, Format::Npy)
    }

    /// Whether the format records the element type.
    pub fn preserves_dtype(&self) -> bool {
        matches!(self, Format::Npy)
    }

    /// All supported formats.
    pub fn all() -> &'static [Format] {
        &[Format::Npy, Format::Csv]
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// =============================================================================
// Format Detection
// =============================================================================

/// Detects the format from a path's extension.
pub fn detect_format<P: AsRef<Path>>(path: P) -> Option<Format> {
    let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "npy" => Some(Format::Npy),
        "csv" | "tsv" | "txt" => Some(Format::Csv),
        _ => None,
    }
}

/// Detects the format from file contents.
///
/// Anything starting with the NPY magic string is NPY; UTF-8 text is
/// treated as CSV.
pub fn detect_format_from_bytes(bytes: &[u8]) -> Option<Format> {
    if bytes.starts_with(MAGIC) {
        return Some(Format::Npy);
    }
    let head = &bytes[..bytes.len().min(512)];
    match std::str::from_utf8(head) {
        Ok(text) if !text.is_empty() && !text.contains('\0') => Some(Format::Csv),
        // A multi-byte character may straddle the cut.
        Err(e) if e.valid_up_to() > 0 && head.len() - e.valid_up_to() < 4 => Some(Format::Csv),
        _ => None,
    }
}

/// Default delimiter for a text file with this path.
pub fn default_delimiter<P: AsRef<Path>>(path: P) -> u8 {
    match path.as_ref().extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
        _ => b',',
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_format_from_extension() {
        assert_eq!(detect_format("a.npy"), Some(Format::Npy));
        assert_eq!(detect_format("a.NPY"), Some(Format::Npy));
        assert_eq!(detect_format("data/a.csv"), Some(Format::Csv));
        assert_eq!(detect_format("a.tsv"), Some(Format::Csv));
        assert_eq!(detect_format("a.bin"), None);
        assert_eq!(detect_format("noext"), None);
    }

    #[test]
    fn test_detect_format_from_bytes() {
        assert_eq!(detect_format_from_bytes(b"\x93NUMPY\x01\x00"), Some(Format::Npy));
        assert_eq!(detect_format_from_bytes(b"1,2,3\n4,5,6\n"), Some(Format::Csv));
        assert_eq!(detect_format_from_bytes(&[0xff, 0x00, 0x12]), None);
        assert_eq!(detect_format_from_bytes(b""), None);
    }

    #[test]
    fn test_format_properties() {
        assert!(Format::Npy.is_binary());
        assert!(!Format::Csv.preserves_dtype());
        assert_eq!(Format::Csv.extension(), "csv");
        assert_eq!(format!("{}", Format::Npy), "NumPy NPY");
        assert_eq!(default_delimiter("x.tsv"), b'\t');
        assert_eq!(default_delimiter("x.csv"), b',');
    }
}
