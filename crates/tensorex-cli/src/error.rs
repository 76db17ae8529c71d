//! Error - CLI Error Types
//!
//! @version 0.1.0
//! @author `tensorex` Development Team

use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error raised by the tensor library
    #[error("{0}")]
    Tensor(#[from] tensorex_core::Error),

    /// Input file does not exist
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Unsupported or unrecognized file format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

// =============================================================================
// Error Conversion
// =============================================================================

impl From<toml::de::Error> for CliError {
    fn from(e: toml::de::Error) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for CliError {
    fn from(e: toml::ser::Error) -> Self {
        CliError::Config(e.to_string())
    }
}
