//! Config - Configuration File Handling
//!
//! The CLI reads `tensorex.toml`, from `--config` or the working directory.
//! The `[engine]` table is the library's [`EngineConfig`]; the `[output]`
//! table holds settings used only by the CLI.
//!
//! ```toml
//! [engine]
//! parallel_threshold = 8192
//!
//! [engine.print]
//! precision = 3
//!
//! [output]
//! delimiter = ";"
//! ```
//!
//! @version 0.1.0
//! @author `tensorex` Development Team

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tensorex_core::EngineConfig;

use crate::error::{CliError, CliResult};

/// File name searched for in the working directory.
pub const CONFIG_FILE: &str = "tensorex.toml";

// =============================================================================
// CLI Configuration
// =============================================================================

/// Contents of `tensorex.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CliConfig {
    /// Library settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Settings for files and text the CLI writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Field separator for CSV output
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Colorize terminal output
    #[serde(default = "default_color")]
    pub color: bool,
}

fn default_delimiter() -> char {
    ','
}

fn default_color() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            color: default_color(),
        }
    }
}

impl CliConfig {
    /// Parses a configuration from TOML.
    pub fn from_toml_str(content: &str) -> CliResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.engine.validate()?;
        if !config.output.delimiter.is_ascii() {
            return Err(CliError::Config(format!(
                "output.delimiter must be a single ASCII character, got {:?}",
                config.output.delimiter
            )));
        }
        Ok(config)
    }

    /// Serializes to TOML.
    pub fn to_toml_string(&self) -> CliResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// CSV delimiter as a byte.
    pub fn delimiter(&self) -> u8 {
        self.output.delimiter as u8
    }
}

// =============================================================================
// Loading
// =============================================================================

/// Finds the configuration file to use, if any.
fn locate(explicit: Option<&Path>) -> CliResult<Option<PathBuf>> {
    match explicit {
        Some(path) if path.is_file() => Ok(Some(path.to_path_buf())),
        Some(path) => Err(CliError::Config(format!(
            "config file not found: {}",
            path.display()
        ))),
        None => {
            let local = PathBuf::from(CONFIG_FILE);
            Ok(local.is_file().then_some(local))
        }
    }
}

/// Loads the configuration and installs its engine settings process-wide.
pub fn load(explicit: Option<&Path>) -> CliResult<CliConfig> {
    let config = match locate(explicit)? {
        Some(path) => {
            tracing::debug!(path = %path.display(), "reading configuration");
            let content = std::fs::read_to_string(&path)?;
            CliConfig::from_toml_str(&content)
                .map_err(|e| CliError::Config(format!("{}: {e}", path.display())))?
        }
        None => CliConfig::default(),
    };
    config.engine.install();
    Ok(config)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = CliConfig::from_toml_str("[engine.print]\nprecision = 2\n").unwrap();
        assert_eq!(config.engine.print.precision, Some(2));
        assert_eq!(config.engine.parallel_threshold, EngineConfig::DEFAULT.parallel_threshold);
        assert_eq!(config.output, OutputConfig::default());
        assert_eq!(config.delimiter(), b',');
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(CliConfig::from_toml_str("[engine]\nparallel_threshold = 0\n").is_err());
        assert!(CliConfig::from_toml_str("[output]\ndelimiter = \"é\"\n").is_err());
        assert!(CliConfig::from_toml_str("engine = 3").is_err());
    }

    #[test]
    fn test_roundtrip() {
        let mut config = CliConfig::default();
        config.output.delimiter = '\t';
        let text = config.to_toml_string().unwrap();
        assert_eq!(CliConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(locate(Some(&dir.path().join("absent.toml"))).is_err());
    }
}
