//! Configuration - Engine and Printing Settings
//!
//! Process-wide settings for tensorex: the element count above which
//! evaluation runs in parallel, the default layout of new containers and the
//! options used when printing tensors. Settings are serializable to TOML.
//!
//! # Example
//! ```rust
//! use tensorex_core::EngineConfig;
//!
//! let config = EngineConfig::from_toml_str("parallel_threshold = 128").unwrap();
//! assert_eq!(config.parallel_threshold, 128);
//! assert_eq!(config.print.threshold, 1000);
//! ```
//!
//! @version 0.1.0
//! @author `tensorex` Development Team

use std::path::Path;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::layout::Layout;

// =============================================================================
// Print Options
// =============================================================================

/// Options controlling how tensors are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintOptions {
    /// Digits after the decimal point for floats; `None` prints the shortest
    /// representation that round-trips.
    pub precision: Option<usize>,
    /// Total element count above which output is summarized.
    pub threshold: usize,
    /// Leading and trailing entries kept per axis when summarizing.
    pub edge_items: usize,
    /// Maximum characters per line before wrapping a row.
    pub line_width: usize,
}

impl PrintOptions {
    /// The built-in defaults.
    pub const DEFAULT: Self = Self {
        precision: None,
        threshold: 1000,
        edge_items: 3,
        line_width: 75,
    };

    /// Returns a copy with the given precision.
    #[must_use]
    pub const fn with_precision(mut self, precision: usize) -> Self {
        self.precision = Some(precision);
        self
    }

    /// Returns a copy with the given summarization threshold.
    #[must_use]
    pub const fn with_threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }

    /// Returns a copy with the given number of edge items.
    #[must_use]
    pub const fn with_edge_items(mut self, edge_items: usize) -> Self {
        self.edge_items = edge_items;
        self
    }

    /// Returns a copy with the given line width.
    #[must_use]
    pub const fn with_line_width(mut self, line_width: usize) -> Self {
        self.line_width = line_width;
        self
    }
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// =============================================================================
// Engine Config
// =============================================================================

/// Process-wide engine settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Element count at or above which linear evaluation is split across
    /// the rayon thread pool.
    pub parallel_threshold: usize,
    /// Layout used by constructors that do not take one explicitly.
    pub default_layout: Layout,
    /// Printing options.
    pub print: PrintOptions,
}

impl EngineConfig {
    /// The built-in defaults.
    pub const DEFAULT: Self = Self {
        parallel_threshold: 4096,
        default_layout: Layout::RowMajor,
        print: PrintOptions::DEFAULT,
    };

    /// Returns the currently installed configuration.
    #[must_use]
    pub fn current() -> Self {
        *CURRENT.read()
    }

    /// Installs this configuration process-wide.
    pub fn install(self) {
        tracing::debug!(
            parallel_threshold = self.parallel_threshold,
            layout = %self.default_layout,
            "installing engine configuration"
        );
        *CURRENT.write() = self;
    }

    /// Restores the built-in defaults process-wide.
    pub fn reset() {
        Self::DEFAULT.install();
    }

    /// Parses a configuration from TOML. Missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading engine configuration");
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Serializes this configuration to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Saves this configuration to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = self.to_toml_string()?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Checks that every setting is usable.
    pub fn validate(&self) -> Result<()> {
        if self.parallel_threshold == 0 {
            return Err(Error::config("parallel_threshold must be at least 1"));
        }
        if self.print.line_width == 0 {
            return Err(Error::config("print.line_width must be at least 1"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

static CURRENT: RwLock<EngineConfig> = parking_lot::const_rwlock(EngineConfig::DEFAULT);

// =============================================================================
// Tests
// =============================================================================
