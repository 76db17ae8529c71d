//! Config - Effective Configuration Command
//!
//! @version 0.1.0
//! @author `tensorex` Development Team

use crate::cli::ConfigArgs;
use crate::config::CliConfig;
use crate::error::CliResult;

/// Execute the `config` command
pub fn execute(args: ConfigArgs, effective: &CliConfig) -> CliResult<()> {
    let text = if args.defaults {
        CliConfig::default().to_toml_string()?
    } else {
        effective.to_toml_string()?
    };
    print!("{text}");
    Ok(())
}
