//! Subcommands.

pub mod batch;
pub mod config;
pub mod process;

use std::path::Path;

use tracing::debug;

use ordline_core::models::config::OrdlineConfig;

/// Load the configuration named on the command line, else the user config
/// file if one exists, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<OrdlineConfig> {
    if let Some(path) = config_path {
        return Ok(OrdlineConfig::from_file(Path::new(path))?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        debug!("Using config file {}", default_path.display());
        return Ok(OrdlineConfig::from_file(&default_path)?);
    }

    Ok(OrdlineConfig::default())
}
