//! Common paths for Tusk data storage
//!
//! Tusk keeps its files under the platform config directory
//! (`$XDG_CONFIG_HOME/tusk/` or `~/.config/tusk/` on Linux):
//! - config.toml - User configuration

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Get the Tusk config directory
pub fn tusk_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().context("Could not determine config directory")?;
    Ok(config_dir.join("tusk"))
}

/// Get the config file path
pub fn config_path() -> Result<PathBuf> {
    Ok(tusk_dir()?.join("config.toml"))
}
