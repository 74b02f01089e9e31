//! Common paths for planner data storage
//!
//! All data is stored under ~/.config/warp-planner/ on all platforms:
//! - config.toml - User configuration
//! - planner.sqlite - Database (credentials sealed inside)

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Get the data directory (~/.config/warp-planner/)
///
/// This is consistent across all platforms for simplicity.
pub fn data_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    let dir = home.join(".config").join("warp-planner");
    fs::create_dir_all(&dir).context("Failed to create warp-planner directory")?;
    Ok(dir)
}

/// Get the config file path (~/.config/warp-planner/config.toml)
pub fn config_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("config.toml"))
}

/// Get the database file path (~/.config/warp-planner/planner.sqlite)
pub fn database_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("planner.sqlite"))
}

/// Default directory for generated reports and backups (the working directory)
pub fn output_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}
