//! One module per CLI subcommand, following `atlas-cli::commands`'s
//! layout (`anyhow::Result`-returning `run` functions).

pub mod batch;
pub mod prescan;
pub mod scan;

use std::path::PathBuf;

use anyhow::{Context, Result};
use atlas_scan::ScanConfig;

/// Loads `ScanConfig` from an optional TOML file, defaulting to
/// `ScanConfig::default()` when none is given.
pub fn load_config(path: Option<&PathBuf>) -> Result<ScanConfig> {
    match path {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {path:?}"))?;
            Ok(ScanConfig::load_toml(&contents)?)
        }
        None => Ok(ScanConfig::default()),
    }
}
