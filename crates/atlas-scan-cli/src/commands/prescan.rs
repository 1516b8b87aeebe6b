//! The `prescan` subcommand: just the root's direct imports, no
//! resolution (§6 "prescan").

use std::path::PathBuf;

use anyhow::Result;
use atlas_scan::run_prescan;
use atlas_scan::serialize::{build_prescan_json, to_pretty_string};

use crate::host::LineImportScanner;

pub fn run(
    module_name: &str,
    source_files: &[PathBuf],
    output: Option<&PathBuf>,
    config: Option<&PathBuf>,
) -> Result<()> {
    let config = super::load_config(config)?;
    let scanner = LineImportScanner;

    let imports = run_prescan(module_name, source_files, &config, &scanner)?;
    let body = to_pretty_string(&build_prescan_json(&imports))?;

    match output {
        Some(path) => std::fs::write(path, &body)?,
        None => println!("{body}"),
    }

    Ok(())
}
