//! The `batch-scan` / `batch-prescan` subcommands (§4.9, §6).

use std::path::PathBuf;

use anyhow::{Context, Result};
use atlas_scan::batch::{load_batch_input, run_batch_scan};

use crate::host::{FilesystemHost, LineImportScanner};

pub fn run(
    batch_input: &PathBuf,
    source_files: &[PathBuf],
    search_paths: Vec<PathBuf>,
    config: Option<&PathBuf>,
    prescan_only: bool,
) -> Result<()> {
    let config = super::load_config(config)?;
    let entries = load_batch_input(batch_input)
        .with_context(|| format!("failed to load batch input {batch_input:?}"))?;
    let mut host = FilesystemHost::new(search_paths);
    let scanner = LineImportScanner;

    let results = run_batch_scan(
        &entries,
        &config,
        source_files,
        &scanner,
        &mut host,
        prescan_only,
    );

    let mut failures = 0;
    for (entry, result) in entries.iter().zip(results) {
        match result {
            Ok(()) => {
                tracing::info!(module = %entry.module_name, output = %entry.output.display(), "batch entry complete");
            }
            Err(err) => {
                failures += 1;
                tracing::error!(module = %entry.module_name, error = %err, "batch entry failed");
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} of {} batch entries failed", entries.len());
    }

    Ok(())
}
