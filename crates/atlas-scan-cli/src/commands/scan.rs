//! The `scan` subcommand: a full dependency scan of one root module
//! (§6 "full scan").

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use atlas_scan::error::ScanError;
use atlas_scan::serialize::{build_graph_json, to_pretty_string};
use atlas_scan::{persist, run_scan_with_cache, ModuleDependencyCache, ScanConfig};

use crate::host::{FilesystemHost, LineImportScanner};

#[allow(clippy::too_many_arguments)]
pub fn run(
    module_name: &str,
    source_files: &[PathBuf],
    search_paths: Vec<PathBuf>,
    output: &Path,
    config: Option<&PathBuf>,
    reuse_cache: Option<&PathBuf>,
    serialize_cache: Option<&PathBuf>,
) -> Result<()> {
    let config = super::load_config(config)?;
    let mut host = FilesystemHost::new(search_paths);
    let scanner = LineImportScanner;

    let mut cache = ModuleDependencyCache::new(config.context_hash());
    if let Some(path) = reuse_cache {
        if path.is_file() {
            persist::deserialize_cache(&mut cache, path)
                .with_context(|| format!("failed to reuse cache from {path:?}"))?;
        }
    }

    let (_root_id, module_order) = match run_scan_with_cache(
        module_name,
        source_files,
        &config,
        &scanner,
        &mut host,
        &mut cache,
    ) {
        Ok(result) => result,
        Err(ScanError::CycleDetected { chain }) => {
            anyhow::bail!("dependency cycle detected: {chain}");
        }
        Err(err) => return Err(err.into()),
    };

    let document = build_graph_json(module_name, &module_order, &cache);
    let body = to_pretty_string(&document)?;

    std::fs::write(output, body).map_err(|source| ScanError::OutputOpenFailed {
        path: output.to_path_buf(),
        source,
    })?;

    if let Some(path) = serialize_cache {
        persist::serialize_cache(&cache, path)
            .with_context(|| format!("failed to serialize cache to {path:?}"))?;
    }

    tracing::info!(module = module_name, modules = module_order.len(), "scan complete");
    Ok(())
}
