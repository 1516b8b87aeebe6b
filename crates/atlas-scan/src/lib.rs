//! `atlas-scan`: the module dependency scanning engine for the Atlas
//! toolchain (see `SPEC_FULL.md`).
//!
//! This crate discovers the transitive closure of Atlas and native
//! modules a root compilation needs, resolves each import to a concrete
//! module instance, detects cycles, and serializes the resolved graph.
//! It treats the host's filesystem-backed module loaders, the bridging
//! header parser, and the cache persistence format as external
//! collaborators (`host`, `persist`) so the engine itself stays a pure,
//! single-threaded graph algorithm over an in-memory cache.

pub mod batch;
pub mod cache;
pub mod config;
pub mod cycle;
pub mod error;
pub mod host;
pub mod main_module;
pub mod model;
pub mod overlay;
pub mod persist;
pub mod resolver;
pub mod serialize;
pub mod util;
pub mod worklist;

pub use cache::ModuleDependencyCache;
pub use config::{ScanConfig, StdlibKind};
pub use error::{Result, ScanError};
pub use host::{ImportScanner, ModuleLoaderFacade, ModuleSearchHost};
pub use model::{ModuleDetails, ModuleId, ModuleInfo, ModuleKind};

use tracing::{info_span, warn};

/// Runs a complete single-root scan (§2 "Control flow for a single
/// scan"): identifies the main module, runs the closure worklist, runs
/// the cross-import overlay pass, diagnoses cycles, and returns the
/// BFS-plus-overlay module order ready for `serialize::build_graph_json`.
///
/// Returns `Err(ScanError::CycleDetected)` if a cycle is reachable from
/// the root; the caller decides whether to still emit partial output.
pub fn run_scan<H: ModuleSearchHost + ?Sized>(
    root_name: &str,
    source_files: &[std::path::PathBuf],
    config: &ScanConfig,
    scanner: &dyn ImportScanner,
    host: &mut H,
) -> Result<(ModuleId, Vec<ModuleId>, ModuleDependencyCache)> {
    let mut cache = ModuleDependencyCache::new(config.context_hash());
    let (root_id, module_order) =
        run_scan_with_cache(root_name, source_files, config, scanner, host, &mut cache)?;
    Ok((root_id, module_order, cache))
}

/// The same single-root scan as [`run_scan`], but against a
/// caller-supplied cache instead of a fresh one. The batch dispatcher
/// (`batch`) uses this to let sub-instances sharing an argument vector
/// also share (and grow) a cache across several scans (§4.9, §5).
pub fn run_scan_with_cache<H: ModuleSearchHost + ?Sized>(
    root_name: &str,
    source_files: &[std::path::PathBuf],
    config: &ScanConfig,
    scanner: &dyn ImportScanner,
    host: &mut H,
    cache: &mut ModuleDependencyCache,
) -> Result<(ModuleId, Vec<ModuleId>)> {
    let root_id = {
        let _span = info_span!("identify_main_module", root = root_name).entered();
        let root_info = main_module::identify_main_module(root_name, source_files, config, scanner)?;
        let id = ModuleId::new(root_name, ModuleKind::AtlasSource);
        cache.update(id.clone(), root_info);
        id
    };

    let mut module_order = {
        let _span = info_span!("closure_worklist").entered();
        worklist::run_closure_worklist(root_id.clone(), cache, host)?
    };

    // The overlay pass resolves the sentinel's own closure via the
    // worklist internally (every discovered module is already `resolved`
    // in `cache` by the time it calls back here); we only need to widen
    // `module_order` with whatever it found so the serializer sees them.
    // Re-running the worklist from the root itself would be wrong: root
    // is exempt from the resolved short-circuit (§9 "Root re-resolution"),
    // so resolving it again rebuilds its `resolvedDependencies` from
    // `moduleImports` alone and would silently drop the overlay edges
    // the resolver never produces on its own.
    let mut newly_discovered: Vec<ModuleId> = Vec::new();
    {
        let _span = info_span!("overlay_pass").entered();
        overlay::resolve_cross_import_overlays(&root_id, &module_order, cache, host, |id| {
            tracing::debug!(module = %id.name, kind = ?id.kind, "cross-import overlay discovered");
            newly_discovered.push(id.clone());
        })?;
    }

    let mut seen: std::collections::HashSet<ModuleId> = module_order.iter().cloned().collect();
    for id in newly_discovered {
        if seen.insert(id.clone()) {
            module_order.push(id);
        }
    }

    if let Some(chain) = cycle::diagnose_cycle(&root_id, cache) {
        warn!(%chain, "dependency cycle detected");
        return Err(ScanError::CycleDetected { chain });
    }

    Ok((root_id, module_order))
}

/// Runs the prescan surface (§6): just the root's direct `moduleImports`,
/// without resolving anything.
pub fn run_prescan(
    root_name: &str,
    source_files: &[std::path::PathBuf],
    config: &ScanConfig,
    scanner: &dyn ImportScanner,
) -> Result<Vec<String>> {
    let root_info = main_module::identify_main_module(root_name, source_files, config, scanner)?;
    Ok(root_info.common.module_imports)
}
