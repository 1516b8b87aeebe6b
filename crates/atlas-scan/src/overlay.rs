//! The Cross-Import Overlay Resolver (§4.6): a second fixpoint pass that
//! discovers implicit "overlay" modules triggered by pairs of
//! already-imported modules.

use crate::cache::ModuleDependencyCache;
use crate::error::{Result, ScanError};
use crate::host::ModuleSearchHost;
use crate::model::{AtlasSourceDetails, ModuleId, ModuleInfo, ModuleKind};
use crate::util::OrderedSet;
use crate::worklist::run_closure_worklist;

/// The sentinel exists only to reuse the worklist; it must never be
/// written to the output graph (§4.6, §4.8).
pub const SENTINEL_MODULE_NAME: &str = "DummyMainModuleForResolvingCrossImportOverlays";

/// Resolves cross-import overlays for `root`, appending any newly
/// discovered modules to the root's `resolvedDependencies` and invoking
/// `on_discovered` for each one (excluding the sentinel).
pub fn resolve_cross_import_overlays<H: ModuleSearchHost + ?Sized>(
    root: &ModuleId,
    module_set: &[ModuleId],
    cache: &mut ModuleDependencyCache,
    host: &mut H,
    mut on_discovered: impl FnMut(&ModuleId),
) -> Result<()> {
    // Activation is computed over the transitive dependencies excluding
    // the root (§4.6 step 1): both the "secondary present" and "overlay
    // not yet present" checks below run over the same root-excluded set
    // the declarer loop already uses.
    let present: OrderedSet<String> = OrderedSet::from_iter_dedup(
        module_set
            .iter()
            .filter(|id| *id != root)
            .map(|id| id.name.clone()),
    );

    let mut overlay_names: OrderedSet<String> = OrderedSet::new();

    for id in module_set {
        if id == root {
            continue;
        }
        let table = crate::host::ModuleLoaderFacade::new(&mut *host).cross_import_overlays(&id.name);
        for (secondary, overlays) in table {
            if !present.contains(&secondary) {
                continue;
            }
            for overlay in overlays {
                if present.contains(&overlay) {
                    continue;
                }
                overlay_names.insert(overlay);
            }
        }
    }

    if overlay_names.is_empty() {
        return Ok(());
    }

    let sentinel_id = ModuleId::new(SENTINEL_MODULE_NAME, ModuleKind::AtlasSource);
    let sentinel_info = ModuleInfo::new_atlas_source(
        overlay_names.into_vec(),
        AtlasSourceDetails {
            source_files: Vec::new(),
            bridging_header: None,
            extra_pcm_args: Vec::new(),
        },
    );
    cache.update(sentinel_id.clone(), sentinel_info);

    let discovered = run_closure_worklist(sentinel_id.clone(), cache, host)?;

    let root_entry = cache
        .find(root)
        .ok_or_else(|| ScanError::CacheInvariantViolated(format!("missing root {:?}", root)))?;
    let mut updated_deps: OrderedSet<ModuleId> =
        OrderedSet::from_iter_dedup(root_entry.common.resolved_dependencies.clone());

    for id in &discovered {
        if *id == sentinel_id {
            continue;
        }
        if updated_deps.insert(id.clone()) {
            on_discovered(id);
        }
    }

    let root_info = cache
        .find(root)
        .ok_or_else(|| ScanError::CacheInvariantViolated(format!("missing root {:?}", root)))?
        .clone();
    cache.update(root.clone(), {
        let mut info = root_info;
        info.common.resolved_dependencies = updated_deps.into_vec();
        info
    });

    cache.remove(&sentinel_id);

    Ok(())
}
