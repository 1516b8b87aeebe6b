//! The Direct-Dependency Resolver (§4.4): for one `(name, kind)` key,
//! computes and records its direct dependencies.

use crate::cache::ModuleDependencyCache;
use crate::error::Result;
use crate::host::{ModuleLoaderFacade, ModuleSearchHost};
use crate::model::{ModuleDetails, ModuleId, ModuleKind};
use crate::util::OrderedSet;

/// Extends `set` with `seeds`, then walks the native transitive closure
/// already recorded in the cache, collecting every reachable native
/// module name. Shared by the bridging-header expansion and the overlay
/// seeding step (§4.4), both of which build the same `allL2`-style set.
///
/// Walks each native entry's `moduleImports`, not `resolvedDependencies`:
/// a native module is populated by one `resolveNative` call that records
/// its whole transitive closure "in one shot" (§4.2), but nothing ever
/// runs the worklist over a native-only id, so `resolved`/
/// `resolvedDependencies` stay at their unresolved defaults. The import
/// names are recorded at load time and are native-only by construction,
/// so they're the closure this walk needs.
fn grow_native_closure(
    cache: &ModuleDependencyCache,
    set: &mut OrderedSet<String>,
    seeds: impl IntoIterator<Item = String>,
) {
    let mut frontier: Vec<String> = Vec::new();
    for seed in seeds {
        if set.insert(seed.clone()) {
            frontier.push(seed);
        }
    }
    let mut i = 0;
    while i < frontier.len() {
        let name = frontier[i].clone();
        i += 1;
        let native_id = ModuleId::new(&name, ModuleKind::Native);
        if let Some(info) = cache.find(&native_id) {
            for dep_name in info.common.module_imports.clone() {
                if dep_name != name && set.insert(dep_name.clone()) {
                    frontier.push(dep_name);
                }
            }
        }
    }
}

pub fn resolve_direct_dependencies<H: ModuleSearchHost + ?Sized>(
    key: &ModuleId,
    cache: &mut ModuleDependencyCache,
    host: &mut H,
) -> Result<Vec<ModuleId>> {
    // R-resolved: every kind but AtlasSource short-circuits once resolved.
    // The root is deliberately re-resolved every time so overlay-induced
    // edges can be picked up (§9 "Root re-resolution").
    if let Some(info) = cache.find(key) {
        if info.common.resolved && key.kind != ModuleKind::AtlasSource {
            return Ok(info.common.resolved_dependencies.clone());
        }
    }

    let is_atlas_textual = key.kind.is_atlas_textual();
    let is_atlas = key.kind.is_atlas();

    let module_imports = cache
        .find(key)
        .map(|info| info.common.module_imports.clone())
        .unwrap_or_default();

    let mut facade = ModuleLoaderFacade::new(host);
    let mut accumulator: OrderedSet<ModuleId> = OrderedSet::new();
    let mut found_kinds: Vec<(String, ModuleKind)> = Vec::new();

    for d in &module_imports {
        let resolved = if key.name == *d || !is_atlas {
            // R-self / R-onlyL2: a self-import always resolves to the
            // underlying native module (I5); a non-Atlas key can only
            // import native modules.
            facade.resolve_native(d, cache)?
        } else {
            // R-preferL1: prefer an Atlas module, accept native only if
            // none is known.
            match facade.resolve_atlas(d, cache)? {
                Some(id) => Some(id),
                None => facade.resolve_native(d, cache)?,
            }
        };

        if let Some(id) = resolved {
            found_kinds.push((d.clone(), id.kind));
            accumulator.insert(id);
        }
        // A resolution failure here is a non-root import failing to
        // resolve; per §7 it is silently dropped, not propagated.
    }

    if is_atlas_textual {
        let bridging_header = match &cache.find(key).unwrap().details {
            ModuleDetails::AtlasInterface(d) => d.bridging_header.clone(),
            ModuleDetails::AtlasSource(d) => d.bridging_header.clone(),
            _ => None,
        };

        let mut all_native: OrderedSet<String> = OrderedSet::new();

        if let Some(header) = &bridging_header {
            let referenced = facade.expand_native_header(&header.path, cache)?;
            if let Some(entry) = cache.find_mut(key) {
                let slot = match &mut entry.details {
                    ModuleDetails::AtlasInterface(d) => d.bridging_header.as_mut(),
                    ModuleDetails::AtlasSource(d) => d.bridging_header.as_mut(),
                    _ => None,
                };
                if let Some(slot) = slot {
                    slot.module_dependencies = referenced.clone();
                }
            }
            grow_native_closure(cache, &mut all_native, referenced);
        }

        let overlay_seeds = found_kinds
            .iter()
            .filter(|(_, kind)| *kind == ModuleKind::Native)
            .map(|(name, _)| name.clone());
        grow_native_closure(cache, &mut all_native, overlay_seeds);

        for name in all_native.iter() {
            if name == &key.name {
                continue;
            }
            if let Some(id) = facade.resolve_atlas(name, cache)? {
                // The overlay: an Atlas module shadowing a native module
                // of the same name, appended after direct imports.
                accumulator.insert(id);
            }
        }
    }

    let resolved = accumulator.into_vec();
    cache.resolve_dependency_imports(key, resolved.clone())?;
    Ok(resolved)
}
