//! The Closure Worklist (§4.5): index-based BFS over the direct-dependency
//! resolver until fixpoint.

use crate::cache::ModuleDependencyCache;
use crate::error::Result;
use crate::host::ModuleSearchHost;
use crate::model::ModuleId;
use crate::resolver::resolve_direct_dependencies;
use crate::util::OrderedSet;

/// Runs the worklist seeded by `root`, returning every module discovered
/// in BFS order (root first).
pub fn run_closure_worklist<H: ModuleSearchHost + ?Sized>(
    root: ModuleId,
    cache: &mut ModuleDependencyCache,
    host: &mut H,
) -> Result<Vec<ModuleId>> {
    let mut all_modules: OrderedSet<ModuleId> = OrderedSet::new();
    all_modules.insert(root);

    let mut i = 0;
    while i < all_modules.len() {
        let current = all_modules.get(i).expect("index bound by len").clone();
        let deps = resolve_direct_dependencies(&current, cache, host)?;
        for dep in deps {
            all_modules.insert(dep);
        }
        i += 1;
    }

    Ok(all_modules.into_vec())
}
