//! External collaborators (§4.2, §6): the host compiler's module loaders,
//! its cross-import overlay table, and the source-import scanner. This
//! crate only defines the contracts; a production implementation walks
//! the real filesystem (see `atlas-scan-cli`), and tests supply an
//! in-memory fixture.

use std::path::Path;

use crate::cache::ModuleDependencyCache;
use crate::model::ModuleId;

/// The host's module loaders (§4.2). Both queries must be idempotent:
/// looking up a name already present in the cache returns without
/// re-touching the filesystem.
pub trait ModuleSearchHost {
    /// Full native-module search. On success, populates `cache` with the
    /// found module *and* every native module transitively reachable from
    /// it (they may all appear in the cache in one call).
    fn resolve_native(
        &mut self,
        name: &str,
        cache: &mut ModuleDependencyCache,
    ) -> std::io::Result<Option<ModuleId>>;

    /// Atlas module-interface / binary-artifact search. On success,
    /// populates `cache` with exactly the located module, not its
    /// transitive closure.
    fn resolve_atlas(
        &mut self,
        name: &str,
        cache: &mut ModuleDependencyCache,
    ) -> std::io::Result<Option<ModuleId>>;

    /// Parses a native header and returns the native module names it
    /// references. A header that cannot be parsed is best-effort: return
    /// `Ok(vec![])`, never an error (see DESIGN.md Open Question 1).
    fn expand_native_header(
        &mut self,
        header: &Path,
        cache: &mut ModuleDependencyCache,
    ) -> std::io::Result<Vec<String>>;

    /// The cross-import overlay table declared by `module_name` (§4.6):
    /// pairs of `(secondaryName, overlayNames)`. Hosts with no such
    /// modules return an empty vector.
    fn cross_import_overlays(&self, module_name: &str) -> Vec<(String, Vec<String>)>;
}

/// The injected import extractor (§1 Non-goals: this crate never parses
/// source itself).
pub trait ImportScanner {
    fn scan_imports(&self, source_path: &Path) -> std::io::Result<Vec<String>>;
}

/// Thin wrapper enforcing the facade's idempotence contract in one place
/// rather than at every call site (§4.2).
pub struct ModuleLoaderFacade<'h, H: ModuleSearchHost + ?Sized> {
    host: &'h mut H,
}

impl<'h, H: ModuleSearchHost + ?Sized> ModuleLoaderFacade<'h, H> {
    pub fn new(host: &'h mut H) -> Self {
        Self { host }
    }

    pub fn resolve_native(
        &mut self,
        name: &str,
        cache: &mut ModuleDependencyCache,
    ) -> std::io::Result<Option<ModuleId>> {
        let key = ModuleId::new(name, crate::model::ModuleKind::Native);
        if cache.contains(&key) {
            return Ok(Some(key));
        }
        self.host.resolve_native(name, cache)
    }

    pub fn resolve_atlas(
        &mut self,
        name: &str,
        cache: &mut ModuleDependencyCache,
    ) -> std::io::Result<Option<ModuleId>> {
        for kind in [
            crate::model::ModuleKind::AtlasInterface,
            crate::model::ModuleKind::AtlasBinary,
            crate::model::ModuleKind::AtlasPlaceholder,
        ] {
            let key = ModuleId::new(name, kind);
            if cache.contains(&key) {
                return Ok(Some(key));
            }
        }
        self.host.resolve_atlas(name, cache)
    }

    pub fn expand_native_header(
        &mut self,
        header: &Path,
        cache: &mut ModuleDependencyCache,
    ) -> std::io::Result<Vec<String>> {
        self.host.expand_native_header(header, cache)
    }

    pub fn cross_import_overlays(&self, module_name: &str) -> Vec<(String, Vec<String>)> {
        self.host.cross_import_overlays(module_name)
    }
}
