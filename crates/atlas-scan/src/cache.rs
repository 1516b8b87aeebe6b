//! The Module Dependency Cache (§4.1): a keyed store of per-module
//! dependency records scoped to a single scan (or, in batch mode, a single
//! sub-instance).

use std::collections::HashMap;

use crate::error::{Result, ScanError};
use crate::model::{ModuleId, ModuleInfo};

#[derive(Debug, Clone)]
pub struct ModuleDependencyCache {
    context_hash: String,
    entries: HashMap<ModuleId, ModuleInfo>,
}

impl ModuleDependencyCache {
    pub fn new(context_hash: impl Into<String>) -> Self {
        Self {
            context_hash: context_hash.into(),
            entries: HashMap::new(),
        }
    }

    pub fn context_hash(&self) -> &str {
        &self.context_hash
    }

    pub fn find(&self, id: &ModuleId) -> Option<&ModuleInfo> {
        self.entries.get(id)
    }

    pub fn find_mut(&mut self, id: &ModuleId) -> Option<&mut ModuleInfo> {
        self.entries.get_mut(id)
    }

    pub fn contains(&self, id: &ModuleId) -> bool {
        self.entries.contains_key(id)
    }

    /// Inserts a brand-new entry. Calling this with a key already present
    /// is an internal invariant violation (I1): the cache never silently
    /// overwrites, callers that mean to mutate an existing entry use
    /// `update`.
    pub fn record(&mut self, id: ModuleId, info: ModuleInfo) -> Result<()> {
        if self.entries.contains_key(&id) {
            return Err(ScanError::CacheInvariantViolated(format!(
                "record() called for already-present entry {:?}",
                id
            )));
        }
        self.entries.insert(id, info);
        Ok(())
    }

    /// Inserts or replaces an entry, used when resolution mutates a record
    /// that the cache (or the loader facade) already created.
    pub fn update(&mut self, id: ModuleId, info: ModuleInfo) {
        self.entries.insert(id, info);
    }

    /// Sets `resolvedDependencies` and `resolved = true` atomically (I2).
    pub fn resolve_dependency_imports(&mut self, id: &ModuleId, deps: Vec<ModuleId>) -> Result<()> {
        let entry = self.entries.get_mut(id).ok_or_else(|| {
            ScanError::CacheInvariantViolated(format!(
                "resolveDependencyImports() called for missing entry {:?}",
                id
            ))
        })?;
        entry.common.resolved_dependencies = deps;
        entry.common.resolved = true;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ModuleId, &ModuleInfo)> {
        self.entries.iter()
    }

    pub fn remove(&mut self, id: &ModuleId) -> Option<ModuleInfo> {
        self.entries.remove(id)
    }
}
