//! The Cycle Diagnoser (§4.7): iterative DFS over `resolvedDependencies`
//! reporting any reachable cycle as a human-readable chain.

use std::collections::{HashMap, HashSet};

use crate::cache::ModuleDependencyCache;
use crate::model::ModuleId;

/// Returns `Some(chain)` if a cycle is reachable from `root`, `None`
/// otherwise. Visits each edge at most twice; linear in graph size.
pub fn diagnose_cycle(root: &ModuleId, cache: &ModuleDependencyCache) -> Option<String> {
    let mut stack: Vec<ModuleId> = vec![root.clone()];
    let mut position: HashMap<ModuleId, usize> = HashMap::from([(root.clone(), 0)]);
    let mut closed: HashSet<ModuleId> = HashSet::new();

    while let Some(top) = stack.last().cloned() {
        let deps = cache
            .find(&top)
            .map(|info| info.common.resolved_dependencies.clone())
            .unwrap_or_default();

        let mut descended = false;
        for dep in &deps {
            if closed.contains(dep) {
                continue;
            }
            if let Some(&pos) = position.get(dep) {
                // dep is already on the stack: a cycle.
                let mut chain: Vec<&ModuleId> = stack[pos..].iter().collect();
                chain.push(dep);
                let formatted = chain
                    .iter()
                    .map(|id| format!("{}.{}", id.name, id.kind.chain_extension()))
                    .collect::<Vec<_>>()
                    .join(" -> ");
                return Some(formatted);
            }
            position.insert(dep.clone(), stack.len());
            stack.push(dep.clone());
            descended = true;
            break;
        }

        if !descended {
            closed.insert(top.clone());
            position.remove(&top);
            stack.pop();
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ModuleInfo, ModuleKind, NativeDetails};
    use rstest::rstest;

    fn atlas(cache: &mut ModuleDependencyCache, name: &str, deps: &[ModuleId]) -> ModuleId {
        let id = ModuleId::new(name, ModuleKind::AtlasInterface);
        let mut info = ModuleInfo::new_atlas_interface(
            vec![],
            crate::model::AtlasInterfaceDetails {
                interface_path: Default::default(),
                module_path: Default::default(),
                context_hash: String::new(),
                command_line: vec![],
                compiled_module_candidates: vec![],
                is_framework: false,
                bridging_header: None,
                extra_pcm_args: vec![],
            },
        );
        info.common.resolved_dependencies = deps.to_vec();
        info.common.resolved = true;
        cache.update(id.clone(), info);
        id
    }

    fn native(cache: &mut ModuleDependencyCache, name: &str, deps: &[ModuleId]) -> ModuleId {
        let id = ModuleId::new(name, ModuleKind::Native);
        let mut info = ModuleInfo::new_native(
            vec![],
            NativeDetails {
                module_map_path: Default::default(),
                context_hash: String::new(),
                command_line: vec![],
                captured_pcm_args: vec![],
                source_files: vec![],
            },
        );
        info.common.resolved_dependencies = deps.to_vec();
        info.common.resolved = true;
        cache.update(id.clone(), info);
        id
    }

    #[rstest]
    #[case::self_loop(vec!["A"])]
    #[case::two_node(vec!["A", "B"])]
    #[case::three_node(vec!["A", "B", "C"])]
    fn finds_a_cycle_of_any_length(#[case] names: Vec<&str>) {
        let mut cache = ModuleDependencyCache::new("hash");
        let ids: Vec<ModuleId> = names
            .iter()
            .map(|n| ModuleId::new(*n, ModuleKind::AtlasInterface))
            .collect();

        for (i, name) in names.iter().enumerate() {
            let next = ids[(i + 1) % ids.len()].clone();
            atlas(&mut cache, name, &[next]);
        }

        let chain = diagnose_cycle(&ids[0], &cache).expect("cycle expected");
        assert!(chain.starts_with(&format!("{}.atlasmodule", names[0])));
        assert!(chain.ends_with(&format!("{}.atlasmodule", names[0])));
    }

    #[test]
    fn acyclic_chain_reports_no_cycle() {
        let mut cache = ModuleDependencyCache::new("hash");
        let c = atlas(&mut cache, "C", &[]);
        let b = atlas(&mut cache, "B", &[c]);
        let a = atlas(&mut cache, "A", &[b]);
        assert!(diagnose_cycle(&a, &cache).is_none());
    }

    /// Same-name Atlas and native modules are distinct `ModuleId`s (I4 /
    /// §9 "Cycles across kinds"): an Atlas module depending on the native
    /// module of the same name is never mistaken for a self-cycle.
    #[test]
    fn same_name_different_kind_is_not_a_cycle() {
        let mut cache = ModuleDependencyCache::new("hash");
        let native_id = native(&mut cache, "Foundation", &[]);
        let atlas_id = atlas(&mut cache, "Foundation", &[native_id]);
        assert!(diagnose_cycle(&atlas_id, &cache).is_none());
    }
}
