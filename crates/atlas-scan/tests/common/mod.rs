//! Shared in-memory `ModuleSearchHost`/`ImportScanner` fixture used by
//! the scenario and property tests (§8). Nothing here touches a real
//! filesystem; every module's shape is declared up front.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use atlas_scan::model::{
    AtlasBinaryDetails, AtlasInterfaceDetails, ModuleId, ModuleInfo, ModuleKind, NativeDetails,
};
use atlas_scan::{ImportScanner, ModuleDependencyCache, ModuleSearchHost};

#[derive(Debug, Clone)]
pub struct NativeFixture {
    pub imports: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AtlasFixture {
    pub imports: Vec<String>,
}

#[derive(Default, Clone)]
pub struct FixtureHost {
    pub native: HashMap<String, NativeFixture>,
    pub atlas: HashMap<String, AtlasFixture>,
    /// name -> (declaring module's source files parsed into import lists)
    pub source_imports: HashMap<PathBuf, Vec<String>>,
    /// declaring module name -> (secondaryName -> overlay names)
    pub overlay_tables: HashMap<String, Vec<(String, Vec<String>)>>,
    /// bridging header path -> native module names it references
    pub headers: HashMap<PathBuf, Vec<String>>,
}

impl FixtureHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_native(mut self, name: &str, imports: &[&str]) -> Self {
        self.native.insert(
            name.to_string(),
            NativeFixture {
                imports: imports.iter().map(|s| s.to_string()).collect(),
            },
        );
        self
    }

    pub fn with_atlas(mut self, name: &str, imports: &[&str]) -> Self {
        self.atlas.insert(
            name.to_string(),
            AtlasFixture {
                imports: imports.iter().map(|s| s.to_string()).collect(),
            },
        );
        self
    }

    pub fn with_source(mut self, path: impl Into<PathBuf>, imports: &[&str]) -> Self {
        self.source_imports.insert(
            path.into(),
            imports.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    pub fn with_overlay_table(mut self, declarer: &str, table: &[(&str, &[&str])]) -> Self {
        self.overlay_tables.insert(
            declarer.to_string(),
            table
                .iter()
                .map(|(secondary, overlays)| {
                    (
                        secondary.to_string(),
                        overlays.iter().map(|s| s.to_string()).collect(),
                    )
                })
                .collect(),
        );
        self
    }

    pub fn with_header(mut self, path: impl Into<PathBuf>, native_names: &[&str]) -> Self {
        self.headers.insert(
            path.into(),
            native_names.iter().map(|s| s.to_string()).collect(),
        );
        self
    }
}

impl ModuleSearchHost for FixtureHost {
    fn resolve_native(
        &mut self,
        name: &str,
        cache: &mut ModuleDependencyCache,
    ) -> std::io::Result<Option<ModuleId>> {
        let key = ModuleId::new(name, ModuleKind::Native);
        if cache.contains(&key) {
            return Ok(Some(key));
        }
        let Some(fixture) = self.native.get(name).cloned() else {
            return Ok(None);
        };

        let info = ModuleInfo::new_native(
            fixture.imports.clone(),
            NativeDetails {
                module_map_path: PathBuf::from(format!("{name}.modulemap")),
                context_hash: "fixture".to_string(),
                command_line: Vec::new(),
                captured_pcm_args: Vec::new(),
                source_files: Vec::new(),
            },
        );
        cache.record(key.clone(), info).ok();

        for dep in fixture.imports {
            if dep != name {
                self.resolve_native(&dep, cache)?;
            }
        }

        Ok(Some(key))
    }

    fn resolve_atlas(
        &mut self,
        name: &str,
        cache: &mut ModuleDependencyCache,
    ) -> std::io::Result<Option<ModuleId>> {
        let key = ModuleId::new(name, ModuleKind::AtlasInterface);
        if cache.contains(&key) {
            return Ok(Some(key));
        }
        if let Some(fixture) = self.atlas.get(name).cloned() {
            let info = ModuleInfo::new_atlas_interface(
                fixture.imports,
                AtlasInterfaceDetails {
                    interface_path: PathBuf::from(format!("{name}.atlasinterface")),
                    module_path: PathBuf::from(format!("{name}.atlasmodule")),
                    context_hash: "fixture".to_string(),
                    command_line: Vec::new(),
                    compiled_module_candidates: Vec::new(),
                    is_framework: false,
                    bridging_header: None,
                    extra_pcm_args: Vec::new(),
                },
            );
            cache.record(key.clone(), info).ok();
            return Ok(Some(key));
        }

        let binary_key = ModuleId::new(name, ModuleKind::AtlasBinary);
        if cache.contains(&binary_key) {
            return Ok(Some(binary_key));
        }

        Ok(None)
    }

    fn expand_native_header(
        &mut self,
        header: &Path,
        cache: &mut ModuleDependencyCache,
    ) -> std::io::Result<Vec<String>> {
        let Some(referenced) = self.headers.get(header).cloned() else {
            return Ok(Vec::new());
        };
        for name in &referenced {
            self.resolve_native(name, cache)?;
        }
        Ok(referenced)
    }

    fn cross_import_overlays(&self, module_name: &str) -> Vec<(String, Vec<String>)> {
        self.overlay_tables
            .get(module_name)
            .cloned()
            .unwrap_or_default()
    }
}

impl ImportScanner for FixtureHost {
    fn scan_imports(&self, source_path: &Path) -> std::io::Result<Vec<String>> {
        Ok(self
            .source_imports
            .get(source_path)
            .cloned()
            .unwrap_or_default())
    }
}

/// Registers an Atlas binary module directly (bypassing `resolve_atlas`,
/// which this fixture only uses for interfaces) so tests can exercise
/// the `AtlasBinary` kind.
pub fn seed_atlas_binary(cache: &mut ModuleDependencyCache, name: &str) {
    let key = ModuleId::new(name, ModuleKind::AtlasBinary);
    let info = ModuleInfo::new_atlas_binary(
        Vec::new(),
        AtlasBinaryDetails {
            compiled_module_path: PathBuf::from(format!("{name}.atlasmodule")),
            module_doc_path: None,
            module_source_info_path: None,
            is_framework: false,
        },
    );
    cache.update(key, info);
}
