//! The production `ModuleSearchHost`/`ImportScanner` pair: walks the
//! real filesystem across a list of search paths (§4.2, §4.3 Non-goals —
//! "parsing source files beyond extracting their imports" is delegated
//! here to a minimal line scanner, not a full Atlas parser).
//!
//! File conventions this host understands (a concrete choice this crate
//! makes where spec.md leaves the host's storage format unspecified):
//! - `<name>.atlasinterface` — a textual Atlas interface; `import X`
//!   lines (one per line) are its `moduleImports`.
//! - `<name>.atlasmodule` — a precompiled Atlas binary module.
//! - `<name>.modulemap` — a native module map; `use X;` lines list the
//!   native modules it transitively requires.
//! - `<name>.overlays` — optional sidecar listing this module's
//!   cross-import overlay table, one `secondary -> overlay1,overlay2`
//!   mapping per line.

use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use atlas_scan::model::{
    AtlasBinaryDetails, AtlasInterfaceDetails, ModuleId, ModuleInfo, ModuleKind, NativeDetails,
};
use atlas_scan::{ImportScanner, ModuleDependencyCache, ModuleSearchHost};

fn sha256_hex(contents: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(contents.as_bytes());
    hex::encode(hasher.finalize())
}

/// Lines of the form `import Name` (interfaces/source) or `use Name;`
/// (module maps), in file order, duplicates kept (the caller dedupes).
fn scan_prefixed_names(contents: &str, prefix: &str) -> Vec<String> {
    contents
        .lines()
        .filter_map(|line| {
            let trimmed = line.trim();
            let rest = trimmed.strip_prefix(prefix)?;
            let name = rest.trim().trim_end_matches(';').trim();
            if name.is_empty() {
                None
            } else {
                Some(name.to_string())
            }
        })
        .collect()
}

pub struct FilesystemHost {
    search_paths: Vec<PathBuf>,
}

impl FilesystemHost {
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        Self { search_paths }
    }

    fn find_file(&self, file_name: &str) -> Option<PathBuf> {
        self.search_paths
            .iter()
            .map(|dir| dir.join(file_name))
            .find(|path| path.is_file())
    }
}

impl ModuleSearchHost for FilesystemHost {
    fn resolve_native(
        &mut self,
        name: &str,
        cache: &mut ModuleDependencyCache,
    ) -> std::io::Result<Option<ModuleId>> {
        let key = ModuleId::new(name, ModuleKind::Native);
        if cache.contains(&key) {
            return Ok(Some(key));
        }

        let Some(path) = self.find_file(&format!("{name}.modulemap")) else {
            return Ok(None);
        };
        let contents = fs::read_to_string(&path)?;
        let requires = scan_prefixed_names(&contents, "use ");
        let context_hash = sha256_hex(&contents);

        let info = ModuleInfo::new_native(
            requires.clone(),
            NativeDetails {
                module_map_path: path,
                context_hash,
                command_line: Vec::new(),
                captured_pcm_args: Vec::new(),
                source_files: Vec::new(),
            },
        );
        cache.record(key.clone(), info).ok();

        // Populate the rest of the transitive native closure in this one
        // call (§4.2: "they may appear in one shot").
        for dep_name in requires {
            if dep_name != name {
                self.resolve_native(&dep_name, cache)?;
            }
        }

        Ok(Some(key))
    }

    fn resolve_atlas(
        &mut self,
        name: &str,
        cache: &mut ModuleDependencyCache,
    ) -> std::io::Result<Option<ModuleId>> {
        if let Some(path) = self.find_file(&format!("{name}.atlasinterface")) {
            let key = ModuleId::new(name, ModuleKind::AtlasInterface);
            if cache.contains(&key) {
                return Ok(Some(key));
            }
            let contents = fs::read_to_string(&path)?;
            let imports = scan_prefixed_names(&contents, "import ");
            let context_hash = sha256_hex(&contents);
            let candidate = self.find_file(&format!("{name}.atlasmodule"));

            let info = ModuleInfo::new_atlas_interface(
                imports,
                AtlasInterfaceDetails {
                    interface_path: path.clone(),
                    module_path: candidate.clone().unwrap_or_else(|| path.with_extension("atlasmodule")),
                    context_hash,
                    command_line: Vec::new(),
                    compiled_module_candidates: candidate.into_iter().collect(),
                    is_framework: false,
                    bridging_header: None,
                    extra_pcm_args: Vec::new(),
                },
            );
            cache.record(key.clone(), info).ok();
            return Ok(Some(key));
        }

        if let Some(path) = self.find_file(&format!("{name}.atlasmodule")) {
            let key = ModuleId::new(name, ModuleKind::AtlasBinary);
            if cache.contains(&key) {
                return Ok(Some(key));
            }
            let info = ModuleInfo::new_atlas_binary(
                Vec::new(),
                AtlasBinaryDetails {
                    compiled_module_path: path,
                    module_doc_path: None,
                    module_source_info_path: None,
                    is_framework: false,
                },
            );
            cache.record(key.clone(), info).ok();
            return Ok(Some(key));
        }

        Ok(None)
    }

    fn expand_native_header(
        &mut self,
        header: &Path,
        cache: &mut ModuleDependencyCache,
    ) -> std::io::Result<Vec<String>> {
        let contents = match fs::read_to_string(header) {
            Ok(c) => c,
            // Best-effort per DESIGN.md Open Question 1: a header that
            // can't be read yields zero imports, not an I/O error.
            Err(err) => {
                tracing::warn!(header = %header.display(), error = %err, "bridging header unreadable, continuing scan with zero imports");
                return Ok(Vec::new());
            }
        };
        let referenced = scan_prefixed_names(&contents, "use ");
        for name in &referenced {
            self.resolve_native(name, cache)?;
        }
        Ok(referenced)
    }

    fn cross_import_overlays(&self, module_name: &str) -> Vec<(String, Vec<String>)> {
        let Some(path) = self.find_file(&format!("{module_name}.overlays")) else {
            return Vec::new();
        };
        let Ok(contents) = fs::read_to_string(path) else {
            return Vec::new();
        };

        contents
            .lines()
            .filter_map(|line| {
                let (secondary, overlays) = line.split_once("->")?;
                let secondary = secondary.trim().to_string();
                let overlays: Vec<String> = overlays
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
                if secondary.is_empty() || overlays.is_empty() {
                    None
                } else {
                    Some((secondary, overlays))
                }
            })
            .collect()
    }
}

/// Extracts `import Name` lines from Atlas source files; the actual
/// parser lives outside this crate's scope (§1 Non-goals).
pub struct LineImportScanner;

impl ImportScanner for LineImportScanner {
    fn scan_imports(&self, source_path: &Path) -> std::io::Result<Vec<String>> {
        let contents = fs::read_to_string(source_path)?;
        Ok(scan_prefixed_names(&contents, "import "))
    }
}
