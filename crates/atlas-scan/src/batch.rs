//! The Batch Dispatcher (§4.9, §6): reads a YAML batch-input document and
//! runs many logically independent scans in one process, memoizing
//! compiler sub-instances by the literal `arguments` string of each entry.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::cache::ModuleDependencyCache;
use crate::config::ScanConfig;
use crate::cycle::diagnose_cycle;
use crate::error::{Result, ScanError};
use crate::host::{ImportScanner, ModuleLoaderFacade, ModuleSearchHost};
use crate::serialize::{build_graph_json, build_prescan_json, to_pretty_string};
use crate::worklist::run_closure_worklist;
use crate::{run_prescan, run_scan_with_cache};

/// One raw entry of the batch-input YAML document (§6 "Batch-input YAML
/// schema"). Unrecognized keys are ignored for forward-compatibility,
/// which `serde(deny_unknown_fields)` would defeat, so this struct
/// deliberately omits it.
#[derive(Debug, Deserialize)]
struct RawBatchEntry {
    #[serde(rename = "atlasModuleName")]
    atlas_module_name: Option<String>,
    #[serde(rename = "nativeModuleName")]
    native_module_name: Option<String>,
    arguments: Option<String>,
    output: Option<PathBuf>,
}

/// A validated batch entry.
#[derive(Debug, Clone)]
pub struct BatchEntry {
    pub module_name: String,
    pub is_atlas: bool,
    pub arguments: Option<String>,
    pub output: PathBuf,
}

/// Parses a batch-input YAML document (§6). An entry missing a module
/// name or an output path is a hard `InputCorrupted` error; a malformed
/// document is likewise `InputCorrupted`.
pub fn parse_batch_input(contents: &str) -> Result<Vec<BatchEntry>> {
    let raw: Vec<RawBatchEntry> = serde_yaml::from_str(contents)?;
    let mut entries = Vec::with_capacity(raw.len());

    for (index, entry) in raw.into_iter().enumerate() {
        let (module_name, is_atlas) = match (entry.atlas_module_name, entry.native_module_name) {
            (Some(name), None) => (name, true),
            (None, Some(name)) => (name, false),
            (Some(_), Some(_)) => {
                return Err(ScanError::InputCorrupted {
                    reason: format!(
                        "batch entry {index} names both atlasModuleName and nativeModuleName"
                    ),
                })
            }
            (None, None) => {
                return Err(ScanError::InputCorrupted {
                    reason: format!(
                        "batch entry {index} is missing atlasModuleName/nativeModuleName"
                    ),
                })
            }
        };

        let output = entry.output.ok_or_else(|| ScanError::InputCorrupted {
            reason: format!("batch entry {index} (`{module_name}`) is missing `output`"),
        })?;

        entries.push(BatchEntry {
            module_name,
            is_atlas,
            arguments: entry.arguments,
            output,
        });
    }

    Ok(entries)
}

/// Reads and parses a batch-input file from disk, distinguishing a
/// missing file (`InputMissing`) from a malformed one (`InputCorrupted`,
/// surfaced by `parse_batch_input`).
pub fn load_batch_input(path: &Path) -> Result<Vec<BatchEntry>> {
    let contents = std::fs::read_to_string(path).map_err(|_| ScanError::InputMissing {
        path: path.to_path_buf(),
    })?;
    parse_batch_input(&contents)
}

/// A memoized compiler sub-instance: its own config and cache, reused by
/// every entry whose literal `arguments` string matches (§4.9, §8
/// scenario 6).
struct SubInstance {
    config: ScanConfig,
    cache: ModuleDependencyCache,
}

impl SubInstance {
    /// Overlays the invocation's current search paths and native-importer
    /// extras onto this sub-instance, appending any `-Xcc` flags from
    /// `argv` that aren't already present. Idempotent: refreshing twice
    /// with the same `argv` appends nothing the second time.
    fn refresh(&mut self, primary: &ScanConfig, argv: &[String]) {
        for name in &primary.additional_implicit_imports {
            if !self.config.additional_implicit_imports.contains(name) {
                self.config.additional_implicit_imports.push(name.clone());
            }
        }

        let mut i = 0;
        while i < argv.len() {
            if argv[i] == "-Xcc" && i + 1 < argv.len() {
                let flag = argv[i + 1].clone();
                if !self.config.extra_native_args.contains(&flag) {
                    self.config.extra_native_args.push(flag);
                }
                i += 2;
            } else if argv[i] == "-target" && i + 1 < argv.len() {
                self.config.native_target = Some(argv[i + 1].clone());
                i += 2;
            } else {
                i += 1;
            }
        }
    }
}

/// Selects (creating if necessary) the sub-instance for one batch entry
/// (§4.9):
/// - empty `arguments` reuses the invocation's primary instance;
/// - a repeated literal `arguments` string reuses the existing
///   sub-instance, refreshed from the invocation;
/// - a new `arguments` string parses a fresh argv (GNU-style, via
///   `shlex`) and creates a fresh config and cache.
struct BatchDispatcher<'a> {
    primary_config: &'a ScanConfig,
    primary_cache: &'a mut ModuleDependencyCache,
    sub_instances: HashMap<String, SubInstance>,
}

impl<'a> BatchDispatcher<'a> {
    fn new(primary_config: &'a ScanConfig, primary_cache: &'a mut ModuleDependencyCache) -> Self {
        Self {
            primary_config,
            primary_cache,
            sub_instances: HashMap::new(),
        }
    }

    fn dispatch(
        &mut self,
        entry: &BatchEntry,
    ) -> Result<(&ScanConfig, &mut ModuleDependencyCache)> {
        match &entry.arguments {
            None => Ok((self.primary_config, &mut *self.primary_cache)),
            Some(arguments) if arguments.trim().is_empty() => {
                Ok((self.primary_config, &mut *self.primary_cache))
            }
            Some(arguments) => {
                let argv = shlex::split(arguments).ok_or_else(|| ScanError::ArgumentsInvalid {
                    entry: entry.module_name.clone(),
                    reason: format!("unbalanced quoting in `{arguments}`"),
                })?;

                let primary_config = self.primary_config;
                let sub = self
                    .sub_instances
                    .entry(arguments.clone())
                    .or_insert_with(|| SubInstance {
                        config: primary_config.clone(),
                        cache: ModuleDependencyCache::new(primary_config.context_hash()),
                    });
                sub.refresh(primary_config, &argv);
                Ok((&sub.config, &mut sub.cache))
            }
        }
    }
}

/// Runs every entry of a parsed batch, in order, writing one JSON
/// document per entry to its configured output path. Entries are
/// independent (§7): a failure in one is recorded and does not abort the
/// rest. Returns one `Result<()>` per entry, same order as `entries`.
pub fn run_batch_scan<H: ModuleSearchHost + ?Sized>(
    entries: &[BatchEntry],
    primary_config: &ScanConfig,
    source_files: &[PathBuf],
    scanner: &dyn ImportScanner,
    host: &mut H,
    prescan_only: bool,
) -> Vec<Result<()>> {
    let mut primary_cache = ModuleDependencyCache::new(primary_config.context_hash());
    let mut dispatcher = BatchDispatcher::new(primary_config, &mut primary_cache);

    entries
        .iter()
        .map(|entry| {
            let (config, cache) = dispatcher.dispatch(entry)?;
            run_one_entry(entry, config, cache, source_files, scanner, host, prescan_only)
        })
        .collect()
}

fn run_one_entry<H: ModuleSearchHost + ?Sized>(
    entry: &BatchEntry,
    config: &ScanConfig,
    cache: &mut ModuleDependencyCache,
    source_files: &[PathBuf],
    scanner: &dyn ImportScanner,
    host: &mut H,
    prescan_only: bool,
) -> Result<()> {
    let body = if entry.is_atlas {
        if prescan_only {
            let imports = run_prescan(&entry.module_name, source_files, config, scanner)?;
            to_pretty_string(&build_prescan_json(&imports))?
        } else {
            let (_root_id, module_order) = run_scan_with_cache(
                &entry.module_name,
                source_files,
                config,
                scanner,
                host,
                cache,
            )?;
            to_pretty_string(&build_graph_json(&entry.module_name, &module_order, cache))?
        }
    } else {
        // A `nativeModuleName` entry's root is a module the loader must
        // locate itself, not one assembled from `source_files`; a miss
        // is `ModuleNotFound` (§7), not an empty/placeholder scan.
        let root_id = ModuleLoaderFacade::new(host)
            .resolve_native(&entry.module_name, cache)?
            .ok_or_else(|| ScanError::ModuleNotFound {
                name: entry.module_name.clone(),
            })?;

        if prescan_only {
            let imports = cache
                .find(&root_id)
                .map(|info| info.common.module_imports.clone())
                .unwrap_or_default();
            to_pretty_string(&build_prescan_json(&imports))?
        } else {
            let module_order = run_closure_worklist(root_id.clone(), cache, host)?;
            if let Some(chain) = diagnose_cycle(&root_id, cache) {
                return Err(ScanError::CycleDetected { chain });
            }
            to_pretty_string(&build_graph_json(&entry.module_name, &module_order, cache))?
        }
    };

    let mut file = std::fs::File::create(&entry.output).map_err(|source| {
        ScanError::OutputOpenFailed {
            path: entry.output.clone(),
            source,
        }
    })?;
    use std::io::Write;
    file.write_all(body.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_atlas_entry() {
        let yaml = "- atlasModuleName: App\n  output: /tmp/app.json\n";
        let entries = parse_batch_input(yaml).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].module_name, "App");
        assert!(entries[0].is_atlas);
        assert_eq!(entries[0].output, PathBuf::from("/tmp/app.json"));
    }

    #[test]
    fn parses_native_entry_with_arguments() {
        let yaml = "- nativeModuleName: Foundation\n  arguments: \"-Xcc -DFOO\"\n  output: /tmp/f.json\n";
        let entries = parse_batch_input(yaml).unwrap();
        assert!(!entries[0].is_atlas);
        assert_eq!(entries[0].arguments.as_deref(), Some("-Xcc -DFOO"));
    }

    #[test]
    fn missing_output_is_corrupted() {
        let yaml = "- atlasModuleName: App\n";
        let err = parse_batch_input(yaml).unwrap_err();
        assert!(matches!(err, ScanError::InputCorrupted { .. }));
    }

    #[test]
    fn missing_module_name_is_corrupted() {
        let yaml = "- output: /tmp/app.json\n";
        let err = parse_batch_input(yaml).unwrap_err();
        assert!(matches!(err, ScanError::InputCorrupted { .. }));
    }

    #[test]
    fn ignores_unrecognized_keys() {
        let yaml = "- atlasModuleName: App\n  output: /tmp/app.json\n  somethingElse: true\n";
        let entries = parse_batch_input(yaml).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn loading_a_missing_file_is_input_missing() {
        let err = load_batch_input(Path::new("/nonexistent/batch.yaml")).unwrap_err();
        assert!(matches!(err, ScanError::InputMissing { .. }));
    }

    #[test]
    fn sub_instance_refresh_is_idempotent_for_repeated_xcc_flags() {
        let primary = ScanConfig::default();
        let mut sub = SubInstance {
            config: primary.clone(),
            cache: ModuleDependencyCache::new(primary.context_hash()),
        };
        let argv = vec!["-Xcc".to_string(), "-DFOO".to_string()];
        sub.refresh(&primary, &argv);
        sub.refresh(&primary, &argv);
        assert_eq!(
            sub.config.extra_native_args.iter().filter(|a| *a == "-DFOO").count(),
            1
        );
    }

    /// A host with nothing registered at all, used to exercise the
    /// `ModuleNotFound` path below.
    struct EmptyHost;

    impl ModuleSearchHost for EmptyHost {
        fn resolve_native(
            &mut self,
            _name: &str,
            _cache: &mut ModuleDependencyCache,
        ) -> std::io::Result<Option<crate::model::ModuleId>> {
            Ok(None)
        }

        fn resolve_atlas(
            &mut self,
            _name: &str,
            _cache: &mut ModuleDependencyCache,
        ) -> std::io::Result<Option<crate::model::ModuleId>> {
            Ok(None)
        }

        fn expand_native_header(
            &mut self,
            _header: &Path,
            _cache: &mut ModuleDependencyCache,
        ) -> std::io::Result<Vec<String>> {
            Ok(Vec::new())
        }

        fn cross_import_overlays(&self, _module_name: &str) -> Vec<(String, Vec<String>)> {
            Vec::new()
        }
    }

    struct EmptyScanner;

    impl ImportScanner for EmptyScanner {
        fn scan_imports(&self, _source_path: &Path) -> std::io::Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn native_root_entry_that_cannot_be_resolved_is_module_not_found() {
        let entries = vec![BatchEntry {
            module_name: "Missing".to_string(),
            is_atlas: false,
            arguments: None,
            output: PathBuf::from("/tmp/missing.json"),
        }];
        let config = ScanConfig::default();
        let mut host = EmptyHost;
        let scanner = EmptyScanner;

        let results = run_batch_scan(&entries, &config, &[], &scanner, &mut host, false);
        assert!(matches!(
            results[0],
            Err(ScanError::ModuleNotFound { .. })
        ));
    }
}
