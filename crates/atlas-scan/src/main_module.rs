//! The Main-Module Identifier (§4.3): builds the root's `AtlasSource`
//! entry before the worklist ever runs.

use std::path::{Path, PathBuf};

use crate::config::ScanConfig;
use crate::host::ImportScanner;
use crate::model::{AtlasSourceDetails, BridgingHeader, ModuleInfo};
use crate::util::OrderedSet;

pub const STDLIB_NAME: &str = "AtlasStdlib";

/// Builds the root `AtlasSource` entry.
///
/// `moduleImports` is the ordered deduplication of: (a) imports scanned
/// from each source file, (b) the standard library name when
/// `config.stdlib_kind == Stdlib`, (c) each configured additional
/// implicit import in order, (d) each already-loaded implicit import by
/// name, (e) the root's own name iff `config.import_underlying_native_module`.
pub fn identify_main_module(
    root_name: &str,
    source_files: &[PathBuf],
    config: &ScanConfig,
    scanner: &dyn ImportScanner,
) -> std::io::Result<ModuleInfo> {
    let mut imports = OrderedSet::new();

    for file in source_files {
        for import in scanner.scan_imports(file)? {
            imports.insert(import);
        }
    }

    if config.stdlib_kind == crate::config::StdlibKind::Stdlib {
        imports.insert(STDLIB_NAME.to_string());
    }

    for name in &config.additional_implicit_imports {
        imports.insert(name.clone());
    }

    for name in &config.already_loaded_implicit_imports {
        imports.insert(name.clone());
    }

    if config.import_underlying_native_module {
        imports.insert(root_name.to_string());
    }

    let bridging_header = config.bridging_header.as_ref().and_then(|path| {
        if path.as_os_str().is_empty() {
            None
        } else {
            Some(BridgingHeader {
                path: path.clone(),
                source_files: Vec::new(),
                module_dependencies: Vec::new(),
            })
        }
    });

    Ok(ModuleInfo::new_atlas_source(
        imports,
        AtlasSourceDetails {
            source_files: source_files.to_vec(),
            bridging_header,
            extra_pcm_args: config.extra_pcm_args(),
        },
    ))
}

/// Path the bridging header would have been attached under, purely for
/// callers that want to check configuration without rebuilding the
/// module (used by the CLI's `prescan` mode, which never touches the
/// header expansion machinery).
pub fn bridging_header_path(config: &ScanConfig) -> Option<&Path> {
    config.bridging_header.as_deref()
}
