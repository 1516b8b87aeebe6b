//! The module graph's data model (see `SPEC_FULL.md` §3).
//!
//! `ModuleKind` is the single source of truth for which variant of
//! `ModuleDetails` a `ModuleInfo` carries; every branch in the resolver and
//! serializer switches on the tag, never on payload shape.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::util::OrderedSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModuleKind {
    AtlasInterface,
    AtlasSource,
    AtlasBinary,
    AtlasPlaceholder,
    Native,
}

impl ModuleKind {
    pub fn is_atlas_textual(self) -> bool {
        matches!(self, ModuleKind::AtlasInterface | ModuleKind::AtlasSource)
    }

    pub fn is_atlas(self) -> bool {
        self.is_atlas_textual() || matches!(self, ModuleKind::AtlasBinary)
    }

    /// The extension used by the cycle diagnoser's formatted chain.
    pub fn chain_extension(self) -> &'static str {
        match self {
            ModuleKind::Native => "ncm",
            _ => "atlasmodule",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleId {
    pub name: String,
    pub kind: ModuleKind,
}

impl ModuleId {
    pub fn new(name: impl Into<String>, kind: ModuleKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Fields shared by every module kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommonInfo {
    pub module_imports: Vec<String>,
    pub resolved_dependencies: Vec<ModuleId>,
    pub resolved: bool,
}

impl CommonInfo {
    pub fn new(module_imports: impl IntoIterator<Item = String>) -> Self {
        let imports = OrderedSet::from_iter_dedup(module_imports).into_vec();
        Self {
            module_imports: imports,
            resolved_dependencies: Vec::new(),
            resolved: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgingHeader {
    pub path: PathBuf,
    pub source_files: Vec<PathBuf>,
    pub module_dependencies: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtlasInterfaceDetails {
    pub interface_path: PathBuf,
    pub module_path: PathBuf,
    pub context_hash: String,
    pub command_line: Vec<String>,
    pub compiled_module_candidates: Vec<PathBuf>,
    pub is_framework: bool,
    pub bridging_header: Option<BridgingHeader>,
    pub extra_pcm_args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtlasSourceDetails {
    pub source_files: Vec<PathBuf>,
    pub bridging_header: Option<BridgingHeader>,
    pub extra_pcm_args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtlasBinaryDetails {
    pub compiled_module_path: PathBuf,
    pub module_doc_path: Option<PathBuf>,
    pub module_source_info_path: Option<PathBuf>,
    pub is_framework: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtlasPlaceholderDetails {
    pub compiled_module_path: PathBuf,
    pub module_doc_path: Option<PathBuf>,
    pub module_source_info_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NativeDetails {
    pub module_map_path: PathBuf,
    pub context_hash: String,
    pub command_line: Vec<String>,
    pub captured_pcm_args: Vec<Vec<String>>,
    pub source_files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ModuleDetails {
    AtlasInterface(AtlasInterfaceDetails),
    AtlasSource(AtlasSourceDetails),
    AtlasBinary(AtlasBinaryDetails),
    AtlasPlaceholder(AtlasPlaceholderDetails),
    Native(NativeDetails),
}

impl ModuleDetails {
    pub fn kind(&self) -> ModuleKind {
        match self {
            ModuleDetails::AtlasInterface(_) => ModuleKind::AtlasInterface,
            ModuleDetails::AtlasSource(_) => ModuleKind::AtlasSource,
            ModuleDetails::AtlasBinary(_) => ModuleKind::AtlasBinary,
            ModuleDetails::AtlasPlaceholder(_) => ModuleKind::AtlasPlaceholder,
            ModuleDetails::Native(_) => ModuleKind::Native,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleInfo {
    pub common: CommonInfo,
    pub details: ModuleDetails,
}

impl ModuleInfo {
    pub fn kind(&self) -> ModuleKind {
        self.details.kind()
    }

    pub fn id(&self, name: impl Into<String>) -> ModuleId {
        ModuleId::new(name, self.kind())
    }

    pub fn new_atlas_interface(
        module_imports: impl IntoIterator<Item = String>,
        details: AtlasInterfaceDetails,
    ) -> Self {
        Self {
            common: CommonInfo::new(module_imports),
            details: ModuleDetails::AtlasInterface(details),
        }
    }

    pub fn new_atlas_source(
        module_imports: impl IntoIterator<Item = String>,
        details: AtlasSourceDetails,
    ) -> Self {
        Self {
            common: CommonInfo::new(module_imports),
            details: ModuleDetails::AtlasSource(details),
        }
    }

    pub fn new_atlas_binary(
        module_imports: impl IntoIterator<Item = String>,
        details: AtlasBinaryDetails,
    ) -> Self {
        Self {
            common: CommonInfo::new(module_imports),
            details: ModuleDetails::AtlasBinary(details),
        }
    }

    pub fn new_atlas_placeholder(
        module_imports: impl IntoIterator<Item = String>,
        details: AtlasPlaceholderDetails,
    ) -> Self {
        Self {
            common: CommonInfo::new(module_imports),
            details: ModuleDetails::AtlasPlaceholder(details),
        }
    }

    pub fn new_native(
        module_imports: impl IntoIterator<Item = String>,
        details: NativeDetails,
    ) -> Self {
        Self {
            common: CommonInfo::new(module_imports),
            details: ModuleDetails::Native(details),
        }
    }

    /// The path used by the serializer's `modulePath` field (§4.8): the
    /// explicit compiled path for binary/placeholder kinds, the
    /// loader-supplied path for textual/native kinds, falling back to
    /// `<name>.<ext>` when nothing else is known.
    pub fn module_path(&self, name: &str) -> PathBuf {
        match &self.details {
            ModuleDetails::AtlasInterface(d) => d.module_path.clone(),
            ModuleDetails::AtlasSource(_) => PathBuf::from(format!("{name}.atlasmodule")),
            ModuleDetails::AtlasBinary(d) => d.compiled_module_path.clone(),
            ModuleDetails::AtlasPlaceholder(d) => d.compiled_module_path.clone(),
            ModuleDetails::Native(d) => d.module_map_path.clone(),
        }
    }

    pub fn source_files(&self) -> Option<&[PathBuf]> {
        match &self.details {
            ModuleDetails::AtlasSource(d) => Some(&d.source_files),
            ModuleDetails::Native(d) => Some(&d.source_files),
            _ => None,
        }
    }
}
