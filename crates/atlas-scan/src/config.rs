//! Invocation configuration (ambient stack, `SPEC_FULL.md` §9): pins the
//! standard-library behavior, implicit imports, target, and native-importer
//! extras a scan runs under, and feeds the cache's context hash.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StdlibKind {
    None,
    Stdlib,
}

impl Default for StdlibKind {
    fn default() -> Self {
        StdlibKind::None
    }
}

const API_NOTES_VERSION_PIN: &str = "0";

/// The ambient host target used to pin native sub-compilations when the
/// configuration doesn't override one explicitly (§4.3). A real front end
/// reads this off the running compiler instance's own default target; this
/// crate has no such instance, so it falls back to the host triple the
/// scanner itself is running on.
fn default_native_target() -> String {
    format!("{}-{}", std::env::consts::ARCH, std::env::consts::OS)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default)]
    pub stdlib_kind: StdlibKind,

    /// Additional implicit imports not yet in the cache, injected in order
    /// after the standard library (§4.3 (c)).
    #[serde(default)]
    pub additional_implicit_imports: Vec<String>,

    /// Implicit imports the host has already loaded by the time the main
    /// module is identified (§4.3 (d)).
    #[serde(default)]
    pub already_loaded_implicit_imports: Vec<String>,

    /// Whether the root should import the underlying native module of the
    /// same name (§4.3 (e), §3 I5, §8 scenario 3).
    #[serde(default)]
    pub import_underlying_native_module: bool,

    #[serde(default)]
    pub bridging_header: Option<PathBuf>,

    /// Explicit native-target override; when absent, the main-module
    /// identifier pins one itself (§4.3).
    #[serde(default)]
    pub native_target: Option<String>,

    /// Extra `-Xcc`-style arguments forwarded to the native importer.
    #[serde(default)]
    pub extra_native_args: Vec<String>,

    #[serde(default)]
    pub cache_reuse_path: Option<PathBuf>,

    #[serde(default)]
    pub cache_serialize_path: Option<PathBuf>,
}

impl ScanConfig {
    pub fn load_toml(contents: &str) -> crate::error::Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// The `extraPCMArgs` vector the main-module identifier attaches to
    /// the root (§4.3): an API-notes version pin plus, unless the
    /// configuration overrides the native target explicitly, a target
    /// pin. An explicit `native_target` is already in effect elsewhere in
    /// the invocation, so it needs no pin repeated here; only the
    /// ambient host default needs pinning down for native sub-compilations.
    pub fn extra_pcm_args(&self) -> Vec<String> {
        let mut args = vec![format!("-fapinotes-swift-version={API_NOTES_VERSION_PIN}")];
        if self.native_target.is_none() {
            args.push("-target".to_string());
            args.push(default_native_target());
        }
        args
    }

    /// A digest of the invocation's effective configuration, used to scope
    /// cache entries (§3, §4.1, §6).
    pub fn context_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.stdlib_kind).as_bytes());
        for name in &self.additional_implicit_imports {
            hasher.update(name.as_bytes());
        }
        for name in &self.already_loaded_implicit_imports {
            hasher.update(name.as_bytes());
        }
        hasher.update([self.import_underlying_native_module as u8]);
        if let Some(header) = &self.bridging_header {
            hasher.update(header.to_string_lossy().as_bytes());
        }
        // `extra_pcm_args()` pins `default_native_target()` into the
        // emitted command line whenever `native_target` is `None` (§4.3),
        // so the effective configuration — and therefore the hash — must
        // account for that fallback too, not just an explicit override.
        let effective_target = self
            .native_target
            .clone()
            .unwrap_or_else(default_native_target);
        hasher.update(effective_target.as_bytes());
        for arg in &self.extra_native_args {
            hasher.update(arg.as_bytes());
        }
        hex::encode(hasher.finalize())
    }
}
