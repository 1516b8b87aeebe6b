use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("batch input file not found: {path}")]
    InputMissing { path: PathBuf },

    #[error("batch input is corrupted: {reason}")]
    InputCorrupted { reason: String },

    #[error("invalid arguments for batch entry `{entry}`: {reason}")]
    ArgumentsInvalid { entry: String, reason: String },

    #[error("failed to open output file {path}: {source}")]
    OutputOpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("module `{name}` could not be resolved")]
    ModuleNotFound { name: String },

    #[error("dependency cycle detected: {chain}")]
    CycleDetected { chain: String },

    /// A resolved entry was expected in the cache during serialization or
    /// overlay finalization and was absent. Per design, this indicates an
    /// internal invariant violation, not a recoverable condition.
    #[error("internal error: cache invariant violated for `{0}`")]
    CacheInvariantViolated(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse batch input YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to serialize dependency graph: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to parse configuration: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ScanError>;
