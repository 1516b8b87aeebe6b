//! CLI argument parsing with clap derive (grounded in `tugtool`'s
//! `Cli`/`Commands` derive layout: global flags plus one subcommand
//! variant per mode, §6).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Discovers the transitive closure of Atlas and native modules a root
/// compilation needs and emits a machine-readable dependency graph.
#[derive(Parser)]
#[command(name = "atlas-scan")]
#[command(version = VERSION)]
#[command(about = "Module dependency scanner for the Atlas toolchain")]
#[command(
    long_about = "atlas-scan discovers every Atlas and native module a root compilation must build or consume, resolves each import to a concrete module instance, detects cycles, and emits a dependency graph that a build driver consumes to schedule per-module compilation.\n\nModes:\n  scan           Full dependency scan of one root module\n  prescan        Just the root's direct imports, no resolution\n  batch-scan     Full scan for every entry of a YAML batch-input file\n  batch-prescan  Prescan for every entry of a YAML batch-input file"
)]
pub struct Cli {
    /// Increase output verbosity (can be repeated: -v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a full dependency scan of one root module
    Scan {
        /// Name of the root module
        #[arg(long)]
        module_name: String,

        /// Source files making up the root module
        #[arg(long, required = true, num_args = 1..)]
        source_file: Vec<PathBuf>,

        /// Directories searched for Atlas interfaces/binaries and native
        /// module maps
        #[arg(long = "search-path", num_args = 0..)]
        search_paths: Vec<PathBuf>,

        /// Path to write the resolved dependency graph JSON to
        #[arg(long)]
        output: PathBuf,

        /// Optional TOML configuration file (`ScanConfig`)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Read a previously serialized cache before scanning
        #[arg(long)]
        reuse_cache: Option<PathBuf>,

        /// Serialize the scan's cache to this path when done
        #[arg(long)]
        serialize_cache: Option<PathBuf>,
    },

    /// Emit only the root module's direct imports, without resolution
    Prescan {
        #[arg(long)]
        module_name: String,

        #[arg(long, required = true, num_args = 1..)]
        source_file: Vec<PathBuf>,

        #[arg(long)]
        output: Option<PathBuf>,

        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Run a full scan for every entry of a YAML batch-input file
    BatchScan {
        /// Path to the batch-input YAML document
        #[arg(long)]
        batch_input: PathBuf,

        #[arg(long, required = true, num_args = 1..)]
        source_file: Vec<PathBuf>,

        #[arg(long = "search-path", num_args = 0..)]
        search_paths: Vec<PathBuf>,

        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Run a prescan for every entry of a YAML batch-input file
    BatchPrescan {
        #[arg(long)]
        batch_input: PathBuf,

        #[arg(long, required = true, num_args = 1..)]
        source_file: Vec<PathBuf>,

        #[arg(long)]
        config: Option<PathBuf>,
    },
}
