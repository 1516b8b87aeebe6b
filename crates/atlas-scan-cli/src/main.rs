mod cli;
mod commands;
mod host;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "atlas_scan_cli=info,atlas_scan=warn",
        1 => "atlas_scan_cli=debug,atlas_scan=info",
        _ => "atlas_scan_cli=trace,atlas_scan=debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Scan {
            module_name,
            source_file,
            search_paths,
            output,
            config,
            reuse_cache,
            serialize_cache,
        } => commands::scan::run(
            &module_name,
            &source_file,
            search_paths,
            &output,
            config.as_ref(),
            reuse_cache.as_ref(),
            serialize_cache.as_ref(),
        ),
        Commands::Prescan {
            module_name,
            source_file,
            output,
            config,
        } => commands::prescan::run(&module_name, &source_file, output.as_ref(), config.as_ref()),
        Commands::BatchScan {
            batch_input,
            source_file,
            search_paths,
            config,
        } => commands::batch::run(&batch_input, &source_file, search_paths, config.as_ref(), false),
        Commands::BatchPrescan {
            batch_input,
            source_file,
            config,
        } => commands::batch::run(&batch_input, &source_file, Vec::new(), config.as_ref(), true),
    };

    if let Err(err) = result {
        tracing::error!(error = %err, "atlas-scan failed");
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
