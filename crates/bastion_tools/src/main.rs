//! Neon Bastion - Development Tools

use std::path::PathBuf;

use bastion_core::catalog::Catalog;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "bastion-tools")]
#[command(about = "Development tools for Neon Bastion")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate catalog data files
    Validate {
        /// Data directory or single catalog file
        #[arg(default_value = "assets/data")]
        path: PathBuf,

        /// Treat lint warnings as failures
        #[arg(long)]
        strict: bool,
    },

    /// Print the built-in catalog as RON
    DumpCatalog,
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { path, strict } => {
            tracing::info!("Validating data files in: {}", path.display());
            match bastion_tools::validate::validate_data_directory(&path) {
                Ok(reports) => {
                    let warnings: usize = reports.iter().map(|r| r.warnings.len()).sum();
                    tracing::info!(files = reports.len(), warnings, "Validation passed");
                    if strict && warnings > 0 {
                        tracing::error!("{warnings} warning(s) in strict mode");
                        std::process::exit(1);
                    }
                }
                Err(e) => {
                    tracing::error!("Validation failed: {e}");
                    std::process::exit(1);
                }
            }
        }
        Commands::DumpCatalog => {
            let pretty = ron::ser::PrettyConfig::new().struct_names(true);
            match ron::ser::to_string_pretty(&Catalog::standard(), pretty) {
                Ok(text) => println!("{text}"),
                Err(e) => {
                    tracing::error!("Failed to serialize catalog: {e}");
                    std::process::exit(1);
                }
            }
        }
    }
}
