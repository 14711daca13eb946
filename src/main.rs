// src/main.rs
mod utils;
mod workbook;
mod extractors;
mod report;
mod service;
mod storage;

use clap::{Parser, Subcommand};
use extractors::section::UnitSelection;
use std::path::PathBuf;
use storage::StorageManager;
use utils::config::ScanConfig;
use utils::AppError;

/// Command Line Interface for the framework-agreement report extractor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Debug mode - save a per-row scan trace next to exported reports
    #[arg(short, long, global = true)]
    debug: bool,

    /// Rows searched for contract metadata (default: 20, or METADATA_ROW_LIMIT)
    #[arg(long, global = true)]
    metadata_rows: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the units found in a document
    Units {
        /// Source spreadsheet
        file: PathBuf,
    },

    /// Show the first records for a unit
    Preview {
        /// Source spreadsheet
        file: PathBuf,

        /// Unit to filter ("Todas" for every unit)
        #[arg(short, long)]
        unit: String,
    },

    /// Write the formatted report for a unit
    Export {
        /// Source spreadsheet
        file: PathBuf,

        /// Unit to filter ("Todas" for every unit)
        #[arg(short, long)]
        unit: String,

        /// Output directory for generated reports
        #[arg(short, long, default_value = "./output")]
        output_dir: String,

        /// Worksheet title (defaults to the unit)
        #[arg(short, long)]
        title: Option<String>,
    },
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), AppError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::Config(format!("Could not serialize output: {}", e)))?;
    println!("{}", json);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting processing for args: {:?}", args);

    // 3. Resolve scan configuration
    let config = ScanConfig::resolve(args.metadata_rows);

    match args.command {
        Command::Units { file } => {
            let listing = service::list_units(&file).await?;
            print_json(&listing)?;
        }
        Command::Preview { file, unit } => {
            let selection = UnitSelection::parse(&unit);
            let preview = service::preview(&file, &selection, config).await?;
            tracing::info!("Preview for '{}': {} records", selection.label(), preview.preview.len());
            print_json(&preview)?;
        }
        Command::Export { file, unit, output_dir, title } => {
            let storage = StorageManager::new(&output_dir)?;
            let selection = UnitSelection::parse(&unit);

            match service::export(&file, &selection, config, &storage, title.as_deref(), args.debug).await {
                Ok(outcome) => {
                    tracing::info!("Exported {} records", outcome.record_count);
                    println!("{}", outcome.report_path.display());
                }
                Err(e) if e.is_empty_result() => {
                    tracing::error!("Não foi possível filtrar dados para '{}'", selection.label());
                    return Err(e);
                }
                Err(e) => return Err(e),
            }
        }
    }

    tracing::info!("Processing finished.");
    Ok(())
}
