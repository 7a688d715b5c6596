pub mod types;
pub mod config;
pub mod diagnostics;
pub mod data;
pub mod coerce;
pub mod stats;
pub mod classify;
pub mod processing;
pub mod render;
pub mod server;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the spill map bundle (index.html, map.json, markers.geojson)
    Generate {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
    /// Serve the generated map with a nearest-site lookup API
    Serve {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
    /// Load the data and report every row-level problem without writing output
    Check {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Generate { config } => {
            info!("Generating map with config: {:?}", config);
            let app_config = config::AppConfig::load_from_file(config)?;

            // 1. Load Data
            let ingested = data::load_data(&app_config)?;
            diagnostics::log_all(&ingested.diagnostics);

            // 2. Process Data
            let processed = processing::process_data(&app_config, &ingested.dataset)
                .ok_or_else(|| anyhow!("No record has usable coordinates; nothing to map"))?;
            diagnostics::log_all(&processed.diagnostics);

            // 3. Write the bundle
            render::generate_bundle(&app_config, &processed)?;

            info!("Generation complete!");
        }
        Commands::Serve { config } => {
            info!("Serving map with config: {:?}", config);
            let app_config = config::AppConfig::load_from_file(config)?;

            let ingested = data::load_data(&app_config)?;
            diagnostics::log_all(&ingested.diagnostics);

            let processed = processing::process_data(&app_config, &ingested.dataset)
                .ok_or_else(|| anyhow!("No record has usable coordinates; nothing to serve"))?;
            diagnostics::log_all(&processed.diagnostics);

            server::start_server(app_config, processed.markers).await?;
        }
        Commands::Check { config } => {
            let app_config = config::AppConfig::load_from_file(config)?;
            let ingested = data::load_data(&app_config)?;

            let mut all = ingested.diagnostics;
            if let Some(processed) = processing::process_data(&app_config, &ingested.dataset) {
                all.extend(processed.diagnostics);
            }

            println!(
                "{} rows read, {} records kept, {} diagnostics",
                ingested.rows_read,
                ingested.dataset.len(),
                all.len()
            );
            for d in &all {
                println!("  {}", d);
            }
        }
    }

    Ok(())
}
