//! CLI entry point for the BMTC scraper.
//!
//! With no subcommand, loads the previously fetched `routes.json` and fills in
//! every missing route id page, route line, timetable and stop list. The
//! `routes` subcommand fetches `routes.json` itself.

mod logging;

use anyhow::Result;
use bmtc_scraper::collect::Collector;
use bmtc_scraper::config::ScraperConfig;
use bmtc_scraper::stats::print_json;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "bmtc_scraper")]
#[command(about = "Collects BMTC route, timetable and stop data as JSON files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Root directory for routes.json and the category directories
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// API root the endpoint paths are appended to
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill in every missing artifact using an existing routes.json (default)
    Collect,
    /// Fetch the route list into routes.json
    Routes,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let cli = Cli::parse();

    let mut config = ScraperConfig::from_env()?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }

    let _log_guard = logging::init(&config.log_file);
    info!(
        data_dir = %config.data_dir.display(),
        base_url = %config.base_url,
        "Starting"
    );

    let collector = Collector::from_config(&config);

    match cli.command.unwrap_or(Commands::Collect) {
        Commands::Collect => {
            let report = collector.run_all().await?;
            print_json(&report)?;
        }
        Commands::Routes => {
            let resp = collector.fetch_routes().await?;
            if !resp.is_ok() {
                anyhow::bail!("route list request failed with status {}", resp.status);
            }
        }
    }

    Ok(())
}
