//! Sensor Dashboard CLI
//!
//! Command-line entry point for the sensor dashboard web server.

use std::path::PathBuf;

use clap::Parser;
use sensor_dashboard::{load_config, Config};
use tracing::Level;

#[derive(Parser)]
#[command(name = "sensor-dashboard")]
#[command(about = "Map, real-time, history and management dashboard for environmental sensors")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Dashboard port (overrides config file)
    #[arg(long)]
    port: Option<u16>,

    /// Backend API base URL (overrides config file)
    #[arg(long)]
    api_url: Option<String>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    tracing::debug!(
        "Parsed command line arguments: config={:?}, port={:?}, api_url={:?}, log_level={:?}",
        args.config,
        args.port,
        args.api_url,
        args.log_level
    );

    let mut config = if let Some(config_path) = &args.config {
        tracing::debug!("Loading configuration from {:?}", config_path);
        load_config(config_path)?
    } else {
        tracing::debug!("Using default configuration");
        Config::default()
    };

    if let Some(port) = args.port {
        config.dashboard.port = port;
    }
    if let Some(api_url) = args.api_url {
        config.api.base_url = api_url;
    }

    tracing::info!("Starting sensor dashboard");
    sensor_dashboard::run(config).await?;

    Ok(())
}
