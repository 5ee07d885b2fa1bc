use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;

use forecast_portal::api::{DataServices, HttpTransport, Transport};
use forecast_portal::cli::Cli;
use forecast_portal::config::{Config, ConfigSource};
use forecast_portal::web::WebServer;
use forecast_portal::{logging, metrics};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli.config.unwrap_or_else(|| PathBuf::from("config/config.toml"));
    let (mut config, source) = Config::load_or_default(&config_path)
        .with_context(|| format!("loading configuration from {}", config_path.display()))?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    logging::init(&config.logging, cli.debug)?;
    metrics::init()?;
    info!("Starting forecast portal...");
    match source {
        ConfigSource::File(path) => info!("Loaded configuration from {}", path.display()),
        ConfigSource::Defaults => warn!("Config file {} not found, using defaults", config_path.display()),
    }

    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(config.api.request_timeout())?);
    let services = Arc::new(DataServices::from_config(&config, transport));
    info!(
        "Market data from {}, retry policy {} attempts / {} ms",
        config.api.coingecko_base_url, config.fetch.max_attempts, config.fetch.retry_delay_ms
    );

    let server = WebServer::new(services, config.server.assets_dir.clone());
    server.start(&config.server.host, config.server.port).await?;

    info!("Forecast portal shut down");
    Ok(())
}
