use barnctl::error::BarnctlError;
use barnctl::logger::initialize as LoggerInitialize;
use barnctl::watch;

use barn_client::BarnClient;
use barn_client::config::{ClientConfig, resolve_config_dir};

use common::ErrorLocation;

use std::fs::create_dir_all;
use std::panic::Location;

use log::info;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<(), BarnctlError> {
    let config_dir = resolve_config_dir()?;

    create_dir_all(&config_dir).map_err(|e| BarnctlError::Barnctl {
        message: format!(
            "Failed to create config directory {}: {e}",
            config_dir.display()
        ),
        location: ErrorLocation::from(Location::caller()),
    })?;

    // Initialize logger FIRST
    LoggerInitialize(&config_dir)?;

    let config = ClientConfig::load(&config_dir)?;
    info!(
        "barnctl starting for deployment {} ({})",
        config.deployment,
        config_dir.display()
    );

    let client = BarnClient::new(config);
    let _listeners = watch::install(&client);
    client.connect_configured().await?;

    signal::ctrl_c().await.map_err(|e| BarnctlError::Barnctl {
        message: format!("Failed to listen for Ctrl-C: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    info!("Shutting down");
    client.disconnect();
    Ok(())
}
