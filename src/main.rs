use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};

use weather_records::{AppConfig, AppState, VERSION, logging, web};

#[tokio::main]
async fn main() -> Result<()> {
    // Logging is configured from the file, so config errors can only go to stderr
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return Err(e.into());
        }
    };
    if let Err(e) = logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        return Err(e.into());
    }

    info!("Starting weather-records {}", VERSION);

    let state = match AppState::from_config(config) {
        Ok(state) => Arc::new(state),
        Err(e) => {
            error!("Failed to initialize app: {}", e);
            return Err(e.into());
        }
    };

    if let Err(e) = web::run(state).await {
        error!("Server error: {:#}", e);
        return Err(e);
    }

    Ok(())
}
