//! integration_hub: HubSpot OAuth handshake and item loading over HTTP.

use log::{error, info};
use service::{config::Config, logging::Logger, AppState};
use tokio::time::Duration;

/// How often expired OAuth states and unread credentials are dropped.
const STORE_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() {
    let config = Config::new();
    if let Err(e) = Logger::init_logger(&config as &Config) {
        eprintln!("Failed to initialize logger: {e}");
        std::process::exit(1);
    }

    info!("Starting integration_hub [{}]...", config.runtime_env());

    if config.hubspot_client_id().is_none() || config.hubspot_client_secret().is_none() {
        error!("HubSpot client ID or secret is not configured; HubSpot authorization will fail");
    }

    let (store, _cleanup) = service::init_store(STORE_CLEANUP_INTERVAL);
    let app_state = AppState::new(config, store);

    if let Err(e) = web::init_server(app_state).await {
        error!("Server stopped: {e}");
        std::process::exit(1);
    }
}
