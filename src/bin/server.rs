use log::{error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;

use rolegate::config::ServerConfig;
use rolegate::handlers::AppState;
use rolegate::routes::routes;
use rolegate::storage::MemoryIdentityStore;

#[tokio::main]
async fn main() {
    // Initialize env
    let dotenv_result = dotenvy::dotenv();

    // Initialize logging
    env_logger::init();

    match dotenv_result {
        Ok(path) => info!("Environment variables loaded from {}", path.display()),
        Err(e) => warn!("Failed to load .env file: {}", e),
    };

    // Load config from environment
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Configuration: host={}, port={}, algorithm={:?}, token_ttl={}s",
        config.host,
        config.port,
        config.jwt_algorithm,
        config.token_ttl.as_secs()
    );

    if config.development_mode {
        warn!("Development mode is enabled, do not run like this in production");
    }

    let store = Arc::new(MemoryIdentityStore::new());
    let state = AppState::from_config(&config, store);

    // Build the server address
    let addr: SocketAddr = match format!("{}:{}", config.host, config.port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!("Failed to parse server address: {}", e);
            std::process::exit(1);
        }
    };

    // Start the server
    info!("Starting Rolegate server on {}", addr);

    warp::serve(routes(state)).run(addr).await;
}
