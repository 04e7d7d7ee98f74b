//! docintel HTTP server.
//!
//! Configuration comes from the JSON file named by `DOCINTEL_CONFIG` when
//! set, otherwise from defaults, then the environment (including `.env`)
//! overrides either.

mod handlers;
mod logging;
mod routes;
mod state;

use std::path::Path;

use docintel::config::{load_config, validate_config};
use docintel::Config;
use tracing::{debug, info};

use crate::state::AppState;

const CONFIG_PATH_ENV: &str = "DOCINTEL_CONFIG";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = load_settings()?;
    let _log_guards = logging::init_logging(Path::new(&config.log_dir))?;

    info!("Starting docintel-server v{}", env!("CARGO_PKG_VERSION"));
    debug!("Configuration: {:?}", config);

    let state = AppState::from_config(&config)?;
    let app = routes::router(state, config.max_upload_bytes);

    let addr = config.bind_address();
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

fn load_settings() -> anyhow::Result<Config> {
    let mut config = match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) => load_config(&path)?,
        Err(_) => Config::default(),
    };
    config.apply_env_overrides()?;
    validate_config(&config)?;
    Ok(config)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
