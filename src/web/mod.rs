//! HTTP surface of the exporter.
//!
//! Serves scrapes of the local BMC on `/metrics` and of remote BMCs on
//! `/ipmi`, plus health and reload endpoints.

pub mod config;
pub mod handlers;
pub mod router;

// Re-export commonly used items
pub use config::WebConfig;
pub use handlers::AppState;
pub use router::create_app;

use crate::error::{ExporterError, Result};
use crate::metrics::{Executor, Scraper};
use std::net::SocketAddr;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{info, warn};

/// Start the web server with the provided configuration and scraper.
pub async fn start_web_server<E: Executor + 'static>(config: WebConfig, scraper: Scraper<E>) -> Result<()> {
    let state = AppState::new(scraper, config.config_file.clone());
    spawn_reload_on_hangup(state.clone())?;
    let app = create_app(state);

    // Parse the bind address
    let addr = config
        .bind_address()
        .parse::<SocketAddr>()
        .map_err(|e| ExporterError::config_error(format!("Invalid bind address: {}", e)))?;

    info!("Starting IPMI exporter on http://{}", addr);
    info!("Local metrics at http://{}/metrics", addr);
    info!("Remote metrics at http://{}/ipmi?target=<host>", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ExporterError::web_server_error(format!("Failed to bind to address: {}", e)))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| ExporterError::web_server_error(format!("Server error: {}", e)))?;

    Ok(())
}

/// Reload the modules file whenever the process receives `SIGHUP`.
fn spawn_reload_on_hangup<E: Executor + 'static>(state: AppState<E>) -> Result<()> {
    if state.config_file.is_none() {
        return Ok(());
    }
    let mut hangup = signal(SignalKind::hangup())
        .map_err(|e| ExporterError::web_server_error(format!("Failed to install SIGHUP handler: {}", e)))?;

    tokio::spawn(async move {
        while hangup.recv().await.is_some() {
            info!("Received SIGHUP, reloading config");
            if state.reload().await.is_err() {
                warn!("Keeping previous config");
            }
        }
    });
    Ok(())
}
