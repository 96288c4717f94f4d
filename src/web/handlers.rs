//! HTTP handlers for the exporter endpoints.

use crate::config::DEFAULT_MODULE;
use crate::error::{ExporterError, Result};
use crate::metrics::{Executor, Scraper};
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

/// Shared state of the web application.
pub struct AppState<E: Executor> {
    pub scraper: Arc<Scraper<E>>,
    pub config_file: Option<PathBuf>,
}

impl<E: Executor> Clone for AppState<E> {
    fn clone(&self) -> Self {
        Self {
            scraper: Arc::clone(&self.scraper),
            config_file: self.config_file.clone(),
        }
    }
}

impl<E: Executor> AppState<E> {
    pub fn new(scraper: Scraper<E>, config_file: Option<PathBuf>) -> Self {
        Self {
            scraper: Arc::new(scraper),
            config_file,
        }
    }

    /// Reload the modules file, if one was given at startup.
    pub async fn reload(&self) -> Result<()> {
        let path = self
            .config_file
            .as_ref()
            .ok_or_else(|| ExporterError::config_error("no config file to reload"))?;
        self.scraper.config().reload(path).await
    }
}

/// Query parameters of the scrape endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ScrapeParams {
    pub target: Option<String>,
    pub module: Option<String>,
}

/// Scrape the local BMC.
pub async fn local_metrics<E: Executor>(
    State(state): State<AppState<E>>,
    Query(params): Query<ScrapeParams>,
) -> Response {
    scrape(&state, "", params.module.as_deref()).await
}

/// Scrape the BMC named by `?target=`.
pub async fn remote_metrics<E: Executor>(
    State(state): State<AppState<E>>,
    Query(params): Query<ScrapeParams>,
) -> Response {
    match params.target.as_deref().filter(|target| !target.is_empty()) {
        Some(target) => scrape(&state, target, params.module.as_deref()).await,
        None => (StatusCode::BAD_REQUEST, "'target' parameter must be specified\n").into_response(),
    }
}

async fn scrape<E: Executor>(state: &AppState<E>, target: &str, module: Option<&str>) -> Response {
    let module = module.filter(|m| !m.is_empty()).unwrap_or(DEFAULT_MODULE);
    match state.scraper.scrape_text(target, module).await {
        Ok(body) => ([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Health check endpoint.
pub async fn health_check<E: Executor>(State(state): State<AppState<E>>) -> Json<serde_json::Value> {
    let modules = state.scraper.config().module_names().await;
    Json(json!({
        "status": "ok",
        "service": "ipmi_exporter",
        "version": env!("CARGO_PKG_VERSION"),
        "modules": modules,
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Reload the modules file.
pub async fn reload_config<E: Executor>(State(state): State<AppState<E>>) -> Response {
    match state.reload().await {
        Ok(()) => {
            info!("Config reloaded through the web endpoint");
            (StatusCode::OK, "Config reloaded\n").into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to reload config: {}\n", e),
        )
            .into_response(),
    }
}

/// Landing page linking the endpoints.
pub async fn default_index() -> Html<&'static str> {
    Html(DEFAULT_INDEX_HTML)
}

const DEFAULT_INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>IPMI Exporter</title>
</head>
<body>
    <h1>IPMI Exporter</h1>
    <p>Prometheus exporter for BMCs, backed by FreeIPMI.</p>
    <ul>
        <li><a href="/metrics">Local metrics</a></li>
        <li><a href="/ipmi?target=">Remote metrics</a> (<code>/ipmi?target=&lt;host&gt;&amp;module=&lt;module&gt;</code>)</li>
        <li><a href="/api/health">Health</a></li>
    </ul>
</body>
</html>"#;
