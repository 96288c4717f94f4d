//! Web application router and middleware setup.

use crate::metrics::Executor;
use crate::web::handlers::{self, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Create the axum application with all routes and middleware.
pub fn create_app<E: Executor + 'static>(state: AppState<E>) -> Router {
    Router::new()
        .route("/", get(handlers::default_index))
        .route("/metrics", get(handlers::local_metrics::<E>))
        .route("/ipmi", get(handlers::remote_metrics::<E>))
        .route("/api/health", get(handlers::health_check::<E>))
        .route("/-/reload", post(handlers::reload_config::<E>))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ExporterConfig, SafeConfig, ScrapeSettings};
    use crate::metrics::traits::testing::RecordingExecutor;
    use crate::metrics::Scraper;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use std::path::PathBuf;
    use tower::ServiceExt;

    const CONFIG: &str = r#"
[modules.default]
collectors = ["chassis"]

[modules.power]
collectors = ["dcmi"]
"#;

    fn build(config_file: Option<PathBuf>) -> (Router, AppState<RecordingExecutor>) {
        let executor = RecordingExecutor::default()
            .with_output("ipmi-chassis", "System Power : on\n")
            .with_output("ipmi-dcmi", "Current Power : 88 Watts\n");
        let settings = ScrapeSettings::default()
            .with_sdr_cache_dir(std::env::temp_dir().join("ipmi-exporter-test-no-cache"));
        let config = SafeConfig::new(ExporterConfig::from_toml(CONFIG).unwrap());
        let state = AppState::new(Scraper::new(executor, settings, config), config_file);
        (create_app(state.clone()), state)
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_local_metrics() {
        let (app, state) = build(None);
        let (status, body) = get(app, "/metrics").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("ipmi_chassis_power_state 1"));
        assert_eq!(state.scraper_calls_target(), vec![""]);
    }

    #[tokio::test]
    async fn test_remote_metrics_with_module() {
        let (app, state) = build(None);
        let (status, body) = get(app, "/ipmi?target=10.1.2.3&module=power").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("ipmi_dcmi_power_consumption_watts 88"));
        assert_eq!(state.scraper_calls_target(), vec!["10.1.2.3"]);
    }

    #[tokio::test]
    async fn test_remote_metrics_requires_target() {
        let (app, _) = build(None);
        let (status, _) = get(app.clone(), "/ipmi").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = get(app, "/ipmi?target=").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_health_lists_modules() {
        let (app, _) = build(None);
        let (status, body) = get(app, "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["modules"], serde_json::json!(["default", "power"]));
    }

    #[tokio::test]
    async fn test_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ipmi.toml");
        std::fs::write(&path, "[modules.lab]\ncollectors = [\"sel\"]\n").unwrap();

        let (app, state) = build(Some(path));
        let response = app
            .oneshot(Request::post("/-/reload").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.scraper.config().module_names().await, vec!["lab"]);

        let (app, _) = build(None);
        let response = app
            .oneshot(Request::post("/-/reload").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    impl AppState<RecordingExecutor> {
        fn scraper_calls_target(&self) -> Vec<String> {
            self.scraper
                .executor()
                .calls()
                .into_iter()
                .map(|call| call.target)
                .collect()
        }
    }
}
