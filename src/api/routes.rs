//! HTTP API route definitions.

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::docs::ApiDoc;
use super::handlers::{add, health, metrics, root, status, AppState};

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let api = Router::new().route("/add", get(add));

    Router::new()
        // Service info and health endpoints
        .route("/", get(root))
        .route("/health", get(health))
        .route("/status", get(status))
        // Monitoring
        .route("/metrics", get(metrics))
        // Versioned API under the configured prefix
        .nest(&state.config.api_prefix, api)
        // Interactive docs and schema
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn(track_metrics))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Count every request and record its duration once the response is
/// ready.
async fn track_metrics(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    let response = next.run(req).await;

    crate::metrics::inc_http_request(method.as_str(), &path, response.status().as_u16());
    crate::metrics::record_http_request_duration(start, method.as_str(), &path);

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use tower::ServiceExt;

    use crate::config::Config;

    fn test_state() -> AppState {
        let config: Config = envy::from_iter(
            [
                ("ENVIRONMENT", "test"),
                ("LOG_LEVEL", "info"),
                ("API_HOST", "127.0.0.1"),
                ("API_PORT", "0"),
                ("SERVICE_NAME", "market-predictor"),
                ("MODEL_TYPE", "dummy"),
                ("CACHE_TTL", "300"),
                ("METRICS_ENABLED", "true"),
                ("HEALTH_CHECK_INTERVAL", "30"),
                ("REQUEST_TIMEOUT", "30"),
                ("MAX_CONCURRENT_REQUESTS", "100"),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string())),
        )
        .unwrap();

        // Unregistered recorder keeps these tests independent of the
        // process-global one.
        let handle = PrometheusBuilder::new().build_recorder().handle();
        AppState::new(config, handle)
    }

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let app = create_router(test_state());

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn add_endpoint_lives_under_api_prefix() {
        let app = create_router(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/add?num1=5&num2=3")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let app = create_router(test_state());

        let response = app
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
