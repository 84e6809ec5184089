//! HTTP API handlers.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::debug;
use utoipa::ToSchema;

use crate::config::Config;
use crate::error::{ApiError, ApiResult, FieldError};

/// Application state shared with handlers.
///
/// Everything here is read-only after construction: the configuration,
/// the process start anchor, and the lock-free Prometheus handle.
#[derive(Clone)]
pub struct AppState {
    /// Process-wide configuration, loaded once at startup.
    pub config: Arc<Config>,
    /// Monotonic anchor for uptime reporting.
    started_at: Instant,
    /// Handle for rendering the Prometheus text exposition.
    metrics: PrometheusHandle,
}

impl AppState {
    /// Create new app state, anchoring uptime at the current instant.
    pub fn new(config: Config, metrics: PrometheusHandle) -> Self {
        Self {
            config: Arc::new(config),
            started_at: Instant::now(),
            metrics,
        }
    }

    /// Seconds elapsed since the state was constructed.
    pub fn uptime_seconds(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }
}

/// Addition result with the timestamp of computation.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdditionResponse {
    /// UTC timestamp of the computation, RFC 3339.
    pub timestamp: String,
    /// Sum of the two inputs.
    pub result: f64,
}

/// Basic health status response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthStatus {
    /// Service health status, "healthy" under normal operation.
    pub status: String,
    /// UTC timestamp of the check, RFC 3339.
    pub timestamp: String,
    /// Service name.
    pub service: String,
    /// Service version.
    pub version: String,
}

/// Detailed service status with components and metadata.
#[derive(Debug, Serialize, ToSchema)]
pub struct DetailedStatus {
    /// Overall service status.
    pub status: String,
    /// UTC timestamp of the check, RFC 3339.
    pub timestamp: String,
    /// Service name.
    pub service: String,
    /// Service version.
    pub version: String,
    /// Seconds since process start, non-decreasing within one process.
    pub uptime_seconds: f64,
    /// Component health, statically reported.
    pub components: BTreeMap<String, String>,
    /// Configuration metadata rendered as strings.
    pub metadata: Option<BTreeMap<String, String>>,
}

/// Root endpoint service information.
#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceInfo {
    /// Service name.
    pub service: String,
    /// Service version.
    pub version: String,
    /// Fixed "running" marker.
    pub status: String,
    /// Interactive API documentation URL.
    pub docs_url: String,
    /// Health endpoint URL.
    pub health_url: String,
    /// Status endpoint URL.
    pub status_url: String,
}

/// Add two numbers with IEEE-754 double semantics.
pub(crate) fn add_numbers(num1: f64, num2: f64) -> f64 {
    num1 + num2
}

fn utc_timestamp() -> ApiResult<String> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(ApiError::internal)
}

fn float_param(params: &HashMap<String, String>, name: &str) -> Result<f64, FieldError> {
    match params.get(name) {
        None => Err(FieldError::missing(name)),
        Some(raw) => raw
            .parse::<f64>()
            .map_err(|_| FieldError::float_parsing(name)),
    }
}

/// Addition handler: sums `num1` and `num2` and stamps the result.
#[utoipa::path(
    get,
    path = "/api/v1/add",
    tag = "Math",
    params(
        ("num1" = f64, Query, description = "First number to add"),
        ("num2" = f64, Query, description = "Second number to add")
    ),
    responses(
        (status = 200, description = "Sum of the two numbers", body = AdditionResponse),
        (status = 422, description = "Missing or non-numeric parameter")
    )
)]
pub async fn add(Query(params): Query<HashMap<String, String>>) -> ApiResult<Json<AdditionResponse>> {
    let num1 = float_param(&params, "num1");
    let num2 = float_param(&params, "num2");

    let (num1, num2) = match (num1, num2) {
        (Ok(num1), Ok(num2)) => (num1, num2),
        (num1, num2) => {
            let errors = [num1.err(), num2.err()].into_iter().flatten().collect();
            return Err(ApiError::Validation(errors));
        }
    };

    debug!(num1, num2, "received addition request");
    let result = add_numbers(num1, num2);
    debug!(result, "calculated result");

    Ok(Json(AdditionResponse {
        timestamp: utc_timestamp()?,
        result,
    }))
}

/// Health check handler - liveness only, no dependency checks.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthStatus)
    )
)]
pub async fn health(State(state): State<AppState>) -> ApiResult<Json<HealthStatus>> {
    crate::metrics::inc_health_checks();

    Ok(Json(HealthStatus {
        status: "healthy".to_string(),
        timestamp: utc_timestamp()?,
        service: state.config.service_name.clone(),
        version: state.config.service_version.clone(),
    }))
}

/// Status handler - uptime, static component health, and configuration
/// metadata.
#[utoipa::path(
    get,
    path = "/status",
    tag = "Health",
    responses(
        (status = 200, description = "Detailed service status", body = DetailedStatus)
    )
)]
pub async fn status(State(state): State<AppState>) -> ApiResult<Json<DetailedStatus>> {
    let config = &state.config;

    // Components are statically healthy; nothing is probed.
    let components = BTreeMap::from([
        ("api".to_string(), "healthy".to_string()),
        ("configuration".to_string(), "healthy".to_string()),
        ("metrics".to_string(), "healthy".to_string()),
    ]);

    let metadata = BTreeMap::from([
        ("environment".to_string(), config.environment.clone()),
        ("model_type".to_string(), config.model_type.clone()),
        ("cache_ttl".to_string(), config.cache_ttl.to_string()),
        (
            "metrics_enabled".to_string(),
            config.metrics_enabled.to_string(),
        ),
    ]);

    Ok(Json(DetailedStatus {
        status: "healthy".to_string(),
        timestamp: utc_timestamp()?,
        service: config.service_name.clone(),
        version: config.service_version.clone(),
        uptime_seconds: state.uptime_seconds(),
        components,
        metadata: Some(metadata),
    }))
}

/// Root handler - static service information.
#[utoipa::path(
    get,
    path = "/",
    tag = "Root",
    responses(
        (status = 200, description = "Service information", body = ServiceInfo)
    )
)]
pub async fn root(State(state): State<AppState>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: state.config.service_name.clone(),
        version: state.config.service_version.clone(),
        status: "running".to_string(),
        docs_url: "/docs".to_string(),
        health_url: "/health".to_string(),
        status_url: "/status".to_string(),
    })
}

/// Prometheus metrics handler - text exposition format.
#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Monitoring",
    responses(
        (status = 200, description = "Prometheus text exposition", body = String)
    )
)]
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(
            header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addition_matches_ieee754() {
        assert_eq!(add_numbers(5.0, 3.0), 8.0);
        assert_eq!(add_numbers(-5.0, -3.0), -8.0);
        assert_eq!(add_numbers(0.0, 0.0), 0.0);
        assert_eq!(add_numbers(0.1, 0.2), 0.1 + 0.2);
    }

    #[test]
    fn addition_is_commutative() {
        assert_eq!(add_numbers(1.5, 2.25), add_numbers(2.25, 1.5));
        assert_eq!(add_numbers(-7.125, 42.0), add_numbers(42.0, -7.125));
    }

    #[test]
    fn addition_overflows_to_infinity() {
        assert_eq!(add_numbers(1e308, 1e308), f64::INFINITY);
        assert_eq!(add_numbers(-1e308, -1e308), f64::NEG_INFINITY);
    }

    #[test]
    fn addition_propagates_nan() {
        assert!(add_numbers(f64::NAN, 1.0).is_nan());
    }

    #[test]
    fn utc_timestamp_round_trips_rfc3339() {
        let stamp = utc_timestamp().unwrap();
        assert!(OffsetDateTime::parse(&stamp, &Rfc3339).is_ok());
    }

    #[test]
    fn float_param_reports_missing_and_unparsable() {
        let mut params = HashMap::new();
        params.insert("num1".to_string(), "abc".to_string());

        let err = float_param(&params, "num1").unwrap_err();
        assert_eq!(err.kind, "float_parsing");

        let err = float_param(&params, "num2").unwrap_err();
        assert_eq!(err.kind, "missing");
        assert_eq!(err.loc, vec!["query".to_string(), "num2".to_string()]);
    }

    #[test]
    fn float_param_accepts_scientific_notation() {
        let mut params = HashMap::new();
        params.insert("num1".to_string(), "1e308".to_string());

        assert_eq!(float_param(&params, "num1").unwrap(), 1e308);
    }
}
