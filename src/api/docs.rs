//! OpenAPI documentation served at /docs and /openapi.json.

use utoipa::OpenApi;

use super::handlers;
use super::handlers::{AdditionResponse, DetailedStatus, HealthStatus, ServiceInfo};

/// OpenAPI document for the service.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Market Predictor",
        description = "Bitcoin Price Prediction Service"
    ),
    paths(
        handlers::add,
        handlers::health,
        handlers::status,
        handlers::root,
        handlers::metrics
    ),
    components(schemas(AdditionResponse, HealthStatus, DetailedStatus, ServiceInfo)),
    tags(
        (name = "Math", description = "Arithmetic endpoints"),
        (name = "Health", description = "Liveness and status probes"),
        (name = "Root", description = "Service information"),
        (name = "Monitoring", description = "Prometheus metrics")
    )
)]
pub struct ApiDoc;
