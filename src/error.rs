//! Unified error types for the service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Fatal errors preventing the process from reaching a serving state.
#[derive(Error, Debug)]
pub enum StartupError {
    /// One or more required environment variables are unset.
    #[error("missing required environment variables: {}", .0.join(", "))]
    MissingEnv(Vec<String>),

    /// The environment could not be deserialized into the settings type.
    #[error("invalid environment configuration: {0}")]
    Env(#[from] envy::Error),

    /// A setting was present but semantically invalid.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// The HTTP listener could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address that failed to bind.
        addr: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// A single request-parameter validation failure.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    /// Location of the offending input, e.g. `["query", "num1"]`.
    pub loc: Vec<String>,
    /// Human-readable message.
    pub msg: String,
    /// Machine-readable error kind.
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    /// A required query parameter was not supplied.
    pub fn missing(param: &str) -> Self {
        Self {
            loc: vec!["query".to_string(), param.to_string()],
            msg: "Field required".to_string(),
            kind: "missing".to_string(),
        }
    }

    /// A query parameter could not be parsed as a number.
    pub fn float_parsing(param: &str) -> Self {
        Self {
            loc: vec!["query".to_string(), param.to_string()],
            msg: "Input should be a valid number, unable to parse string as a number".to_string(),
            kind: "float_parsing".to_string(),
        }
    }
}

/// Errors surfaced to HTTP callers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed or missing request parameters; maps to 422 with
    /// field-level detail.
    #[error("request validation failed")]
    Validation(Vec<FieldError>),

    /// Unexpected failure inside a handler; logged with detail and
    /// mapped to an opaque 500.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Wrap any error as an internal failure.
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "detail": errors })),
            )
                .into_response(),
            ApiError::Internal(err) => {
                // Full cause stays server-side; the caller sees an
                // opaque message.
                error!("request handler failed: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": "Internal Server Error" })),
                )
                    .into_response()
            }
        }
    }
}

/// Convenient Result type alias for handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
