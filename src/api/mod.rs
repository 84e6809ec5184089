//! HTTP API module for health, status, metrics, and arithmetic
//! endpoints.

pub mod docs;
pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::create_router;
