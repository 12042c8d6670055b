//! HTTP layer
//!
//! Axum server with:
//! - Request ids (`x-request-id`, generated when absent)
//! - Request tracing and a whole-request timeout
//! - Graceful shutdown
//! - JSON error responses

pub mod error;
pub mod extractors;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use server::{build_router, run_server, serve_listener, shutdown_signal, AppState, ServerError};
