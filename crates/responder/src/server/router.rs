//! Axum router construction.
//!
//! The router is the route table: it is built once at startup and cloned into
//! every listener and connection. Paths match exactly and every method is
//! dispatched to the path's handler.

use std::time::Duration;

use axum::{routing::any, Router};

use super::{handlers, middleware};

/// Build the application [`Router`] with all routes and middleware attached.
pub fn build(request_timeout: Duration) -> Router {
    let routes = Router::new()
        .route("/", any(handlers::root))
        .route("/api/hello", any(handlers::api_hello))
        .route("/hello", any(handlers::hello))
        .route("/health", any(handlers::health))
        .fallback(handlers::not_found);
    middleware::apply(routes, request_timeout)
}
