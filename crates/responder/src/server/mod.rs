//! Axum HTTPS server, routing, and middleware.
//!
//! # Responsibilities
//! - Load the TLS identity and build the rustls configuration.
//! - Define the immutable route table and shared middleware.
//! - Bind the listener(s) and serve each connection over HTTP/1.1 or HTTP/2.

pub mod error;
pub mod handlers;
pub mod listener;
pub mod middleware;
pub mod router;
pub mod tls;
