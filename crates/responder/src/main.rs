//! `responder` — TLS-terminated HTTP/2 responder entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise structured JSON logging.
//! 3. Build the route table.
//! 4. Load the TLS identity, bind, and serve until killed.

mod config;
mod server;
mod telemetry;

use anyhow::Result;
use tracing::{error, info};

use config::Config;
use server::listener::{self, ListenerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init(&cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_addr = %cfg.bind_addr,
        "responder starting"
    );

    // -----------------------------------------------------------------------
    // 3. Routes
    // -----------------------------------------------------------------------
    let router = server::router::build(cfg.request_timeout());

    // -----------------------------------------------------------------------
    // 4. TLS listener
    // -----------------------------------------------------------------------
    let listener_cfg = ListenerConfig {
        bind_addr: cfg.bind_addr()?,
        cert_path: cfg.tls_cert_path(),
        key_path: cfg.tls_key_path(),
        min_version: cfg.tls_min_version()?,
        plaintext_addr: cfg.plaintext_bind_addr()?,
    };

    match listener::start(&listener_cfg, router).await {
        Ok(never) => match never {},
        Err(e) => {
            let e = anyhow::Error::from(e);
            error!(error = %format!("{e:#}"), "startup failed");
            Err(e)
        }
    }
}
