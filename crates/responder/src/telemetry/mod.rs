//! Structured logging for the responder.
//!
//! One JSON object per line on stdout, with event fields (peer address,
//! negotiated ALPN, startup error chain) flattened to the top level.
//! `RUST_LOG` wins over `LOG_LEVEL` when both are set.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Install the process-wide JSON subscriber.
///
/// Called once from `main` after configuration is loaded, before the TLS
/// identity is read, so startup failures are logged as structured events.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init(log_level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(from_env) => from_env,
        Err(_) => EnvFilter::try_new(log_level)
            .map_err(|e| anyhow::anyhow!("LOG_LEVEL {log_level:?} is not a valid filter: {e}"))?,
    };

    tracing_subscriber::fmt()
        .json()
        .flatten_event(true)
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("responder logging already initialised: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_rejected() {
        // The first call may lose to another test's subscriber; the second never wins.
        let _ = init("info");
        assert!(init("info").is_err());
    }
}
