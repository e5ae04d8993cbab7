//! Configuration loading and validation for the responder.
//!
//! All values are read from environment variables at startup. Every field has
//! a default, so an empty environment serves `server.crt` / `server.key` from
//! the working directory on `0.0.0.0:8443`.

use std::{net::SocketAddr, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::server::{middleware::REQUEST_TIMEOUT, tls::TlsMinVersion};

/// Validated responder configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Address the TLS listener binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Filesystem path to the PEM-encoded TLS certificate chain.
    #[serde(default = "default_tls_cert_path")]
    pub tls_cert_path: String,

    /// Filesystem path to the PEM-encoded TLS private key.
    #[serde(default = "default_tls_key_path")]
    pub tls_key_path: String,

    /// Lowest TLS version offered to clients: `"1.2"` or `"1.3"`.
    #[serde(default = "default_tls_min_version")]
    pub tls_min_version: String,

    /// Optional address for a cleartext listener over the same routes.
    #[serde(default)]
    pub plaintext_bind_addr: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8443".into()
}
fn default_tls_cert_path() -> String {
    "server.crt".into()
}
fn default_tls_key_path() -> String {
    "server.key".into()
}
fn default_tls_min_version() -> String {
    "1.2".into()
}
fn default_request_timeout() -> u64 {
    REQUEST_TIMEOUT.as_secs()
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        self.bind_addr()?;
        self.plaintext_bind_addr()?;
        self.tls_min_version()?;
        ensure_non_empty(&self.tls_cert_path, "TLS_CERT_PATH")?;
        ensure_non_empty(&self.tls_key_path, "TLS_KEY_PATH")?;

        if self.request_timeout_secs == 0 {
            anyhow::bail!("REQUEST_TIMEOUT_SECS must be > 0");
        }
        Ok(())
    }

    /// Parsed TLS listen address.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        parse_addr(&self.bind_addr, "BIND_ADDR")
    }

    /// Parsed cleartext listen address, if one is configured.
    pub fn plaintext_bind_addr(&self) -> Result<Option<SocketAddr>> {
        match self.plaintext_bind_addr.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(addr) => parse_addr(addr, "PLAINTEXT_BIND_ADDR").map(Some),
        }
    }

    pub fn tls_min_version(&self) -> Result<TlsMinVersion> {
        self.tls_min_version
            .parse()
            .context("TLS_MIN_VERSION is invalid")
    }

    pub fn tls_cert_path(&self) -> PathBuf {
        PathBuf::from(&self.tls_cert_path)
    }

    pub fn tls_key_path(&self) -> PathBuf {
        PathBuf::from(&self.tls_key_path)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_addr(value: &str, name: &str) -> Result<SocketAddr> {
    value
        .trim()
        .parse()
        .with_context(|| format!("{name} must be a socket address like 0.0.0.0:8443, got {value:?}"))
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Config {
        Config {
            bind_addr: default_bind_addr(),
            tls_cert_path: default_tls_cert_path(),
            tls_key_path: default_tls_key_path(),
            tls_min_version: default_tls_min_version(),
            plaintext_bind_addr: None,
            request_timeout_secs: default_request_timeout(),
            log_level: default_log_level(),
        }
    }

    #[test]
    fn defaults_are_correct() {
        assert_eq!(default_bind_addr(), "0.0.0.0:8443");
        assert_eq!(default_tls_cert_path(), "server.crt");
        assert_eq!(default_tls_key_path(), "server.key");
        assert_eq!(default_tls_min_version(), "1.2");
        assert_eq!(default_request_timeout(), 30);
        assert_eq!(default_log_level(), "info");
    }

    #[test]
    fn validate_accepts_defaults() {
        let cfg = valid();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.bind_addr().unwrap().port(), 8443);
        assert_eq!(cfg.tls_min_version().unwrap(), TlsMinVersion::Tls12);
        assert!(cfg.plaintext_bind_addr().unwrap().is_none());
    }

    #[test]
    fn validate_rejects_bad_bind_addr() {
        let cfg = Config {
            bind_addr: ":8443".into(),
            ..valid()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_unknown_tls_version() {
        let cfg = Config {
            tls_min_version: "1.1".into(),
            ..valid()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_key_path() {
        let cfg = Config {
            tls_key_path: " ".into(),
            ..valid()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let cfg = Config {
            request_timeout_secs: 0,
            ..valid()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn empty_plaintext_addr_is_disabled() {
        let cfg = Config {
            plaintext_bind_addr: Some(String::new()),
            ..valid()
        };
        assert!(cfg.plaintext_bind_addr().unwrap().is_none());

        let cfg = Config {
            plaintext_bind_addr: Some("127.0.0.1:8082".into()),
            ..valid()
        };
        assert_eq!(cfg.plaintext_bind_addr().unwrap().unwrap().port(), 8082);
    }
}
