//! TLS identity loading and rustls server configuration.
//!
//! The certificate chain and private key are read once at startup. A
//! [`ServerConfig`] is only produced when both parse and rustls accepts the
//! pair, so no listener is ever bound with broken identity material.

use std::{fs, path::Path, str::FromStr, sync::Arc};

use rustls::{ServerConfig, SupportedProtocolVersion};
use thiserror::Error;

use super::error::StartupError;

/// ALPN identifiers offered to clients, most preferred first.
///
/// `http/1.1` stays on offer so older clients complete the handshake and are
/// answered with a 505 on version-restricted routes instead of a TLS alert.
pub const ALPN_PROTOCOLS: [&[u8]; 2] = [b"h2", b"http/1.1"];

static TLS13_ONLY: &[&SupportedProtocolVersion] = &[&rustls::version::TLS13];

/// Lowest TLS protocol version the listener accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsMinVersion {
    #[default]
    Tls12,
    Tls13,
}

impl TlsMinVersion {
    fn protocol_versions(self) -> &'static [&'static SupportedProtocolVersion] {
        match self {
            TlsMinVersion::Tls12 => rustls::ALL_VERSIONS,
            TlsMinVersion::Tls13 => TLS13_ONLY,
        }
    }
}

#[derive(Debug, Error)]
#[error("unsupported TLS version {0:?}, expected \"1.2\" or \"1.3\"")]
pub struct UnknownTlsVersion(String);

impl FromStr for TlsMinVersion {
    type Err = UnknownTlsVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().trim_start_matches("tls") {
            "1.2" | "12" => Ok(TlsMinVersion::Tls12),
            "1.3" | "13" => Ok(TlsMinVersion::Tls13),
            _ => Err(UnknownTlsVersion(s.to_owned())),
        }
    }
}

/// Build a [`rustls::ServerConfig`] from PEM-encoded certificate and private key bytes.
///
/// # Errors
///
/// Returns an error if the certificate or key cannot be parsed, or if rustls
/// rejects the configuration.
pub fn build_server_config(
    cert_pem: &[u8],
    key_pem: &[u8],
    min_version: TlsMinVersion,
) -> Result<Arc<ServerConfig>, StartupError> {
    let certs = rustls_pemfile::certs(&mut std::io::BufReader::new(cert_pem))
        .collect::<Result<Vec<_>, _>>()
        .map_err(StartupError::MalformedCertificate)?;
    if certs.is_empty() {
        return Err(StartupError::EmptyCertificateChain);
    }

    let key = rustls_pemfile::private_key(&mut std::io::BufReader::new(key_pem))
        .map_err(StartupError::MalformedPrivateKey)?
        .ok_or(StartupError::MissingPrivateKey)?;

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let mut config = ServerConfig::builder_with_provider(provider)
        .with_protocol_versions(min_version.protocol_versions())?
        .with_no_client_auth()
        .with_single_cert(certs, key)?;
    config.alpn_protocols = ALPN_PROTOCOLS.iter().map(|p| p.to_vec()).collect();

    Ok(Arc::new(config))
}

/// Read the certificate chain and key from disk and build the server config.
///
/// # Errors
///
/// Returns [`StartupError::ReadIdentity`] if either file is missing or
/// unreadable, otherwise whatever [`build_server_config`] reports.
pub fn load_server_config(
    cert_path: &Path,
    key_path: &Path,
    min_version: TlsMinVersion,
) -> Result<Arc<ServerConfig>, StartupError> {
    let cert_pem = read_identity(cert_path, "certificate")?;
    let key_pem = read_identity(key_path, "private key")?;
    build_server_config(&cert_pem, &key_pem, min_version)
}

fn read_identity(path: &Path, kind: &'static str) -> Result<Vec<u8>, StartupError> {
    fs::read(path).map_err(|source| StartupError::ReadIdentity {
        kind,
        path: path.to_owned(),
        source,
    })
}
