//! Startup failures of the TLS responder.
//!
//! Every variant is fatal: the caller decides whether to exit the process.

use std::{io, net::SocketAddr, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StartupError {
    /// A certificate or key file could not be read.
    #[error("failed to read TLS {kind} from {}", .path.display())]
    ReadIdentity {
        kind: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse TLS certificate chain")]
    MalformedCertificate(#[source] io::Error),

    #[error("no certificate found in PEM data")]
    EmptyCertificateChain,

    #[error("failed to read TLS private key")]
    MalformedPrivateKey(#[source] io::Error),

    #[error("no private key found in PEM data")]
    MissingPrivateKey,

    /// rustls refused the certificate/key pair or protocol selection.
    #[error("failed to build rustls ServerConfig")]
    Tls(#[from] rustls::Error),

    #[error("failed to bind {addr}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("failed to read local address of the listener")]
    LocalAddr(#[source] io::Error),
}
